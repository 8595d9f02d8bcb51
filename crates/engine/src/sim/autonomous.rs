use rand::Rng;

use crate::config::RangeMs;
use crate::error::SimError;

use super::chat::ChatBubble;
use super::{Actor, ActorId, ActorKind, Direction};

#[derive(Debug, Clone)]
pub struct ChatSession {
    partner: ActorId,
    ends_at_ms: u64,
    cooldown_ms: u64,
    bubble: ChatBubble,
}

impl ChatSession {
    pub fn partner(&self) -> ActorId {
        self.partner
    }

    pub fn ends_at_ms(&self) -> u64 {
        self.ends_at_ms
    }

    pub fn bubble(&self) -> &ChatBubble {
        &self.bubble
    }
}

#[derive(Debug, Clone)]
pub enum AutonomousPhase {
    Wandering,
    Chatting(ChatSession),
}

#[derive(Debug, Clone)]
pub struct AutonomousState {
    phase: AutonomousPhase,
    wait_delay_ms: u64,
    wait_started_ms: u64,
    chat_ready_at_ms: u64,
}

impl Default for AutonomousState {
    fn default() -> Self {
        Self {
            phase: AutonomousPhase::Wandering,
            wait_delay_ms: 0,
            wait_started_ms: 0,
            chat_ready_at_ms: 0,
        }
    }
}

impl AutonomousState {
    pub fn phase(&self) -> &AutonomousPhase {
        &self.phase
    }

    pub fn is_chatting(&self) -> bool {
        matches!(self.phase, AutonomousPhase::Chatting(_))
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        match &self.phase {
            AutonomousPhase::Chatting(session) => Some(session),
            AutonomousPhase::Wandering => None,
        }
    }

    pub fn wait_delay_ms(&self) -> u64 {
        self.wait_delay_ms
    }

    pub fn chat_ready_at_ms(&self) -> u64 {
        self.chat_ready_at_ms
    }

    pub fn can_chat(&self, now_ms: u64) -> bool {
        !self.is_chatting() && now_ms >= self.chat_ready_at_ms
    }

    fn wait_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.wait_started_ms) > self.wait_delay_ms
    }
}

/// Directions a wandering actor may pick next. Idle is only offered when
/// nothing is excluded, so a redirect after a bounce always moves.
pub fn wander_candidates(excluded: &[Direction]) -> Vec<Option<Direction>> {
    let mut candidates: Vec<Option<Direction>> = Direction::ALL
        .into_iter()
        .filter(|direction| !excluded.contains(direction))
        .map(Some)
        .collect();
    if excluded.is_empty() {
        candidates.push(None);
    }
    candidates
}

pub(crate) fn sample_ms<R: Rng + ?Sized>(rng: &mut R, range: RangeMs) -> u64 {
    rng.random_range(range.min..=range.max)
}

impl Actor {
    fn autonomous_mut(&mut self) -> Result<&mut AutonomousState, SimError> {
        let id = self.id();
        match &mut self.kind {
            ActorKind::Autonomous(state) => Ok(state),
            ActorKind::Player(_) => Err(SimError::NotAutonomous(id)),
        }
    }

    /// Empties the direction stack and picks a fresh direction (or idle) from
    /// the candidates left after `excluded`, then resamples the wait timer.
    pub fn change_direction<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now_ms: u64,
        wait: RangeMs,
        excluded: &[Direction],
    ) -> Result<Option<Direction>, SimError> {
        self.autonomous_mut()?;
        let candidates = wander_candidates(excluded);
        if candidates.is_empty() {
            return Err(SimError::NoWanderCandidates {
                excluded: excluded.to_vec(),
            });
        }

        self.clear_directions();
        let choice = candidates[rng.random_range(0..candidates.len())];
        if let Some(direction) = choice {
            self.push_direction(direction);
        }

        let state = self.autonomous_mut()?;
        state.wait_delay_ms = sample_ms(rng, wait);
        state.wait_started_ms = now_ms;
        Ok(choice)
    }

    /// Redirects a wandering actor once its wait timer runs out. Returns true
    /// when a new direction was chosen.
    pub fn update_wander<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now_ms: u64,
        wait: RangeMs,
    ) -> Result<bool, SimError> {
        let state = self.autonomous_mut()?;
        if state.is_chatting() || !state.wait_expired(now_ms) {
            return Ok(false);
        }
        self.change_direction(rng, now_ms, wait, &[])?;
        Ok(true)
    }

    pub(crate) fn begin_chat(
        &mut self,
        partner: ActorId,
        facing: Direction,
        now_ms: u64,
        duration_ms: u64,
        cooldown_ms: u64,
        bubble: ChatBubble,
    ) -> Result<(), SimError> {
        self.face(facing);
        let state = self.autonomous_mut()?;
        let ends_at_ms = now_ms.saturating_add(duration_ms);
        state.chat_ready_at_ms = ends_at_ms.saturating_add(cooldown_ms);
        state.phase = AutonomousPhase::Chatting(ChatSession {
            partner,
            ends_at_ms,
            cooldown_ms,
            bubble,
        });
        Ok(())
    }

    /// Leaves the chat and drops the bubble. Ending before the scheduled time
    /// restarts the cooldown window from `now_ms`.
    pub(crate) fn end_chat(&mut self, now_ms: u64) -> Result<Option<ChatSession>, SimError> {
        let state = self.autonomous_mut()?;
        let phase = std::mem::replace(&mut state.phase, AutonomousPhase::Wandering);
        let AutonomousPhase::Chatting(session) = phase else {
            return Ok(None);
        };
        if now_ms < session.ends_at_ms {
            state.chat_ready_at_ms = now_ms.saturating_add(session.cooldown_ms);
        }
        Ok(Some(session))
    }

    pub(crate) fn chat_bubble_mut(&mut self) -> Option<&mut ChatBubble> {
        match &mut self.kind {
            ActorKind::Autonomous(AutonomousState {
                phase: AutonomousPhase::Chatting(session),
                ..
            }) => Some(&mut session.bubble),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::assets::ImageId;
    use crate::geometry::Rect;
    use crate::sim::actor::test_support::{player_at, spec_at};

    const WAIT: RangeMs = RangeMs::new(500, 2000);

    fn wanderer() -> Actor {
        Actor::new(
            ActorId(1),
            spec_at((256, 256), 2),
            ActorKind::Autonomous(AutonomousState::default()),
        )
    }

    fn bubble() -> ChatBubble {
        ChatBubble::new(
            vec![ImageId(0)],
            0,
            5000,
            (32, 56),
            4,
            &Rect::new(0, 0, 32, 36),
        )
    }

    #[test]
    fn unrestricted_candidates_include_idle() {
        let candidates = wander_candidates(&[]);
        assert_eq!(candidates.len(), 5);
        assert!(candidates.contains(&None));
    }

    #[test]
    fn restricted_candidates_exclude_direction_and_idle() {
        let candidates = wander_candidates(&[Direction::Left]);
        assert_eq!(
            candidates,
            vec![Some(Direction::Up), Some(Direction::Right), Some(Direction::Down)]
        );
    }

    #[test]
    fn over_restricted_redirect_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut actor = wanderer();
        let err = actor
            .change_direction(&mut rng, 0, WAIT, &Direction::ALL)
            .expect_err("no candidates left");
        assert!(matches!(err, SimError::NoWanderCandidates { .. }));
    }

    #[test]
    fn redirect_after_bounce_never_repeats_or_idles() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut actor = wanderer();
        for _ in 0..64 {
            let choice = actor
                .change_direction(&mut rng, 0, WAIT, &[Direction::Up])
                .expect("redirect");
            let direction = choice.expect("redirect never idles");
            assert_ne!(direction, Direction::Up);
            assert_eq!(actor.facing(), direction);
            assert_eq!(actor.directions().len(), 1);
        }
    }

    #[test]
    fn wait_timer_is_resampled_within_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut actor = wanderer();
        for _ in 0..32 {
            actor.change_direction(&mut rng, 0, WAIT, &[]).expect("redirect");
            let delay = actor.autonomous().expect("autonomous").wait_delay_ms();
            assert!((500..=2000).contains(&delay));
        }
    }

    #[test]
    fn wander_redirects_only_after_wait_expires() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut actor = wanderer();
        actor.change_direction(&mut rng, 0, WAIT, &[]).expect("redirect");
        let delay = actor.autonomous().expect("autonomous").wait_delay_ms();
        assert!(!actor.update_wander(&mut rng, delay, WAIT).expect("update"));
        assert!(actor.update_wander(&mut rng, delay + 1, WAIT).expect("update"));
    }

    #[test]
    fn player_cannot_wander() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut player = player_at((10, 10), 3);
        assert_eq!(
            player.change_direction(&mut rng, 0, WAIT, &[]),
            Err(SimError::NotAutonomous(ActorId(0)))
        );
    }

    #[test]
    fn chatting_suppresses_translation_and_wander() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut actor = wanderer();
        actor.push_direction(Direction::Up);
        actor
            .begin_chat(ActorId(2), Direction::Left, 0, 5000, 7000, bubble())
            .expect("chat");
        assert!(actor.is_chatting());
        assert!(actor.is_idle());
        assert_eq!(actor.facing(), Direction::Left);

        // Even a re-asserted intent does not move a chatting actor.
        actor.push_direction(Direction::Up);
        let before = actor.rect();
        actor.step(&Rect::from_size(512, 512));
        assert_eq!(actor.rect(), before);
        assert!(!actor.update_wander(&mut rng, 4000, WAIT).expect("update"));
    }

    #[test]
    fn cooldown_window_starts_after_chat_end() {
        let mut actor = wanderer();
        actor
            .begin_chat(ActorId(2), Direction::Right, 1000, 5000, 7000, bubble())
            .expect("chat");
        let state = actor.autonomous().expect("autonomous");
        assert_eq!(state.chat_ready_at_ms(), 13000);
        assert!(!state.can_chat(6000));

        let session = actor.end_chat(6000).expect("end").expect("session");
        assert_eq!(session.partner(), ActorId(2));
        let state = actor.autonomous().expect("autonomous");
        assert!(!state.is_chatting());
        assert!(!state.can_chat(12999));
        assert!(state.can_chat(13000));
    }

    #[test]
    fn cancelled_chat_restarts_cooldown_from_cancel_time() {
        let mut actor = wanderer();
        actor
            .begin_chat(ActorId(2), Direction::Right, 1000, 5000, 7000, bubble())
            .expect("chat");
        actor.end_chat(2000).expect("end");
        assert_eq!(
            actor.autonomous().expect("autonomous").chat_ready_at_ms(),
            9000
        );
    }
}
