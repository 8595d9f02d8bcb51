use rand::Rng;

use crate::assets::SoundId;
use crate::input::{direction_for_key, InputEvent};

use super::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundCue {
    pub sound: SoundId,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    grunt_cooldown_ms: u64,
    last_grunt_ms: Option<u64>,
}

impl PlayerState {
    pub fn new(grunt_cooldown_ms: u64) -> Self {
        Self {
            grunt_cooldown_ms,
            last_grunt_ms: None,
        }
    }

    /// Picks a grunt when the cooldown since the last one has elapsed.
    pub fn try_grunt<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        rng: &mut R,
        grunts: &[SoundId],
    ) -> Option<SoundCue> {
        if grunts.is_empty() {
            return None;
        }
        let ready = self
            .last_grunt_ms
            .map_or(true, |last| now_ms.saturating_sub(last) > self.grunt_cooldown_ms);
        if !ready {
            return None;
        }
        self.last_grunt_ms = Some(now_ms);
        let sound = grunts[rng.random_range(0..grunts.len())];
        Some(SoundCue { sound })
    }
}

impl Actor {
    /// Key-down pushes and key-up pops the mapped direction. Returns true when
    /// the event was a movement key.
    pub fn handle_player_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown(key) => match direction_for_key(key) {
                Some(direction) => {
                    self.push_direction(direction);
                    true
                }
                None => false,
            },
            InputEvent::KeyUp(key) => match direction_for_key(key) {
                Some(direction) => {
                    self.pop_direction(direction);
                    true
                }
                None => false,
            },
            InputEvent::Quit | InputEvent::MouseDown { .. } => false,
        }
    }
}
