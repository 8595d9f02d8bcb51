use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::assets::{AssetBundle, ImageId, SoundId};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::geometry::Rect;
use crate::input::InputEvent;
use crate::render::{DrawCommand, DrawSource, RenderList};

use super::autonomous::sample_ms;
use super::chat::{synthesize_conversation, ChatBubble, ConversationShape};
use super::footprint::{footprints_collide, Footprint};
use super::player::{PlayerState, SoundCue};
use super::wrap::{wrap_ghost, WrapGhost};
use super::{
    Actor, ActorId, ActorKind, ActorSpec, AutonomousState, Direction, SimClock, WalkFrames,
};

/// Static blocker. Invisible obstacles still collide but are never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    rect: Rect,
    footprint: Footprint,
    image: ImageId,
    visible: bool,
}

impl Obstacle {
    pub fn new(
        topleft: (i32, i32),
        image_size: (i32, i32),
        footprint: (i32, i32),
        image: ImageId,
        visible: bool,
    ) -> Self {
        let rect = Rect::new(topleft.0, topleft.1, image_size.0, image_size.1);
        Self {
            rect,
            footprint: Footprint::anchored(footprint, &rect),
            image,
            visible,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub quit: bool,
    pub sounds: Vec<SoundCue>,
}

/// Authoritative actor registry. Actors are never removed, so an `ActorId`
/// is also the actor's index.
#[derive(Debug, Clone)]
pub struct World {
    config: SimConfig,
    bounds: Rect,
    rng: ChaCha8Rng,
    clock: SimClock,
    characters: BTreeMap<String, WalkFrames>,
    bubble_frames: Vec<ImageId>,
    grunts: Vec<SoundId>,
    actors: Vec<Actor>,
    obstacles: Vec<Obstacle>,
    player: Option<ActorId>,
    overlapping: BTreeSet<(ActorId, ActorId)>,
    ghosts: Vec<WrapGhost>,
    drawn_actors: BTreeMap<ActorId, Rect>,
    drawn_bubbles: BTreeMap<ActorId, (Rect, ImageId)>,
    pending_dirty: Vec<Rect>,
    render: RenderList,
    composed: bool,
}

impl World {
    pub fn new(config: SimConfig, assets: &AssetBundle, seed: u64) -> Self {
        let bounds = Rect::from_size(config.world.width, config.world.height);
        Self {
            config,
            bounds,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: SimClock::default(),
            characters: assets.characters.clone(),
            bubble_frames: assets.bubbles.clone(),
            grunts: assets.grunts.clone(),
            actors: Vec::new(),
            obstacles: Vec::new(),
            player: None,
            overlapping: BTreeSet::new(),
            ghosts: Vec::new(),
            drawn_actors: BTreeMap::new(),
            drawn_bubbles: BTreeMap::new(),
            pending_dirty: Vec::new(),
            render: RenderList::default(),
            composed: false,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0 as usize)
    }

    pub fn player_id(&self) -> Option<ActorId> {
        self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render
    }

    pub fn characters_available(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor, SimError> {
        self.actors
            .get_mut(id.0 as usize)
            .ok_or(SimError::UnknownActor(id))
    }

    fn next_id(&self) -> ActorId {
        ActorId(self.actors.len() as u32)
    }

    fn frames_for(&self, character: &str) -> Result<WalkFrames, SimError> {
        self.characters
            .get(character)
            .copied()
            .ok_or_else(|| SimError::UnknownCharacter(character.to_string()))
    }

    pub fn spawn_player(&mut self, midbottom: (i32, i32)) -> Result<ActorId, SimError> {
        let player = &self.config.player;
        let spec = ActorSpec {
            character: player.character.clone(),
            frames: self.frames_for(&player.character)?,
            frame_size: self.config.animation.frame_size,
            midbottom,
            speed: player.speed,
            footprint: player.footprint,
            facing: Direction::Down,
            animation_fps: self.config.animation.fps,
        };
        let id = self.next_id();
        let state = PlayerState::new(player.grunt_cooldown_ms);
        self.actors
            .push(Actor::new(id, spec, ActorKind::Player(state)));
        self.player = Some(id);
        Ok(id)
    }

    /// Places a wandering actor and immediately picks its first direction.
    pub fn spawn_autonomous(
        &mut self,
        character: &str,
        midbottom: (i32, i32),
        speed: i32,
        facing: Direction,
    ) -> Result<ActorId, SimError> {
        let spec = ActorSpec {
            character: character.to_string(),
            frames: self.frames_for(character)?,
            frame_size: self.config.animation.frame_size,
            midbottom,
            speed,
            footprint: self.config.population.footprint,
            facing,
            animation_fps: self.config.animation.fps,
        };
        let id = self.next_id();
        let mut actor = Actor::new(id, spec, ActorKind::Autonomous(AutonomousState::default()));
        let now = self.clock.now_ms();
        actor.change_direction(&mut self.rng, now, self.config.wander.wait_ms, &[])?;
        self.actors.push(actor);
        Ok(id)
    }

    /// Runs one fixed tick: drop last tick's ghosts, apply input, update
    /// actors, resolve obstacle then chat collisions, and rebuild the render
    /// list.
    pub fn tick(&mut self, dt: Duration, events: &[InputEvent]) -> Result<TickOutcome, SimError> {
        self.clear_ghosts();
        self.clock.advance(dt);
        let now = self.clock.now_ms();

        let mut outcome = TickOutcome::default();
        self.handle_input(events, &mut outcome);
        self.update_actors(now)?;
        self.update_bubbles(now);
        self.resolve_obstacle_collisions(now, &mut outcome)?;
        self.resolve_chats(now)?;
        self.compose();
        Ok(outcome)
    }

    fn clear_ghosts(&mut self) {
        for ghost in self.ghosts.drain(..) {
            self.pending_dirty.push(ghost.dest);
        }
    }

    fn handle_input(&mut self, events: &[InputEvent], outcome: &mut TickOutcome) {
        for event in events {
            if matches!(event, InputEvent::Quit) {
                outcome.quit = true;
                continue;
            }
            let Some(id) = self.player else {
                continue;
            };
            if let Some(player) = self.actors.get_mut(id.0 as usize) {
                player.handle_player_event(event);
            }
        }
    }

    fn update_actors(&mut self, now: u64) -> Result<(), SimError> {
        let wait = self.config.wander.wait_ms;
        let count = self.actors.len();
        for actor in &mut self.actors {
            if let Some(session) = actor.autonomous().and_then(AutonomousState::chat) {
                let partner = session.partner();
                if partner.0 as usize >= count {
                    return Err(SimError::MissingChatPartner {
                        actor: actor.id(),
                        partner,
                    });
                }
                if now >= session.ends_at_ms() {
                    actor.end_chat(now)?;
                    if actor.id() < partner {
                        info!(actor = actor.id().0, partner = partner.0, "chat_ended");
                    }
                }
            }
            if !actor.is_player() {
                actor.update_wander(&mut self.rng, now, wait)?;
            }
            actor.animate(now);
            actor.step(&self.bounds);
        }
        Ok(())
    }

    fn update_bubbles(&mut self, now: u64) {
        for actor in &mut self.actors {
            let owner = actor.rect();
            if let Some(bubble) = actor.chat_bubble_mut() {
                bubble.update(now, &owner);
            }
        }
    }

    fn resolve_obstacle_collisions(
        &mut self,
        now: u64,
        outcome: &mut TickOutcome,
    ) -> Result<(), SimError> {
        // First colliding obstacle only, decided before any actor moves.
        let hits: Vec<(usize, Rect)> = self
            .actors
            .iter()
            .enumerate()
            .filter_map(|(index, actor)| {
                self.obstacles
                    .iter()
                    .find(|obstacle| footprints_collide(actor.footprint(), obstacle.footprint()))
                    .map(|obstacle| (index, obstacle.footprint().rect()))
            })
            .collect();

        let amount = self.config.collision.bounce_amount;
        let wait = self.config.wander.wait_ms;
        for (index, obstacle) in hits {
            let actor = &mut self.actors[index];
            let facing = actor.facing();
            actor.bounce(&obstacle, facing, amount);
            trace!(actor = actor.id().0, facing = facing.as_token(), "obstacle_bounce");

            if let ActorKind::Player(state) = &mut actor.kind {
                if let Some(cue) = state.try_grunt(now, &mut self.rng, &self.grunts) {
                    outcome.sounds.push(cue);
                }
            } else if !actor.is_chatting() {
                actor.change_direction(&mut self.rng, now, wait, &[facing])?;
            }
        }
        Ok(())
    }

    fn resolve_chats(&mut self, now: u64) -> Result<(), SimError> {
        let autonomous: Vec<usize> = self
            .actors
            .iter()
            .enumerate()
            .filter(|(_, actor)| !actor.is_player())
            .map(|(index, _)| index)
            .collect();

        let mut current = BTreeSet::new();
        for (slot, &a) in autonomous.iter().enumerate() {
            for &b in &autonomous[slot + 1..] {
                let (left, right) = (&self.actors[a], &self.actors[b]);
                if footprints_collide(left.footprint(), right.footprint()) {
                    current.insert((left.id(), right.id()));
                }
            }
        }
        let fresh: Vec<(ActorId, ActorId)> =
            current.difference(&self.overlapping).copied().collect();
        self.overlapping = current;

        for (a, b) in fresh {
            let ready = |id: ActorId| {
                self.actor(id)
                    .and_then(Actor::autonomous)
                    .is_some_and(|state| state.can_chat(now))
            };
            if ready(a) && ready(b) {
                self.start_chat(a, b, now)?;
            }
        }
        Ok(())
    }

    fn start_chat(&mut self, a: ActorId, b: ActorId, now: u64) -> Result<(), SimError> {
        let rect_a = self.actor(a).ok_or(SimError::UnknownActor(a))?.rect();
        let rect_b = self.actor(b).ok_or(SimError::UnknownActor(b))?.rect();
        // `a < b` always holds, so ties leave `a` facing right.
        let (facing_a, facing_b) = if rect_a.center().0 > rect_b.center().0 {
            (Direction::Left, Direction::Right)
        } else {
            (Direction::Right, Direction::Left)
        };

        let chat = &self.config.chat;
        let shape = ConversationShape {
            min_len: chat.min_conversation_len,
            turn_len_min: chat.turn_len_min,
            turn_len_max: chat.turn_len_max,
            frame_count: self.bubble_frames.len(),
        };
        let (side_a, side_b) = synthesize_conversation(&mut self.rng, shape);
        let cooldown_a = sample_ms(&mut self.rng, chat.cooldown_ms);
        let cooldown_b = sample_ms(&mut self.rng, chat.cooldown_ms);
        let duration = chat.duration_ms;
        let bubbles = &self.config.bubbles;
        let bubble_a = ChatBubble::new(
            self.bubble_images(&side_a),
            now,
            duration,
            bubbles.frame_size,
            bubbles.overlap,
            &rect_a,
        );
        let bubble_b = ChatBubble::new(
            self.bubble_images(&side_b),
            now,
            duration,
            bubbles.frame_size,
            bubbles.overlap,
            &rect_b,
        );

        self.actor_mut(a)?
            .begin_chat(b, facing_a, now, duration, cooldown_a, bubble_a)?;
        self.actor_mut(b)?
            .begin_chat(a, facing_b, now, duration, cooldown_b, bubble_b)?;
        info!(
            actor = a.0,
            partner = b.0,
            frames = side_a.len(),
            "chat_started"
        );
        Ok(())
    }

    fn bubble_images(&self, indices: &[usize]) -> Vec<ImageId> {
        indices
            .iter()
            .filter_map(|index| self.bubble_frames.get(*index).copied())
            .collect()
    }

    /// Ends `id`'s chat early for both participants. The cooldown window of
    /// each restarts now. Returns false when `id` was not chatting.
    pub fn cancel_chat(&mut self, id: ActorId) -> Result<bool, SimError> {
        let now = self.clock.now_ms();
        let Some(session) = self.actor_mut(id)?.end_chat(now)? else {
            return Ok(false);
        };
        let partner = session.partner();
        self.actors
            .get_mut(partner.0 as usize)
            .ok_or(SimError::MissingChatPartner { actor: id, partner })?
            .end_chat(now)?;
        info!(actor = id.0, partner = partner.0, "chat_cancelled");
        Ok(true)
    }

    /// Rebuilds the render list from final positions and collects the
    /// regions that changed since the previous composition.
    fn compose(&mut self) {
        self.render.clear();
        if !self.composed {
            self.render.mark_dirty(self.bounds);
            self.composed = true;
        }
        for rect in self.pending_dirty.drain(..) {
            self.render.mark_dirty(rect);
        }

        for obstacle in self.obstacles.iter().filter(|o| o.is_visible()) {
            let rect = obstacle.rect();
            self.render.push(DrawCommand {
                image: obstacle.image,
                source: Rect::from_size(rect.w, rect.h),
                dest: rect,
                depth: rect.bottom(),
                kind: DrawSource::Obstacle,
            });
        }

        for actor in &mut self.actors {
            let id = actor.id();
            let rect = actor.rect();
            let image = actor.image();
            self.render.push(DrawCommand {
                image,
                source: Rect::from_size(rect.w, rect.h),
                dest: rect,
                depth: rect.bottom(),
                kind: DrawSource::Actor,
            });
            if actor.is_dirty() {
                if let Some(previous) = self.drawn_actors.insert(id, rect) {
                    if previous != rect {
                        self.render.mark_dirty(previous);
                    }
                }
                self.render.mark_dirty(rect);
                actor.clear_dirty();
            }

            let bubble = actor
                .autonomous()
                .and_then(AutonomousState::chat)
                .and_then(|session| {
                    let bubble = session.bubble();
                    bubble.image().map(|image| (bubble.rect(), image))
                });
            match bubble {
                Some((bubble_rect, bubble_image)) => {
                    self.render.push(DrawCommand {
                        image: bubble_image,
                        source: Rect::from_size(bubble_rect.w, bubble_rect.h),
                        dest: bubble_rect,
                        depth: rect.bottom(),
                        kind: DrawSource::Bubble,
                    });
                    let previous = self.drawn_bubbles.insert(id, (bubble_rect, bubble_image));
                    if previous != Some((bubble_rect, bubble_image)) {
                        if let Some((previous_rect, _)) = previous {
                            self.render.mark_dirty(previous_rect);
                        }
                        self.render.mark_dirty(bubble_rect);
                    }
                }
                None => {
                    if let Some((previous_rect, _)) = self.drawn_bubbles.remove(&id) {
                        self.render.mark_dirty(previous_rect);
                    }
                }
            }

            if let Some(ghost) = wrap_ghost(image, &rect, &self.bounds) {
                self.render.push(DrawCommand {
                    image: ghost.image,
                    source: ghost.source,
                    dest: ghost.dest,
                    depth: ghost.depth(),
                    kind: DrawSource::WrapGhost,
                });
                self.render.mark_dirty(ghost.dest);
                self.ghosts.push(ghost);
            }
        }

        self.render.sort_by_depth();
        debug!(
            commands = self.render.commands().len(),
            dirty = self.render.dirty().len(),
            ghosts = self.ghosts.len(),
            "world_composed"
        );
    }

    pub fn ghosts(&self) -> &[WrapGhost] {
        &self.ghosts
    }
}
