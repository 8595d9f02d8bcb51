use crate::geometry::Rect;

use super::animation::{WalkCycle, WalkFrames};
use super::autonomous::AutonomousState;
use super::footprint::Footprint;
use super::player::PlayerState;
use super::{Direction, DirectionStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone)]
pub enum ActorKind {
    Player(PlayerState),
    Autonomous(AutonomousState),
}

/// Everything needed to place a new actor in the world.
#[derive(Debug, Clone)]
pub struct ActorSpec {
    pub character: String,
    pub frames: WalkFrames,
    pub frame_size: (i32, i32),
    pub midbottom: (i32, i32),
    pub speed: i32,
    pub footprint: (i32, i32),
    pub facing: Direction,
    pub animation_fps: f32,
}

#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    character: String,
    pub(crate) kind: ActorKind,
    rect: Rect,
    footprint: Footprint,
    facing: Direction,
    stack: DirectionStack,
    speed: i32,
    walk: WalkCycle,
    dirty: bool,
}

impl Actor {
    pub fn new(id: ActorId, spec: ActorSpec, kind: ActorKind) -> Self {
        let rect = Rect::with_midbottom(spec.frame_size.0, spec.frame_size.1, spec.midbottom);
        Self {
            id,
            character: spec.character,
            kind,
            footprint: Footprint::anchored(spec.footprint, &rect),
            rect,
            facing: spec.facing,
            stack: DirectionStack::default(),
            speed: spec.speed,
            walk: WalkCycle::new(spec.frames, spec.facing, spec.animation_fps),
            dirty: true,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player(_))
    }

    pub fn autonomous(&self) -> Option<&AutonomousState> {
        match &self.kind {
            ActorKind::Autonomous(state) => Some(state),
            ActorKind::Player(_) => None,
        }
    }

    pub fn is_chatting(&self) -> bool {
        self.autonomous().is_some_and(AutonomousState::is_chatting)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn directions(&self) -> &DirectionStack {
        &self.stack
    }

    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn image(&self) -> crate::assets::ImageId {
        self.walk.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn push_direction(&mut self, direction: Direction) {
        self.stack.push(direction);
        self.set_facing(direction);
    }

    pub fn pop_direction(&mut self, direction: Direction) {
        self.stack.remove(direction);
        if let Some(top) = self.stack.top() {
            self.set_facing(top);
        }
    }

    pub(crate) fn clear_directions(&mut self) {
        self.stack.clear();
    }

    /// Turns the actor without asserting a movement intent.
    pub(crate) fn face(&mut self, direction: Direction) {
        self.stack.clear();
        self.set_facing(direction);
    }

    fn set_facing(&mut self, direction: Direction) {
        self.facing = direction;
        if self.walk.direction() != direction {
            self.walk.set_direction(direction);
            self.dirty = true;
        }
    }

    pub fn animate(&mut self, now_ms: u64) {
        if self.walk.advance(now_ms) {
            self.dirty = true;
        }
    }

    /// Moves one tick along the current facing unless idle or chatting, then
    /// folds fully off-world positions to the opposite edge and re-anchors the
    /// footprint.
    pub fn step(&mut self, world_bounds: &Rect) {
        if !self.stack.is_empty() && !self.is_chatting() {
            let (dx, dy) = self.facing.unit_vector();
            self.rect.translate(dx * self.speed, dy * self.speed);
            self.dirty = true;
        }
        self.wrap_move(world_bounds);
        self.footprint.reanchor(&self.rect);
    }

    /// Translates by one world dimension when the visual rect has left the
    /// world completely. Checks left, right, top, bottom in that order and
    /// moves along one axis at most.
    pub fn wrap_move(&mut self, world_bounds: &Rect) -> bool {
        let offset = if self.rect.right() < world_bounds.left() {
            Some((world_bounds.w, 0))
        } else if self.rect.left() > world_bounds.right() {
            Some((-world_bounds.w, 0))
        } else if self.rect.bottom() < world_bounds.top() {
            Some((0, world_bounds.h))
        } else if self.rect.top() > world_bounds.bottom() {
            Some((0, -world_bounds.h))
        } else {
            None
        };
        let Some((dx, dy)) = offset else {
            return false;
        };
        self.rect.translate(dx, dy);
        self.footprint.reanchor(&self.rect);
        self.dirty = true;
        true
    }

    /// Pushes the actor out of `obstacle` along the axis of `direction` so its
    /// footprint ends `amount` units clear of the obstacle's facing edge.
    pub fn bounce(&mut self, obstacle: &Rect, direction: Direction, amount: i32) {
        let footprint = self.footprint.rect();
        let (dx, dy) = match direction {
            Direction::Left => (obstacle.right() - (footprint.left() - amount), 0),
            Direction::Right => (obstacle.left() - (footprint.right() + amount), 0),
            Direction::Up => (0, obstacle.bottom() - (footprint.top() - amount)),
            Direction::Down => (0, obstacle.top() - (footprint.bottom() + amount)),
        };
        self.rect.translate(dx, dy);
        self.footprint.reanchor(&self.rect);
        self.dirty = true;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::assets::ImageId;

    pub(crate) fn walk_frames() -> WalkFrames {
        let mut grid = [[ImageId(0); 2]; 4];
        for direction in Direction::ALL {
            let row = direction.row();
            grid[row] = [ImageId(row * 2), ImageId(row * 2 + 1)];
        }
        WalkFrames { frames: grid }
    }

    pub(crate) fn spec_at(midbottom: (i32, i32), speed: i32) -> ActorSpec {
        ActorSpec {
            character: "tester".to_string(),
            frames: walk_frames(),
            frame_size: (32, 36),
            midbottom,
            speed,
            footprint: (30, 6),
            facing: Direction::Down,
            animation_fps: 10.0,
        }
    }

    pub(crate) fn player_at(midbottom: (i32, i32), speed: i32) -> Actor {
        Actor::new(
            ActorId(0),
            spec_at(midbottom, speed),
            ActorKind::Player(PlayerState::new(600)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::player_at;
    use super::*;

    const WORLD: Rect = Rect::new(0, 0, 512, 512);

    #[test]
    fn facing_tracks_last_pushed_direction() {
        let mut actor = player_at((256, 256), 3);
        actor.push_direction(Direction::Up);
        actor.push_direction(Direction::Right);
        assert_eq!(actor.facing(), Direction::Right);

        actor.pop_direction(Direction::Right);
        assert_eq!(actor.facing(), Direction::Up);
        assert!(!actor.is_idle());
    }

    #[test]
    fn popping_last_direction_keeps_facing_and_goes_idle() {
        let mut actor = player_at((256, 256), 3);
        actor.push_direction(Direction::Left);
        actor.pop_direction(Direction::Left);
        assert!(actor.is_idle());
        assert_eq!(actor.facing(), Direction::Left);

        let before = actor.rect();
        actor.step(&WORLD);
        assert_eq!(actor.rect(), before);
    }

    #[test]
    fn popping_buried_direction_keeps_top() {
        let mut actor = player_at((256, 256), 3);
        actor.push_direction(Direction::Up);
        actor.push_direction(Direction::Left);
        actor.pop_direction(Direction::Up);
        assert_eq!(actor.facing(), Direction::Left);
        assert_eq!(actor.directions().len(), 1);
    }

    #[test]
    fn facing_matches_stack_for_arbitrary_sequences() {
        let ops: [(bool, Direction); 12] = [
            (true, Direction::Up),
            (true, Direction::Right),
            (true, Direction::Up),
            (false, Direction::Down),
            (false, Direction::Up),
            (true, Direction::Left),
            (false, Direction::Right),
            (false, Direction::Left),
            (true, Direction::Down),
            (true, Direction::Right),
            (false, Direction::Right),
            (false, Direction::Down),
        ];
        let mut actor = player_at((256, 256), 3);
        let mut previous = actor.facing();
        for (push, direction) in ops {
            if push {
                actor.push_direction(direction);
            } else {
                actor.pop_direction(direction);
            }
            match actor.directions().top() {
                Some(top) => assert_eq!(actor.facing(), top),
                None => assert_eq!(actor.facing(), previous),
            }
            previous = actor.facing();
        }
    }

    #[test]
    fn step_translates_by_speed_along_facing() {
        let mut actor = player_at((256, 256), 3);
        actor.push_direction(Direction::Right);
        actor.step(&WORLD);
        assert_eq!(actor.rect().midbottom(), (259, 256));
        assert_eq!(actor.footprint().rect().midbottom(), (259, 256));
    }

    #[test]
    fn wrap_move_folds_fully_off_world_actor() {
        let mut actor = player_at((-17, 256), 3);
        assert!(actor.rect().right() < 0);
        assert!(actor.wrap_move(&WORLD));
        assert_eq!(actor.rect().midbottom(), (-17 + 512, 256));
    }

    /// Steps along `direction` until a wrap fold happens; returns the steps
    /// taken.
    fn walk_until_wrapped(actor: &mut Actor, direction: Direction) -> i32 {
        actor.push_direction(direction);
        for steps in 1..=400 {
            let before = actor.rect().x;
            actor.step(&WORLD);
            if (actor.rect().x - before).abs() > actor.speed() {
                return steps;
            }
        }
        panic!("walking {direction:?} never wrapped");
    }

    #[test]
    fn wrap_move_round_trip_restores_position() {
        let mut actor = player_at((16, 300), 3);
        let original = actor.rect();

        let left_steps = walk_until_wrapped(&mut actor, Direction::Left);
        assert_eq!(actor.rect().x, original.x - 3 * left_steps + WORLD.w);

        let right_steps = walk_until_wrapped(&mut actor, Direction::Right);
        // Both folds cancel; only the walked distance remains.
        assert_eq!(actor.rect().x, original.x + 3 * (right_steps - left_steps));
        assert!(right_steps >= left_steps);

        actor.push_direction(Direction::Left);
        for _ in 0..right_steps - left_steps {
            actor.step(&WORLD);
        }
        assert_eq!(actor.rect(), original);
        assert_eq!(actor.footprint().rect().midbottom(), (16, 300));
    }

    #[test]
    fn wrap_move_leaves_partially_visible_actor_alone() {
        let mut actor = player_at((5, 256), 3);
        assert!(!actor.wrap_move(&WORLD));
        assert_eq!(actor.rect().midbottom(), (5, 256));
    }

    #[test]
    fn bounce_leaves_clearance_on_every_axis() {
        let obstacle = Rect::new(200, 200, 28, 30);
        let cases = [
            (Direction::Left, (235, 215)),
            (Direction::Right, (195, 215)),
            (Direction::Up, (214, 232)),
            (Direction::Down, (214, 203)),
        ];
        for (direction, midbottom) in cases {
            let mut actor = player_at(midbottom, 3);
            assert!(
                actor.footprint().rect().overlaps(&obstacle),
                "{direction:?} setup should overlap"
            );
            actor.bounce(&obstacle, direction, 4);
            let fp = actor.footprint().rect();
            assert!(!fp.overlaps(&obstacle), "{direction:?}");
            match direction {
                Direction::Left => assert_eq!(fp.left() - obstacle.right(), 4),
                Direction::Right => assert_eq!(obstacle.left() - fp.right(), 4),
                Direction::Up => assert_eq!(fp.top() - obstacle.bottom(), 4),
                Direction::Down => assert_eq!(obstacle.top() - fp.bottom(), 4),
            }
        }
    }
}
