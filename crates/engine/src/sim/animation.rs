use crate::assets::ImageId;

use super::Direction;

/// Two walk frames per direction, indexed by `Direction::row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkFrames {
    pub frames: [[ImageId; 2]; 4],
}

impl WalkFrames {
    pub fn for_direction(&self, direction: Direction) -> [ImageId; 2] {
        self.frames[direction.row()]
    }
}

/// Time-gated two-frame walk cycle. Advancing is gated by `1000 / fps`
/// milliseconds unless a redraw was forced by a direction change.
#[derive(Debug, Clone)]
pub struct WalkCycle {
    frames: WalkFrames,
    direction: Direction,
    next_index: usize,
    current: ImageId,
    last_advance_ms: u64,
    interval_ms: f64,
    redraw: bool,
}

impl WalkCycle {
    pub fn new(frames: WalkFrames, direction: Direction, fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 10.0 };
        Self {
            frames,
            direction,
            next_index: 0,
            current: frames.for_direction(direction)[0],
            last_advance_ms: 0,
            interval_ms: 1000.0 / fps as f64,
            redraw: true,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> ImageId {
        self.current
    }

    pub fn frame_index(&self) -> usize {
        // `next_index` already points past the frame on display.
        (self.next_index + 1) % 2
    }

    /// Switches the cycle to `direction`, restarting it at frame A and forcing
    /// the next `advance` to draw immediately.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction == self.direction {
            return;
        }
        self.direction = direction;
        self.next_index = 0;
        self.redraw = true;
    }

    /// Returns true when a new frame was put on display.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.last_advance_ms) as f64;
        let advanced = if self.redraw || elapsed > self.interval_ms {
            self.current = self.frames.for_direction(self.direction)[self.next_index];
            self.next_index = (self.next_index + 1) % 2;
            self.last_advance_ms = now_ms;
            true
        } else {
            false
        };
        self.redraw = false;
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> WalkFrames {
        let mut grid = [[ImageId(0); 2]; 4];
        for direction in Direction::ALL {
            let row = direction.row();
            grid[row] = [ImageId(row * 10), ImageId(row * 10 + 1)];
        }
        WalkFrames { frames: grid }
    }

    #[test]
    fn first_advance_is_forced() {
        let mut cycle = WalkCycle::new(frames(), Direction::Down, 10.0);
        assert!(cycle.advance(0));
        assert_eq!(cycle.current(), ImageId(20));
    }

    #[test]
    fn advance_waits_for_interval() {
        let mut cycle = WalkCycle::new(frames(), Direction::Down, 10.0);
        cycle.advance(0);
        assert!(!cycle.advance(50));
        assert!(!cycle.advance(100));
        assert!(cycle.advance(101));
        assert_eq!(cycle.current(), ImageId(21));
        assert!(cycle.advance(202));
        assert_eq!(cycle.current(), ImageId(20));
    }

    #[test]
    fn direction_change_restarts_at_first_frame_immediately() {
        let mut cycle = WalkCycle::new(frames(), Direction::Down, 10.0);
        cycle.advance(0);
        cycle.advance(150);
        assert_eq!(cycle.current(), ImageId(21));

        cycle.set_direction(Direction::Left);
        assert!(cycle.advance(160));
        assert_eq!(cycle.current(), ImageId(30));
        assert_eq!(cycle.frame_index(), 0);

        // The forced frame restarts the timer, so the next one waits a full interval.
        assert!(!cycle.advance(200));
        assert!(cycle.advance(261));
        assert_eq!(cycle.current(), ImageId(31));
    }

    #[test]
    fn same_direction_does_not_force_redraw() {
        let mut cycle = WalkCycle::new(frames(), Direction::Up, 10.0);
        cycle.advance(0);
        cycle.set_direction(Direction::Up);
        assert!(!cycle.advance(10));
    }

    #[test]
    fn cycle_is_deterministic_for_fixed_time_samples() {
        let samples: Vec<u64> = (0..200).map(|tick| tick * 17).collect();
        let run = || {
            let mut cycle = WalkCycle::new(frames(), Direction::Right, 10.0);
            samples
                .iter()
                .map(|now| {
                    cycle.advance(*now);
                    cycle.current()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
