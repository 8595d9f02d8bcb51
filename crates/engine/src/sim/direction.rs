#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Sheet row order: UP, RIGHT, DOWN, LEFT.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub const fn row(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub const fn as_token(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

/// Currently held movement intents, most recent last. Each direction appears
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionStack {
    entries: Vec<Direction>,
}

impl DirectionStack {
    pub fn push(&mut self, direction: Direction) {
        self.remove(direction);
        self.entries.push(direction);
    }

    pub fn remove(&mut self, direction: Direction) {
        self.entries.retain(|held| *held != direction);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn top(&self) -> Option<Direction> {
        self.entries.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn as_slice(&self) -> &[Direction] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_existing_entry_to_top() {
        let mut stack = DirectionStack::default();
        stack.push(Direction::Up);
        stack.push(Direction::Right);
        stack.push(Direction::Up);
        assert_eq!(stack.as_slice(), &[Direction::Right, Direction::Up]);
        assert_eq!(stack.top(), Some(Direction::Up));
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut stack = DirectionStack::default();
        stack.push(Direction::Up);
        stack.push(Direction::Right);
        stack.push(Direction::Down);
        stack.remove(Direction::Right);
        assert_eq!(stack.as_slice(), &[Direction::Up, Direction::Down]);
    }

    #[test]
    fn unit_vectors_are_axis_aligned_and_cancel_out() {
        let mut sum = (0, 0);
        for direction in Direction::ALL {
            let (x, y) = direction.unit_vector();
            assert_eq!(x.abs() + y.abs(), 1);
            sum = (sum.0 + x, sum.1 + y);
        }
        assert_eq!(sum, (0, 0));
    }
}
