use rand::Rng;

use crate::assets::ImageId;
use crate::geometry::Rect;

pub const BLANK_BUBBLE_INDEX: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationShape {
    pub min_len: usize,
    pub turn_len_min: usize,
    pub turn_len_max: usize,
    /// Total bubble frames including the blank one at index 0.
    pub frame_count: usize,
}

/// Builds the two sides of a conversation as bubble frame indices. Turns of
/// random length alternate between the sides; the listening side shows the
/// blank frame for the whole turn. Both sides grow together, so they always
/// have the same length and can be zipped frame by frame.
pub fn synthesize_conversation<R: Rng + ?Sized>(
    rng: &mut R,
    shape: ConversationShape,
) -> (Vec<usize>, Vec<usize>) {
    let turn_min = shape.turn_len_min.max(1);
    let turn_max = shape.turn_len_max.max(turn_min);
    let talk_max = shape.frame_count.max(2);

    let mut left = Vec::with_capacity(shape.min_len + turn_max);
    let mut right = Vec::with_capacity(shape.min_len + turn_max);
    let mut left_talks = rng.random_bool(0.5);

    while left.len() < shape.min_len || right.len() < shape.min_len {
        let turn_len = rng.random_range(turn_min..=turn_max);
        for _ in 0..turn_len {
            let spoken = rng.random_range(1..talk_max);
            if left_talks {
                left.push(spoken);
                right.push(BLANK_BUBBLE_INDEX);
            } else {
                left.push(BLANK_BUBBLE_INDEX);
                right.push(spoken);
            }
        }
        left_talks = !left_talks;
    }

    (left, right)
}

/// Speech bubble shown above a chatting actor. Plays its frame sequence spread
/// evenly over the chat and is dropped with the chat.
#[derive(Debug, Clone)]
pub struct ChatBubble {
    frames: Vec<ImageId>,
    started_ms: u64,
    frame_ms: f64,
    rect: Rect,
    overlap: i32,
    shown: usize,
}

impl ChatBubble {
    pub fn new(
        frames: Vec<ImageId>,
        started_ms: u64,
        duration_ms: u64,
        size: (i32, i32),
        overlap: i32,
        owner: &Rect,
    ) -> Self {
        let frame_ms = duration_ms.max(1) as f64 / frames.len().max(1) as f64;
        let mut rect = Rect::from_size(size.0, size.1);
        let (cx, top) = owner.midtop();
        rect.set_midbottom((cx, top + overlap));
        Self {
            frames,
            started_ms,
            frame_ms,
            rect,
            overlap,
            shown: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn image(&self) -> Option<ImageId> {
        self.frames.get(self.shown).copied()
    }

    /// Follows the owner and steps the sequence. Returns true when either the
    /// position or the displayed frame changed.
    pub fn update(&mut self, now_ms: u64, owner: &Rect) -> bool {
        let before = (self.rect, self.shown);
        let (cx, top) = owner.midtop();
        self.rect.set_midbottom((cx, top + self.overlap));
        let elapsed = now_ms.saturating_sub(self.started_ms) as f64;
        let index = (elapsed / self.frame_ms) as usize;
        self.shown = index.min(self.frames.len().saturating_sub(1));
        before != (self.rect, self.shown)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn shape() -> ConversationShape {
        ConversationShape {
            min_len: 20,
            turn_len_min: 2,
            turn_len_max: 5,
            frame_count: 8,
        }
    }

    #[test]
    fn conversation_sides_have_equal_length_of_at_least_minimum() {
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (left, right) = synthesize_conversation(&mut rng, shape());
            assert_eq!(left.len(), right.len());
            assert!(left.len() >= 20, "seed={seed}");
            assert!(left.len() < 20 + 5, "seed={seed}");
        }
    }

    #[test]
    fn exactly_one_side_talks_per_frame() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (left, right) = synthesize_conversation(&mut rng, shape());
        for (a, b) in left.iter().zip(right.iter()) {
            let talking = (*a != BLANK_BUBBLE_INDEX) as u8 + (*b != BLANK_BUBBLE_INDEX) as u8;
            assert_eq!(talking, 1);
            assert!(*a < 8 && *b < 8);
        }
    }

    #[test]
    fn turns_alternate_with_bounded_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (left, _) = synthesize_conversation(&mut rng, shape());
        let mut runs = Vec::new();
        let mut current = (left[0] != BLANK_BUBBLE_INDEX, 0usize);
        for index in &left {
            let talking = *index != BLANK_BUBBLE_INDEX;
            if talking == current.0 {
                current.1 += 1;
            } else {
                runs.push(current.1);
                current = (talking, 1);
            }
        }
        // Interior runs are single turns; the last one may be cut by nothing.
        for run in runs {
            assert!((2..=5).contains(&run), "run={run}");
        }
    }

    #[test]
    fn bubble_spreads_frames_over_duration_and_follows_owner() {
        let frames: Vec<ImageId> = (0..4).map(ImageId).collect();
        let owner = Rect::new(100, 100, 32, 36);
        let mut bubble = ChatBubble::new(frames, 1000, 4000, (32, 56), 4, &owner);
        assert_eq!(bubble.rect().midbottom(), (116, 104));
        assert_eq!(bubble.image(), Some(ImageId(0)));

        assert!(!bubble.update(1999, &owner));
        assert!(bubble.update(2000, &owner));
        assert_eq!(bubble.image(), Some(ImageId(1)));

        let moved = owner.translated(3, 0);
        assert!(bubble.update(2001, &moved));
        assert_eq!(bubble.rect().midbottom(), (119, 104));

        bubble.update(9000, &moved);
        assert_eq!(bubble.image(), Some(ImageId(3)));
    }
}
