use crate::assets::ImageId;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapEdge {
    Left,
    Right,
    Top,
    Bottom,
}

/// One-frame render entity showing the slice of an actor's image that hangs
/// off one world edge, drawn at the mirrored spot on the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapGhost {
    pub image: ImageId,
    pub edge: WrapEdge,
    /// Region of the source image, in image coordinates.
    pub source: Rect,
    /// Where the slice lands, in world coordinates.
    pub dest: Rect,
}

impl WrapGhost {
    pub fn depth(&self) -> i32 {
        self.dest.bottom()
    }
}

/// Builds the ghost for an actor drawn at `rect` that is not fully inside
/// `world`. Edges are tested left, right, top, bottom and only the first hit
/// produces a ghost.
pub fn wrap_ghost(image: ImageId, rect: &Rect, world: &Rect) -> Option<WrapGhost> {
    if world.contains_rect(rect) {
        return None;
    }
    let (w, h) = rect.size();
    let (edge, source, dest) = if rect.left() < world.left() {
        let sub_w = (world.left() - rect.left()).min(w);
        (
            WrapEdge::Left,
            Rect::new(0, 0, sub_w, h),
            Rect::new(world.right() - sub_w, rect.y, sub_w, h),
        )
    } else if rect.right() > world.right() {
        let sub_w = (rect.right() - world.right()).min(w);
        (
            WrapEdge::Right,
            Rect::new(w - sub_w, 0, sub_w, h),
            Rect::new(world.left(), rect.y, sub_w, h),
        )
    } else if rect.top() < world.top() {
        let sub_h = (world.top() - rect.top()).min(h);
        (
            WrapEdge::Top,
            Rect::new(0, 0, w, sub_h),
            Rect::new(rect.x, world.bottom() - sub_h, w, sub_h),
        )
    } else {
        let sub_h = (rect.bottom() - world.bottom()).min(h);
        (
            WrapEdge::Bottom,
            Rect::new(0, h - sub_h, w, sub_h),
            Rect::new(rect.x, world.top(), w, sub_h),
        )
    };
    if source.is_empty() {
        return None;
    }
    Some(WrapGhost {
        image,
        edge,
        source,
        dest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Rect = Rect::new(0, 0, 512, 512);

    #[test]
    fn fully_inside_actor_has_no_ghost() {
        assert_eq!(
            wrap_ghost(ImageId(1), &Rect::new(240, 220, 32, 36), &WORLD),
            None
        );
        assert_eq!(
            wrap_ghost(ImageId(1), &Rect::new(480, 476, 32, 36), &WORLD),
            None
        );
    }

    #[test]
    fn left_overhang_mirrors_to_right_edge() {
        let ghost = wrap_ghost(ImageId(1), &Rect::new(-10, 100, 32, 36), &WORLD).expect("ghost");
        assert_eq!(ghost.edge, WrapEdge::Left);
        assert_eq!(ghost.source, Rect::new(0, 0, 10, 36));
        assert_eq!(ghost.dest, Rect::new(502, 100, 10, 36));
        assert_eq!(ghost.depth(), 136);
    }

    #[test]
    fn right_overhang_mirrors_to_left_edge() {
        let ghost = wrap_ghost(ImageId(1), &Rect::new(500, 100, 32, 36), &WORLD).expect("ghost");
        assert_eq!(ghost.edge, WrapEdge::Right);
        assert_eq!(ghost.source, Rect::new(12, 0, 20, 36));
        assert_eq!(ghost.dest, Rect::new(0, 100, 20, 36));
    }

    #[test]
    fn top_overhang_mirrors_to_bottom_edge() {
        let ghost = wrap_ghost(ImageId(1), &Rect::new(200, -6, 32, 36), &WORLD).expect("ghost");
        assert_eq!(ghost.edge, WrapEdge::Top);
        assert_eq!(ghost.source, Rect::new(0, 0, 32, 6));
        assert_eq!(ghost.dest, Rect::new(200, 506, 32, 6));
        assert_eq!(ghost.depth(), 512);
    }

    #[test]
    fn bottom_overhang_mirrors_to_top_edge() {
        let ghost = wrap_ghost(ImageId(1), &Rect::new(200, 490, 32, 36), &WORLD).expect("ghost");
        assert_eq!(ghost.edge, WrapEdge::Bottom);
        assert_eq!(ghost.source, Rect::new(0, 22, 32, 14));
        assert_eq!(ghost.dest, Rect::new(200, 0, 32, 14));
    }

    #[test]
    fn corner_overhang_prefers_horizontal_edge() {
        let ghost = wrap_ghost(ImageId(1), &Rect::new(-4, -4, 32, 36), &WORLD).expect("ghost");
        assert_eq!(ghost.edge, WrapEdge::Left);
    }
}
