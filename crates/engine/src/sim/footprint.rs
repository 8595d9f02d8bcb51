use crate::geometry::Rect;

/// Collision rectangle anchored to a visual rect: same horizontal center and
/// same bottom edge. Never used for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    rect: Rect,
}

impl Footprint {
    pub fn anchored(size: (i32, i32), visual: &Rect) -> Self {
        Self {
            rect: Rect::with_midbottom(size.0, size.1, visual.midbottom()),
        }
    }

    pub fn reanchor(&mut self, visual: &Rect) {
        self.rect.set_midbottom(visual.midbottom());
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// The only collision predicate in the simulation: positive-area overlap of
/// two footprints.
pub fn footprints_collide(a: &Footprint, b: &Footprint) -> bool {
    a.rect.overlaps(&b.rect)
}
