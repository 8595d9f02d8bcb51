#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Integer axis-aligned rectangle in world or screen pixels.
///
/// `right()` and `bottom()` are exclusive edges, so a rect at x=0 with w=32
/// covers columns 0..32 and touches (but does not overlap) a rect at x=32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn with_midbottom(w: i32, h: i32, midbottom: (i32, i32)) -> Self {
        let mut rect = Self::from_size(w, h);
        rect.set_midbottom(midbottom);
        rect
    }

    pub fn with_center(w: i32, h: i32, center: (i32, i32)) -> Self {
        let mut rect = Self::from_size(w, h);
        rect.set_center(center);
        rect
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn set_center(&mut self, (cx, cy): (i32, i32)) {
        self.x = cx - self.w / 2;
        self.y = cy - self.h / 2;
    }

    pub fn midbottom(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.bottom())
    }

    pub fn set_midbottom(&mut self, (cx, bottom): (i32, i32)) {
        self.x = cx - self.w / 2;
        self.y = bottom - self.h;
    }

    pub fn midtop(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y)
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn translated(mut self, dx: i32, dy: i32) -> Self {
        self.translate(dx, dy);
        self
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Moves the rect inside `bounds`. A rect larger than `bounds` on an axis
    /// is centered on that axis instead.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        let x = if self.w >= bounds.w {
            bounds.x + bounds.w / 2 - self.w / 2
        } else {
            self.x.clamp(bounds.x, bounds.right() - self.w)
        };
        let y = if self.h >= bounds.h {
            bounds.y + bounds.h / 2 - self.h / 2
        } else {
            self.y.clamp(bounds.y, bounds.bottom() - self.h)
        };
        Rect::new(x, y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midbottom_anchor_round_trips() {
        let rect = Rect::with_midbottom(32, 36, (100, 200));
        assert_eq!(rect.midbottom(), (100, 200));
        assert_eq!(rect.top(), 164);
        assert_eq!(rect.left(), 84);
    }

    #[test]
    fn edge_touching_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 32, 32);
        let b = Rect::new(32, 0, 32, 32);
        let c = Rect::new(0, 32, 32, 32);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps(&Rect::new(31, 31, 4, 4)));
    }

    #[test]
    fn zero_area_rect_never_overlaps() {
        let a = Rect::new(0, 0, 32, 32);
        assert!(!a.overlaps(&Rect::new(10, 10, 0, 5)));
    }

    #[test]
    fn clamp_moves_inside_bounds() {
        let bounds = Rect::from_size(512, 512);
        let clamped = Rect::new(-20, 500, 128, 128).clamp_within(&bounds);
        assert_eq!(clamped, Rect::new(0, 384, 128, 128));
    }

    #[test]
    fn clamp_centers_oversized_rect() {
        let bounds = Rect::from_size(100, 100);
        let clamped = Rect::new(37, -4, 200, 50).clamp_within(&bounds);
        assert_eq!(clamped.x, -50);
        assert_eq!(clamped.y, 0);
    }

    #[test]
    fn intersection_of_overlapping_and_touching_rects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection(&Rect::new(10, 0, 5, 5)), None);
    }
}
