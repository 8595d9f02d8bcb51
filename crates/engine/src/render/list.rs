use crate::assets::ImageId;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    Obstacle,
    Actor,
    Bubble,
    WrapGhost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub image: ImageId,
    /// Region of the image to draw, in image coordinates.
    pub source: Rect,
    /// Destination in world coordinates; same size as `source`.
    pub dest: Rect,
    pub depth: i32,
    pub kind: DrawSource,
}

/// Depth-ordered draw commands for one tick plus the world regions that need
/// repainting.
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    commands: Vec<DrawCommand>,
    dirty: Vec<Rect>,
}

impl RenderList {
    pub(crate) fn clear(&mut self) {
        self.commands.clear();
        self.dirty.clear();
    }

    pub(crate) fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub(crate) fn mark_dirty(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.dirty.push(rect);
        }
    }

    /// Stable sort: equal depths keep insertion order.
    pub(crate) fn sort_by_depth(&mut self) {
        self.commands.sort_by_key(|command| command.depth);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn dirty(&self) -> &[Rect] {
        &self.dirty
    }

    pub fn ghost_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| command.kind == DrawSource::WrapGhost)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(depth: i32, image: usize) -> DrawCommand {
        DrawCommand {
            image: ImageId(image),
            source: Rect::from_size(1, 1),
            dest: Rect::new(0, depth - 1, 1, 1),
            depth,
            kind: DrawSource::Actor,
        }
    }

    #[test]
    fn sort_is_stable_for_equal_depths() {
        let mut list = RenderList::default();
        list.push(command(40, 1));
        list.push(command(10, 2));
        list.push(command(40, 3));
        list.push(command(10, 4));
        list.sort_by_depth();
        let order: Vec<usize> = list.commands().iter().map(|c| c.image.0).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn empty_dirty_rects_are_dropped() {
        let mut list = RenderList::default();
        list.mark_dirty(Rect::new(0, 0, 0, 10));
        list.mark_dirty(Rect::new(0, 0, 5, 5));
        assert_eq!(list.dirty(), &[Rect::new(0, 0, 5, 5)]);
    }
}
