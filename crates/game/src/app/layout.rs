use townsfolk_engine::{LayoutProvider, ObstacleSpot, Rect};

/// Stone border with a gap in the middle of each edge, a hidden second
/// border just outside the world, and four short inner walls.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RingLayout;

impl LayoutProvider for RingLayout {
    fn obstacle_spots(&self, world: &Rect, tile_size: i32) -> Vec<ObstacleSpot> {
        let size = tile_size.max(1);
        let (left, top) = (world.left(), world.top());
        let (width, height) = (world.w, world.h);
        let mut spots = Vec::new();
        let mut place = |x: i32, y: i32, visible: bool| {
            spots.push(ObstacleSpot {
                topleft: (left + x, top + y),
                visible,
            });
        };

        for i in (0..width).step_by(size as usize) {
            if outside_gap(i, width, size) {
                place(i, -size, false);
                place(i, 0, true);
                place(i, height - size, true);
                place(i, height, false);
            }
            if (size * 4..size * 7).contains(&i) || (width - size * 7..width - size * 4).contains(&i)
            {
                place(i, size * 4, true);
                place(i, height - size * 5, true);
            }
        }

        for j in (size..height - size).step_by(size as usize) {
            if outside_gap(j, height, size) {
                place(-size, j, false);
                place(0, j, true);
                place(width - size, j, true);
                place(width, j, false);
            }
            if (size * 5..size * 7).contains(&j)
                || (height - size * 7..height - size * 5).contains(&j)
            {
                place(size * 6, j, true);
                place(width - size * 7, j, true);
            }
        }
        spots
    }
}

fn outside_gap(offset: i32, extent: i32, size: i32) -> bool {
    offset < extent / 2 - size * 2 || offset >= extent / 2 + size * 2
}
