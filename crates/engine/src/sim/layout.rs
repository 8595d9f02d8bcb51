use tracing::info;

use crate::assets::ImageId;
use crate::geometry::Rect;

use super::{Obstacle, World};

/// One obstacle placement: image top-left in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleSpot {
    pub topleft: (i32, i32),
    pub visible: bool,
}

/// Source of the static obstacle arrangement. Consulted once while the
/// world is being set up.
pub trait LayoutProvider {
    fn obstacle_spots(&self, world: &Rect, tile_size: i32) -> Vec<ObstacleSpot>;
}

impl World {
    /// Adds one obstacle per spot the layout reports, all sharing `image`.
    /// Returns the number placed.
    pub fn place_layout(
        &mut self,
        layout: &dyn LayoutProvider,
        image: ImageId,
        image_size: (i32, i32),
    ) -> usize {
        let footprint = self.config().population.obstacle_footprint;
        let spots = layout.obstacle_spots(&self.bounds(), self.config().world.tile_size);
        let hidden = spots.iter().filter(|spot| !spot.visible).count();
        for spot in &spots {
            self.add_obstacle(Obstacle::new(
                spot.topleft,
                image_size,
                footprint,
                image,
                spot.visible,
            ));
        }
        info!(count = spots.len(), hidden, "obstacles_placed");
        spots.len()
    }
}
