use crate::assets::{tile_surface, ImageStore};
use super::{RenderList, Surface};

/// World-sized software surface over a tiled background. Only regions the
/// render list reports as dirty are repainted.
#[derive(Debug, Clone)]
pub struct Canvas {
    background: Surface,
    surface: Surface,
}

impl Canvas {
    pub fn new(size: (u32, u32), tile: &Surface) -> Self {
        let background = tile_surface(size, tile);
        Self {
            surface: background.clone(),
            background,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn background(&self) -> &Surface {
        &self.background
    }

    /// Restores the background under each dirty region and redraws every
    /// command touching it, clipped to the region, in list order. Returns the
    /// number of regions repainted.
    pub fn repaint(&mut self, list: &RenderList, images: &ImageStore) -> usize {
        let bounds = self.surface.rect();
        let mut repainted = 0;
        for region in list.dirty() {
            let Some(clip) = region.intersection(&bounds) else {
                continue;
            };
            self.surface
                .copy_from(&self.background, &clip, (clip.x, clip.y));
            for command in list.commands() {
                if !command.dest.overlaps(&clip) {
                    continue;
                }
                let Some(image) = images.get(command.image) else {
                    continue;
                };
                self.surface
                    .blit(image, &command.source, (command.dest.x, command.dest.y), &clip);
            }
            repainted += 1;
        }
        repainted
    }
}
