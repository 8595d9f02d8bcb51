use thiserror::Error;
use tracing::{debug, info};

use crate::assets::{AssetBundle, ImageId, ImageStore, SoundClip};
use crate::config::{ConfigError, SimConfig};
use crate::error::SimError;
use crate::input::InputEvent;
use crate::render::{Canvas, Surface, Viewport};
use crate::sim::{open_spots, LayoutProvider, SoundCue, World};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("image {0:?} is not in the image store")]
    MissingImage(ImageId),
}

/// What one session tick produced, for the window layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTick {
    pub quit: bool,
    pub sounds: Vec<SoundCue>,
    pub repainted: usize,
    pub zoomed: bool,
    pub resampled: bool,
}

/// A running simulation together with the surfaces that present it.
#[derive(Debug)]
pub struct Session {
    world: World,
    canvas: Canvas,
    viewport: Viewport,
    images: ImageStore,
    sounds: Vec<SoundClip>,
}

impl Session {
    /// Validates `config`, places the layout's obstacles, puts the player at
    /// the world center and seeds the population on the remaining open spots.
    pub fn build(
        config: SimConfig,
        assets: AssetBundle,
        layout: &dyn LayoutProvider,
        seed: u64,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let stone_size = assets
            .images
            .size_of(assets.stone)
            .ok_or(SessionError::MissingImage(assets.stone))?;
        let grass_tile = assets
            .images
            .get(assets.grass)
            .ok_or(SessionError::MissingImage(assets.grass))?;

        let mut world = World::new(config, &assets, seed);
        world.place_layout(layout, assets.stone, stone_size);

        let bounds = world.bounds();
        world.spawn_player(bounds.center())?;

        let spots = open_spots(
            &bounds,
            world.config().world.tile_size,
            world.config().population.footprint.1,
            &world.taken_footprints(),
        );
        world.seed_population(&spots)?;

        let canvas = Canvas::new((bounds.w as u32, bounds.h as u32), grass_tile);
        let viewport = Viewport::new(bounds, &world.config().viewport);
        info!(
            seed,
            actors = world.actors().len(),
            obstacles = world.obstacles().len(),
            "session_built"
        );
        let AssetBundle { images, sounds, .. } = assets;
        Ok(Self {
            world,
            canvas,
            viewport,
            images,
            sounds,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Loaded clips, indexed by the `SoundId`s in sound cues.
    pub fn sounds(&self) -> &[SoundClip] {
        &self.sounds
    }

    /// Output image of view size, ready to present.
    pub fn frame(&self) -> &Surface {
        self.viewport.image()
    }

    /// World tick, repaint of the dirty regions, then the viewport reacts to
    /// clicks and the pointer and resamples if its region changed.
    pub fn tick(
        &mut self,
        events: &[InputEvent],
        pointer: Option<(i32, i32)>,
    ) -> Result<SessionTick, SimError> {
        let dt = self.world.config().timing.fixed_dt();
        let outcome = self.world.tick(dt, events)?;
        let repainted = self
            .canvas
            .repaint(self.world.render_list(), &self.images);

        let mut zoomed = false;
        for event in events {
            if let InputEvent::MouseDown { button, position } = *event {
                zoomed |= self.viewport.handle_click(button, position);
            }
        }
        self.viewport.update(pointer, self.world.render_list().dirty());
        let resampled = self.viewport.refresh(self.canvas.surface());

        for cue in &outcome.sounds {
            let name = self
                .sounds
                .get(cue.sound.0)
                .map_or("unknown", |clip| clip.name.as_str());
            debug!(sound = name, "sound_cue");
        }

        Ok(SessionTick {
            quit: outcome.quit,
            sounds: outcome.sounds,
            repainted,
            zoomed,
            resampled,
        })
    }
}
