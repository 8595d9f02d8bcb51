use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: u64,
        max: u64,
    },
    #[error("{field} footprint {footprint:?} does not fit inside its image {image:?}")]
    FootprintTooLarge {
        field: &'static str,
        footprint: (i32, i32),
        image: (i32, i32),
    },
    #[error("sprite sheet needs at least 3 columns and 4 rows, got {columns}x{rows}")]
    SheetGridTooSmall { columns: u32, rows: u32 },
    #[error("viewport.zoom_levels {levels} exceeds {max} for a {width}x{height} world")]
    TooManyZoomLevels {
        levels: u32,
        max: u32,
        width: i32,
        height: i32,
    },
}

/// Inclusive integer range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RangeMs {
    pub min: u64,
    pub max: u64,
}

impl RangeMs {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            tile_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub ticks_per_second: u32,
    pub max_ticks_per_frame: u32,
    pub max_frame_delta_ms: u64,
    pub metrics_log_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            max_ticks_per_frame: 5,
            max_frame_delta_ms: 250,
            metrics_log_interval_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn fixed_dt(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ticks_per_second.max(1) as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub character: String,
    pub speed: i32,
    pub footprint: (i32, i32),
    pub grunt_cooldown_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            character: "warrior_m".to_string(),
            speed: 3,
            footprint: (30, 6),
            grunt_cooldown_ms: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub count: usize,
    pub speed_min: i32,
    pub speed_max: i32,
    pub footprint: (i32, i32),
    pub obstacle_footprint: (i32, i32),
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: 20,
            speed_min: 1,
            speed_max: 3,
            footprint: (30, 6),
            obstacle_footprint: (28, 30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub fps: f32,
    pub frame_size: (i32, i32),
    pub sheet_columns: u32,
    pub sheet_rows: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 10.0,
            frame_size: (32, 36),
            sheet_columns: 3,
            sheet_rows: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub wait_ms: RangeMs,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            wait_ms: RangeMs::new(500, 2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub duration_ms: u64,
    pub cooldown_ms: RangeMs,
    pub min_conversation_len: usize,
    pub turn_len_min: usize,
    pub turn_len_max: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            cooldown_ms: RangeMs::new(5000, 10000),
            min_conversation_len: 20,
            turn_len_min: 2,
            turn_len_max: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    pub frame_size: (i32, i32),
    pub frame_count: u32,
    pub overlap: i32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            frame_size: (32, 56),
            frame_count: 8,
            overlap: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub bounce_amount: i32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { bounce_amount: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub view_width: u32,
    pub view_height: u32,
    pub zoom_levels: u32,
    pub scroll_margin: i32,
    pub scroll_speed: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            view_width: 512,
            view_height: 512,
            zoom_levels: 3,
            scroll_margin: 20,
            scroll_speed: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: Option<u64>,
    pub world: WorldConfig,
    pub timing: TimingConfig,
    pub player: PlayerConfig,
    pub population: PopulationConfig,
    pub animation: AnimationConfig,
    pub wander: WanderConfig,
    pub chat: ChatConfig,
    pub bubbles: BubbleConfig,
    pub collision: CollisionConfig,
    pub viewport: ViewportConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width as i64)?;
        positive("world.height", self.world.height as i64)?;
        positive("world.tile_size", self.world.tile_size as i64)?;
        positive("timing.ticks_per_second", self.timing.ticks_per_second as i64)?;
        positive(
            "timing.max_ticks_per_frame",
            self.timing.max_ticks_per_frame as i64,
        )?;
        positive("player.speed", self.player.speed as i64)?;
        positive("population.speed_min", self.population.speed_min as i64)?;
        if self.population.speed_min > self.population.speed_max {
            return Err(ConfigError::InvertedRange {
                field: "population.speed",
                min: self.population.speed_min as u64,
                max: self.population.speed_max as u64,
            });
        }
        if !(self.animation.fps.is_finite() && self.animation.fps > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "animation.fps",
            });
        }
        if self.animation.sheet_columns < 3 || self.animation.sheet_rows < 4 {
            return Err(ConfigError::SheetGridTooSmall {
                columns: self.animation.sheet_columns,
                rows: self.animation.sheet_rows,
            });
        }
        fits("player", self.player.footprint, self.animation.frame_size)?;
        fits(
            "population",
            self.population.footprint,
            self.animation.frame_size,
        )?;
        self.wander.wait_ms.validate("wander.wait_ms")?;
        self.chat.cooldown_ms.validate("chat.cooldown_ms")?;
        positive("chat.duration_ms", self.chat.duration_ms as i64)?;
        positive("chat.turn_len_min", self.chat.turn_len_min as i64)?;
        if self.chat.turn_len_min > self.chat.turn_len_max {
            return Err(ConfigError::InvertedRange {
                field: "chat.turn_len",
                min: self.chat.turn_len_min as u64,
                max: self.chat.turn_len_max as u64,
            });
        }
        // Index 0 is the blank frame, talking needs at least one more.
        if self.bubbles.frame_count < 2 {
            return Err(ConfigError::NonPositive {
                field: "bubbles.frame_count",
            });
        }
        positive("viewport.view_width", self.viewport.view_width as i64)?;
        positive("viewport.view_height", self.viewport.view_height as i64)?;
        positive("viewport.zoom_levels", self.viewport.zoom_levels as i64)?;
        let max = zoom_level_limit(self.world.width, self.world.height);
        if self.viewport.zoom_levels > max {
            return Err(ConfigError::TooManyZoomLevels {
                levels: self.viewport.zoom_levels,
                max,
                width: self.world.width,
                height: self.world.height,
            });
        }
        Ok(())
    }
}

/// Number of zoom levels before halving the smaller world side reaches one
/// pixel.
pub fn zoom_level_limit(width: i32, height: i32) -> u32 {
    let smallest = width.min(height).max(1) as u32;
    smallest.ilog2() + 1
}

fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

fn fits(field: &'static str, footprint: (i32, i32), image: (i32, i32)) -> Result<(), ConfigError> {
    if footprint.0 <= 0 || footprint.1 <= 0 || footprint.0 > image.0 || footprint.1 > image.1 {
        return Err(ConfigError::FootprintTooLarge {
            field,
            footprint,
            image,
        });
    }
    Ok(())
}
