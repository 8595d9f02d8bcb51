mod keys;
mod placeholder;
mod sheet;
mod store;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::error::{ParameterError, ParameterErrorKind};
use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::render::Surface;
use crate::sim::WalkFrames;

pub use keys::AssetKeyError;
pub use sheet::{split_sheet, tile_surface, walk_frames_from_grid};
pub use store::{ImageId, ImageStore, SoundId};

use keys::validate_asset_key;

const SOUND_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];
const GRUNT_PREFIX: &str = "grunt";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to read sound {path}: {source}")]
    ReadSound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "sheet '{name}' is {size:?}, too small for {columns}x{rows} frames of {frame_size:?}"
    )]
    SheetTooSmall {
        name: String,
        size: (i32, i32),
        frame_size: (i32, i32),
        columns: u32,
        rows: u32,
    },
}

/// Encoded audio file kept in memory; decoded when played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundClip {
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Every image and sound handle the simulation needs, resolved once at
/// startup. Actors only keep ids into `images`.
#[derive(Debug, Clone)]
pub struct AssetBundle {
    pub images: ImageStore,
    pub characters: BTreeMap<String, WalkFrames>,
    pub bubbles: Vec<ImageId>,
    pub stone: ImageId,
    pub grass: ImageId,
    pub sounds: Vec<SoundClip>,
    pub grunts: Vec<SoundId>,
}

impl AssetBundle {
    /// Loads the asset directory layout: `grass.png`, `stone.png`,
    /// `bubblesheet.png`, `rpgsprites/*.png` and `sounds/grunt*`. Missing
    /// files fall back to generated art; files that exist but cannot be read
    /// are errors.
    pub fn load(dir: &Path, config: &SimConfig) -> Result<Self, AssetError> {
        let mut images = ImageStore::default();
        let tile = config.world.tile_size;

        let grass = match load_optional_image(&dir.join("grass.png"))? {
            Some(surface) => surface,
            None => placeholder::grass_tile(tile),
        };
        let grass = images.insert(grass);

        let stone = match load_optional_image(&dir.join("stone.png"))? {
            Some(surface) => surface,
            None => placeholder::stone(tile),
        };
        let stone = images.insert(stone);

        let bubble_sheet = match load_optional_image(&dir.join("bubblesheet.png"))? {
            Some(surface) => surface,
            None => placeholder::bubble_sheet(
                config.bubbles.frame_size,
                config.bubbles.frame_count,
            ),
        };
        let bubbles = split_bubbles(&mut images, &bubble_sheet, config)?;

        let mut characters = load_characters(&mut images, &dir.join("rpgsprites"), config)?;
        if characters.is_empty() {
            warn!(
                path = %dir.join("rpgsprites").display(),
                "asset_characters_missing_using_placeholder"
            );
            characters = placeholder_characters(&mut images, config)?;
        }

        let sounds = load_grunts(&dir.join("sounds"))?;
        let grunts = (0..sounds.len()).map(SoundId).collect();

        info!(
            images = images.len(),
            characters = characters.len(),
            sounds = sounds.len(),
            "assets_loaded"
        );
        Ok(Self {
            images,
            characters,
            bubbles,
            stone,
            grass,
            sounds,
            grunts,
        })
    }

    /// Generated art only; no filesystem access.
    pub fn placeholder(config: &SimConfig) -> Result<Self, AssetError> {
        let mut images = ImageStore::default();
        let grass = images.insert(placeholder::grass_tile(config.world.tile_size));
        let stone = images.insert(placeholder::stone(config.world.tile_size));
        let sheet = placeholder::bubble_sheet(config.bubbles.frame_size, config.bubbles.frame_count);
        let bubbles = split_bubbles(&mut images, &sheet, config)?;
        let characters = placeholder_characters(&mut images, config)?;
        Ok(Self {
            images,
            characters,
            bubbles,
            stone,
            grass,
            sounds: Vec::new(),
            grunts: Vec::new(),
        })
    }

    pub fn walk_frames(&self, character: &str) -> Option<WalkFrames> {
        self.characters.get(character).copied()
    }

    pub fn character_names(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    pub fn sound(&self, id: SoundId) -> Option<&SoundClip> {
        self.sounds.get(id.0)
    }
}

fn split_bubbles(
    images: &mut ImageStore,
    sheet: &Surface,
    config: &SimConfig,
) -> Result<Vec<ImageId>, AssetError> {
    let grid = split_sheet(
        images,
        "bubblesheet",
        sheet,
        config.bubbles.frame_size,
        config.bubbles.frame_count,
        1,
    )?;
    Ok(grid.into_iter().next().unwrap_or_default())
}

fn placeholder_characters(
    images: &mut ImageStore,
    config: &SimConfig,
) -> Result<BTreeMap<String, WalkFrames>, AssetError> {
    let animation = &config.animation;
    let mut characters = BTreeMap::new();
    for (index, name) in placeholder::PLACEHOLDER_CHARACTERS.iter().enumerate() {
        let sheet = placeholder::character_sheet(
            index,
            animation.frame_size,
            animation.sheet_columns,
            animation.sheet_rows,
        );
        if let Some(frames) = slice_character(images, name, &sheet, config)? {
            characters.insert((*name).to_string(), frames);
        }
    }
    Ok(characters)
}

fn slice_character(
    images: &mut ImageStore,
    name: &str,
    sheet: &Surface,
    config: &SimConfig,
) -> Result<Option<WalkFrames>, AssetError> {
    let animation = &config.animation;
    let grid = split_sheet(
        images,
        name,
        sheet,
        animation.frame_size,
        animation.sheet_columns,
        animation.sheet_rows,
    )?;
    Ok(walk_frames_from_grid(&grid))
}

fn load_characters(
    images: &mut ImageStore,
    dir: &Path,
    config: &SimConfig,
) -> Result<BTreeMap<String, WalkFrames>, AssetError> {
    let mut characters = BTreeMap::new();
    for path in sorted_files(dir)? {
        if !has_extension(&path, &["png"]) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if let Err(error) = validate_asset_key(stem) {
            warn!(path = %path.display(), error = %error, "asset_character_name_rejected");
            continue;
        }
        let sheet = decode_image(&path)?;
        if let Some(frames) = slice_character(images, stem, &sheet, config)? {
            characters.insert(stem.to_string(), frames);
        }
    }
    Ok(characters)
}

fn load_grunts(dir: &Path) -> Result<Vec<SoundClip>, AssetError> {
    let mut grunts = Vec::new();
    for path in sorted_files(dir)? {
        if !has_extension(&path, &SOUND_EXTENSIONS) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if !stem.starts_with(GRUNT_PREFIX) || validate_asset_key(stem).is_err() {
            continue;
        }
        let bytes = fs::read(&path).map_err(|source| AssetError::ReadSound {
            path: path.clone(),
            source,
        })?;
        grunts.push(SoundClip {
            name: stem.to_string(),
            bytes: Arc::new(bytes),
        });
    }
    Ok(grunts)
}

/// Files directly inside `dir`, sorted by path. A missing directory is empty.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| AssetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, accepted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| accepted.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

fn load_optional_image(path: &Path) -> Result<Option<Surface>, AssetError> {
    if !path.is_file() {
        warn!(path = %path.display(), "asset_missing_using_placeholder");
        return Ok(None);
    }
    decode_image(path).map(Some)
}

fn decode_image(path: &Path) -> Result<Surface, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Surface::from_rgba(width, height, rgba.into_raw()).ok_or_else(|| AssetError::Decode {
        path: path.to_path_buf(),
        source: image::ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )),
    })
}
