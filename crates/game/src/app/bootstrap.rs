use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use townsfolk_engine::{
    resolve_app_paths, session_seed, AssetBundle, AssetError, ConfigError, LoopConfig, Session,
    SessionError, SimConfig, StartupError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::layout::RingLayout;

pub(crate) const CONFIG_ENV_VAR: &str = "TOWNSFOLK_CONFIG";
pub(crate) const SEED_ENV_VAR: &str = "TOWNSFOLK_SEED";
const WINDOW_TITLE: &str = "townsfolk";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path} at {field}: {source}")]
    ParseConfig {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load assets: {0}")]
    Assets(#[from] AssetError),
    #[error("failed to set up the world: {0}")]
    Session(#[from] SessionError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Townsfolk Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        "startup"
    );

    let mut config = match config_override()? {
        Some(path) => load_config(&path)?,
        None if paths.config_file.is_file() => load_config(&paths.config_file)?,
        None => {
            info!(path = %paths.config_file.display(), "config_defaults");
            SimConfig::default()
        }
    };
    if let Some(seed) = seed_override() {
        config.seed = Some(seed);
    }
    config.validate()?;

    let seed = session_seed(config.seed);
    info!(seed, population = config.population.count, "config_loaded");

    let assets = AssetBundle::load(&paths.assets_dir, &config)?;
    let loop_config = LoopConfig::from_sim(&config, WINDOW_TITLE);
    let session = Session::build(config, assets, &RingLayout, seed)?;

    Ok(AppWiring {
        config: loop_config,
        session,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn config_override() -> Result<Option<PathBuf>, BootstrapError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(PathBuf::from(value))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(BootstrapError::EnvVar {
            var: CONFIG_ENV_VAR,
            source,
        }),
    }
}

fn seed_override() -> Option<u64> {
    match env::var(SEED_ENV_VAR) {
        Ok(value) => parse_seed(&value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = SEED_ENV_VAR, error = %err, "seed_env_unreadable");
            None
        }
    }
}

fn parse_seed(value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(env_var = SEED_ENV_VAR, value, "seed_env_invalid_ignored");
            None
        }
    }
}

pub(crate) fn load_config(path: &Path) -> Result<SimConfig, BootstrapError> {
    let raw = fs::read_to_string(path).map_err(|source| BootstrapError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|(field, source)| BootstrapError::ParseConfig {
        path: path.to_path_buf(),
        field,
        source,
    })?;
    info!(path = %path.display(), "config_file_loaded");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<SimConfig, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SimConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        (path, error.into_inner())
    })
}
