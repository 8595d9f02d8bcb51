mod audio;
mod loop_runner;
mod metrics;
mod session;

pub use audio::SoundPlayer;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use session::{Session, SessionError, SessionTick};
