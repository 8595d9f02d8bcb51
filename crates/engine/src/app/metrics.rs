use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics_lock_poisoned_recovered");
    }
}

/// Loop rates averaged over one metrics interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Ticks skipped because a frame hit `max_ticks_per_frame`.
    pub dropped_ticks: u32,
    /// Dirty regions the canvas repainted.
    pub repainted_regions: u32,
}

impl LoopMetricsSnapshot {
    pub fn window_title(&self, base: &str) -> String {
        format!(
            "{base} | {:.0} fps | {:.0} tps | {:.1} ms",
            self.fps, self.tps, self.frame_time_ms
        )
    }
}

/// Shared read side of the loop metrics, safe to hand to other threads.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(LoopMetricsSnapshot::default())),
        }
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    dropped_ticks: u32,
    repainted_regions: u32,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub(crate) fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval_start: start,
            interval,
            frames: 0,
            ticks: 0,
            dropped_ticks: 0,
            repainted_regions: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, repainted_regions: usize) {
        self.ticks = self.ticks.saturating_add(1);
        self.repainted_regions = self
            .repainted_regions
            .saturating_add(u32::try_from(repainted_regions).unwrap_or(u32::MAX));
    }

    pub(crate) fn record_dropped(&mut self, ticks: u32) {
        self.dropped_ticks = self.dropped_ticks.saturating_add(ticks);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            dropped_ticks: self.dropped_ticks,
            repainted_regions: self.repainted_regions,
        };

        *self = Self::starting_at(now, self.interval);
        Some(snapshot)
    }
}
