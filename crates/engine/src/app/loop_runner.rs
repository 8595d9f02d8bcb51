use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::input::{InputEvent, KeyCode, MouseButton};
use crate::render::Surface;

use super::metrics::MetricsAccumulator;
use super::{MetricsHandle, Session, SoundPlayer};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub view_width: u32,
    pub view_height: u32,
    pub fixed_dt: Duration,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from_sim(&SimConfig::default(), "townsfolk")
    }
}

impl LoopConfig {
    pub fn from_sim(config: &SimConfig, window_title: impl Into<String>) -> Self {
        Self {
            window_title: window_title.into(),
            view_width: config.viewport.view_width,
            view_height: config.viewport.view_height,
            fixed_dt: config.timing.fixed_dt(),
            max_frame_delta: Duration::from_millis(config.timing.max_frame_delta_ms),
            max_ticks_per_frame: config.timing.max_ticks_per_frame,
            metrics_log_interval: Duration::from_millis(config.timing.metrics_log_interval_ms),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel buffer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("simulation tick failed: {0}")]
    Tick(#[from] SimError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, session: Session) -> Result<(), AppError> {
    run_app_with_metrics(config, session, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut session: Session,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.view_width as f64,
                config.view_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut presenter = Presenter::new(Arc::clone(&window), config.view_width, config.view_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let fixed_dt = normalize_non_zero_duration(config.fixed_dt, Duration::from_millis(16));
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    info!(
        fixed_dt_us = fixed_dt.as_micros() as u64,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        view_width = config.view_width,
        view_height = config.view_height,
        "loop_config"
    );

    let mut sound_player = SoundPlayer::open(session.sounds().to_vec());
    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut tick_failure: Option<SimError> = None;

    let run_result = event_loop.run(|event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                info!(reason = "window_close", "shutdown_requested");
                window_target.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Err(error) = presenter.resize(new_size.width, new_size.height) {
                    warn!(error = %error, "renderer_resize_failed");
                    window_target.exit();
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                if let Err(error) = presenter.resize(size.width, size.height) {
                    warn!(error = %error, "renderer_resize_failed");
                    window_target.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                input_collector.set_pointer(presenter.buffer_position(position));
            }
            WindowEvent::CursorLeft { .. } => {
                input_collector.set_pointer(None);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                input_collector.handle_mouse_input(button, state);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                input_collector.handle_keyboard_input(&event);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                last_frame_instant = now;
                accumulator =
                    accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                for _ in 0..step_plan.ticks_to_run {
                    let events = input_collector.drain_for_tick();
                    let tick = match session.tick(&events, input_collector.pointer()) {
                        Ok(tick) => tick,
                        Err(error) => {
                            error!(error = %error, "tick_failed");
                            tick_failure = Some(error);
                            window_target.exit();
                            return;
                        }
                    };
                    metrics_accumulator.record_tick(tick.repainted);
                    for cue in &tick.sounds {
                        sound_player.play(cue);
                    }
                    if tick.zoomed {
                        let center = session.viewport().view_center();
                        presenter.warp_pointer_to_center();
                        input_collector.set_pointer(Some(center));
                    }
                    if tick.quit {
                        info!(reason = "quit_event", "shutdown_requested");
                        window_target.exit();
                        return;
                    }
                }
                accumulator = step_plan.remaining_accumulator;

                if step_plan.dropped_backlog > Duration::ZERO {
                    let dropped = dropped_tick_count(step_plan.dropped_backlog, fixed_dt);
                    metrics_accumulator.record_dropped(dropped);
                    warn!(
                        dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                        dropped_ticks = dropped,
                        max_ticks_per_frame,
                        "sim_clamp_triggered"
                    );
                }

                if let Err(error) = presenter.present(session.frame()) {
                    warn!(error = %error, "renderer_draw_failed");
                    window_target.exit();
                }
                metrics_accumulator.record_frame(raw_frame_dt);

                if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                    metrics_handle.publish(snapshot);
                    info!(
                        fps = snapshot.fps,
                        tps = snapshot.tps,
                        frame_time_ms = snapshot.frame_time_ms,
                        dropped_ticks = snapshot.dropped_ticks,
                        repainted_regions = snapshot.repainted_regions,
                        sim_time_ms = session.world().now_ms(),
                        "loop_metrics"
                    );
                    window.set_title(&snapshot.window_title(&config.window_title));
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            window.request_redraw();
        }
        Event::LoopExiting => {
            info!(sim_time_ms = session.world().now_ms(), "shutdown");
        }
        _ => {}
    });

    run_result.map_err(AppError::EventLoopRun)?;
    match tick_failure {
        Some(error) => Err(AppError::Tick(error)),
        None => Ok(()),
    }
}

/// Fixed-size pixel buffer holding the viewport image, scaled into the
/// window by `pixels`.
struct Presenter {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

impl Presenter {
    fn new(window: Arc<Window>, view_width: u32, view_height: u32) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(view_width, view_height, surface)?;
        Ok(Self { window, pixels })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), pixels::TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    /// `None` when the cursor sits on the letterbox around the buffer.
    fn buffer_position(&self, position: PhysicalPosition<f64>) -> Option<(i32, i32)> {
        self.pixels
            .window_pos_to_pixel((position.x as f32, position.y as f32))
            .ok()
            .map(|(x, y)| (x as i32, y as i32))
    }

    /// The buffer is centered in the window, so the window center is the
    /// view center.
    fn warp_pointer_to_center(&self) {
        let size = self.window.inner_size();
        let center = PhysicalPosition::new(size.width as f64 / 2.0, size.height as f64 / 2.0);
        if let Err(error) = self.window.set_cursor_position(center) {
            warn!(error = %error, "pointer_warp_failed");
        }
    }

    fn present(&mut self, image: &Surface) -> Result<(), PixelsError> {
        let frame = self.pixels.frame_mut();
        if frame.len() == image.rgba().len() {
            frame.copy_from_slice(image.rgba());
        }
        self.pixels.render()
    }
}

/// Queues translated window events until the next tick drains them.
#[derive(Debug, Default)]
struct InputCollector {
    pending: Vec<InputEvent>,
    pointer: Option<(i32, i32)>,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_key(key_event.physical_key, key_event.state, key_event.repeat);
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState, repeat: bool) {
        if repeat {
            return;
        }
        let code = map_key(key);
        let event = match (code, state) {
            (KeyCode::Escape, ElementState::Pressed) => InputEvent::Quit,
            (KeyCode::Escape, ElementState::Released) => return,
            (code, ElementState::Pressed) => InputEvent::KeyDown(code),
            (code, ElementState::Released) => InputEvent::KeyUp(code),
        };
        self.pending.push(event);
    }

    fn handle_mouse_input(&mut self, button: WinitMouseButton, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }
        let (Some(button), Some(position)) = (map_mouse_button(button), self.pointer) else {
            return;
        };
        self.pending.push(InputEvent::MouseDown { button, position });
    }

    fn set_pointer(&mut self, pointer: Option<(i32, i32)>) {
        self.pointer = pointer;
    }

    fn pointer(&self) -> Option<(i32, i32)> {
        self.pointer
    }

    fn drain_for_tick(&mut self) -> Vec<InputEvent> {
        mem::take(&mut self.pending)
    }
}

fn map_key(key: PhysicalKey) -> KeyCode {
    match key {
        PhysicalKey::Code(WinitKeyCode::ArrowUp) => KeyCode::ArrowUp,
        PhysicalKey::Code(WinitKeyCode::ArrowRight) => KeyCode::ArrowRight,
        PhysicalKey::Code(WinitKeyCode::ArrowDown) => KeyCode::ArrowDown,
        PhysicalKey::Code(WinitKeyCode::ArrowLeft) => KeyCode::ArrowLeft,
        PhysicalKey::Code(WinitKeyCode::Escape) => KeyCode::Escape,
        _ => KeyCode::Other,
    }
}

fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn dropped_tick_count(backlog: Duration, fixed_dt: Duration) -> u32 {
    let ticks = backlog.as_nanos() / fixed_dt.as_nanos().max(1);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(40), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 2);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
        assert_eq!(dropped_tick_count(result.dropped_backlog, fixed_dt), 4);
    }

    #[test]
    fn zero_durations_fall_back() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn loop_config_follows_timing_and_view() {
        let config = LoopConfig::default();
        assert_eq!((config.view_width, config.view_height), (512, 512));
        assert_eq!(config.max_ticks_per_frame, 5);
        assert_eq!(config.max_frame_delta, Duration::from_millis(250));
        assert_eq!(config.metrics_log_interval, Duration::from_secs(1));
    }

    #[test]
    fn arrow_keys_become_key_events_in_order() {
        let mut input = InputCollector::default();
        input.handle_key(
            PhysicalKey::Code(WinitKeyCode::ArrowLeft),
            ElementState::Pressed,
            false,
        );
        input.handle_key(
            PhysicalKey::Code(WinitKeyCode::KeyQ),
            ElementState::Pressed,
            false,
        );
        input.handle_key(
            PhysicalKey::Code(WinitKeyCode::ArrowLeft),
            ElementState::Released,
            false,
        );

        assert_eq!(
            input.drain_for_tick(),
            vec![
                InputEvent::KeyDown(KeyCode::ArrowLeft),
                InputEvent::KeyDown(KeyCode::Other),
                InputEvent::KeyUp(KeyCode::ArrowLeft),
            ]
        );
        assert!(input.drain_for_tick().is_empty());
    }

    #[test]
    fn key_repeat_is_filtered() {
        let mut input = InputCollector::default();
        let key = PhysicalKey::Code(WinitKeyCode::ArrowUp);
        input.handle_key(key, ElementState::Pressed, false);
        input.handle_key(key, ElementState::Pressed, true);
        input.handle_key(key, ElementState::Pressed, true);

        assert_eq!(
            input.drain_for_tick(),
            vec![InputEvent::KeyDown(KeyCode::ArrowUp)]
        );
    }

    #[test]
    fn escape_press_maps_to_quit() {
        let mut input = InputCollector::default();
        let key = PhysicalKey::Code(WinitKeyCode::Escape);
        input.handle_key(key, ElementState::Pressed, false);
        input.handle_key(key, ElementState::Released, false);

        assert_eq!(input.drain_for_tick(), vec![InputEvent::Quit]);
    }

    #[test]
    fn clicks_need_a_pointer_inside_the_buffer() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(WinitMouseButton::Left, ElementState::Pressed);
        assert!(input.drain_for_tick().is_empty());

        input.set_pointer(Some((40, 60)));
        input.handle_mouse_input(WinitMouseButton::Right, ElementState::Pressed);
        input.handle_mouse_input(WinitMouseButton::Right, ElementState::Released);
        input.handle_mouse_input(WinitMouseButton::Back, ElementState::Pressed);

        assert_eq!(
            input.drain_for_tick(),
            vec![InputEvent::MouseDown {
                button: MouseButton::Right,
                position: (40, 60),
            }]
        );
        assert_eq!(input.pointer(), Some((40, 60)));
    }
}
