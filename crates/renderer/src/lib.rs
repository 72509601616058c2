//! Renderer crate for pyrview, a spinning-pyramid perspective demo.
//!
//! The module glues the preview window, the `wgpu` render pipeline, and the
//! per-frame animation state together. The overall flow is:
//!
//! ```text
//!   CLI / pyrview
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                      │
//!          │                                      └─▶ AnimationState::advance(dt)
//!          │                                          └─▶ SceneUniforms ─▶ GPU UBO
//! ```
//!
//! `WindowState` owns all GPU resources (surface, device, pipeline, mesh,
//! uniforms) while `Renderer` is the thin entry point that builds the window
//! and drives the event loop. The animation values advance by measured delta
//! time, and the model transform is recomputed fresh each frame from the
//! absolute angle and offset, so nothing accumulates drift.

mod animation;
mod compile;
mod geometry;
mod gpu;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

pub use animation::{AnimationState, ANGLE_STEP, COLOR_STEP, OFFSET_MAX, OFFSET_STEP};
pub use compile::{
    compile_stage, resolve_scene_uniforms, ShaderError, FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL,
};
pub use geometry::{Vertex, PYRAMID_INDICES, PYRAMID_VERTICES};
pub use gpu::{model_matrix, projection_matrix};

use gpu::GpuState;

/// Immutable configuration passed to the renderer at start-up.
///
/// Mirrors the CLI flags; the defaults reproduce the demo's canonical 640x480
/// vsync-paced window.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Window title.
    pub title: String,
    /// Optional FPS cap; `None` renders on every redraw opportunity.
    pub target_fps: Option<f32>,
    /// Whether to request a vsync (`Fifo`) present mode.
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (640, 480),
            title: "Perspective Projection Test".to_string(),
            target_fps: None,
            vsync: true,
        }
    }
}

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside [`WindowState`]; `Renderer` builds the
/// window, seeds the state, and forwards winit events.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and drives the event loop until the user closes it.
    ///
    /// Setup failures (event loop, window, surface, adapter, device) are
    /// fatal and propagate to the caller. Everything after setup follows the
    /// degrade-and-continue policy: shader problems draw nothing, recoverable
    /// surface errors retry on the next frame.
    pub fn run(&mut self) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to initialize event loop")?;
        let window_size = PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
        let window = WindowBuilder::new()
            .with_title(self.config.title.clone())
            .with_inner_size(window_size)
            .build(&event_loop)
            .context("failed to create window")?;
        let window = Arc::new(window);

        let mut state = WindowState::new(window.clone(), &self.config)?;
        let mut pacer = FramePacer::new(self.config.target_fps);
        state.window().request_redraw();

        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Wait);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                elwt.exit();
                            }
                            WindowEvent::Resized(new_size) => {
                                state.resize(new_size);
                            }
                            WindowEvent::ScaleFactorChanged {
                                mut inner_size_writer,
                                ..
                            } => {
                                // Keep the current logical size when the scale factor changes.
                                let _ = inner_size_writer.request_inner_size(state.size());
                            }
                            WindowEvent::RedrawRequested => match state.render_frame() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    state.resize(state.size());
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory; exiting");
                                    elwt.exit();
                                }
                                Err(wgpu::SurfaceError::Timeout) => {
                                    tracing::warn!("surface timeout; retrying next frame");
                                }
                                Err(other) => {
                                    tracing::warn!(error = ?other, "surface error; retrying next frame");
                                }
                            },
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        // Schedule the next frame once winit is about to wait
                        // for events again; the pacer decides whether that is
                        // immediately or at the next FPS-cap deadline.
                        if pacer.due(Instant::now()) {
                            state.window().request_redraw();
                        }
                        if let Some(wake) = pacer.wake_at() {
                            elwt.set_control_flow(ControlFlow::WaitUntil(wake));
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow!("event loop error: {err}"))
    }
}

/// Pairs the window handle with the GPU state behind it.
struct WindowState {
    /// Shared handle to the window (`wgpu` needs it to create the surface).
    window: Arc<Window>,
    gpu: GpuState,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config.vsync)?;
        Ok(Self { window, gpu })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.gpu.render_frame()
    }
}

/// Decides when the next redraw is due.
///
/// Without a cap every `AboutToWait` requests a redraw and presentation runs
/// at whatever rate the surface allows. With a cap, redraws are scheduled on
/// a fixed interval; falling behind skips ahead instead of bursting.
struct FramePacer {
    interval: Option<Duration>,
    next_frame: Instant,
}

impl FramePacer {
    fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            next_frame: Instant::now(),
        }
    }

    fn due(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        if now < self.next_frame {
            return false;
        }
        // Keep the cadence while on schedule; after a long stall, rebase on
        // `now` instead of queueing a burst of catch-up frames.
        let scheduled = self.next_frame + interval;
        self.next_frame = if scheduled > now { scheduled } else { now + interval };
        true
    }

    fn wake_at(&self) -> Option<Instant> {
        self.interval.map(|_| self.next_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_pacer_is_always_due() {
        let mut pacer = FramePacer::new(None);
        let now = Instant::now();
        assert!(pacer.due(now));
        assert!(pacer.due(now));
        assert!(pacer.wake_at().is_none());
    }

    #[test]
    fn capped_pacer_spaces_frames() {
        let mut pacer = FramePacer::new(Some(60.0));
        let start = pacer.next_frame;
        assert!(pacer.due(start));
        assert!(!pacer.due(start + Duration::from_millis(1)));
        assert!(pacer.due(start + Duration::from_millis(20)));
    }

    #[test]
    fn pacer_skips_ahead_after_long_gaps() {
        let mut pacer = FramePacer::new(Some(60.0));
        let start = pacer.next_frame;
        assert!(pacer.due(start));
        // A multi-second stall must not queue a burst of catch-up frames.
        let late = start + Duration::from_secs(3);
        assert!(pacer.due(late));
        assert!(!pacer.due(late + Duration::from_millis(1)));
    }

    #[test]
    fn zero_fps_cap_is_ignored() {
        let mut pacer = FramePacer::new(Some(0.0));
        assert!(pacer.due(Instant::now()));
        assert!(pacer.wake_at().is_none());
    }
}
