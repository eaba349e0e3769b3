//! Render thread: owns the renderer after startup and drives it at a fixed
//! frame cadence until shutdown is requested or rendering fails for good.

use crate::renderer::{RenderError, Renderer, ViewMode};
use anyhow::{anyhow, Result};
use engine_core::{FramePacer, Time};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;
use winit::dpi::PhysicalSize;

/// Give up after this many back-to-back frame failures. A single lost or
/// outdated surface recovers on the next acquire; a run this long means the
/// surface is gone.
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// How often to report frame timing, in frames.
const FPS_LOG_INTERVAL: u64 = 300;

/// Drives [`Renderer::render_frame`] on a dedicated thread at a target
/// frame rate.
pub struct FrameDriver {
    renderer: Renderer,
    pacer: FramePacer,
    view_mode: ViewMode,
    shutdown: Arc<AtomicBool>,
    pending_resize: Arc<Mutex<Option<PhysicalSize<u32>>>>,
}

impl FrameDriver {
    pub fn new(renderer: Renderer, target_fps: u32, view_mode: ViewMode) -> Self {
        Self {
            renderer,
            pacer: FramePacer::from_fps(target_fps),
            view_mode,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_resize: Arc::new(Mutex::new(None)),
        }
    }

    /// Flag the render loop to stop after its current frame. Callers keep a
    /// clone of this handle; see [`FrameDriver::shutdown_handle`].
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Mailbox for window resizes. The event loop deposits the latest size;
    /// the render loop applies it between frames. Intermediate sizes during
    /// a drag are coalesced.
    pub fn resize_handle(&self) -> Arc<Mutex<Option<PhysicalSize<u32>>>> {
        self.pending_resize.clone()
    }

    /// Move the renderer onto its own thread and start the frame loop.
    /// Join the returned handle to observe how the loop ended.
    pub fn start(self) -> Result<JoinHandle<Result<()>>> {
        std::thread::Builder::new()
            .name("render".into())
            .spawn(move || self.run())
            .map_err(|e| anyhow!("failed to spawn render thread: {e}"))
    }

    fn run(mut self) -> Result<()> {
        let mut time = Time::new();
        let mut consecutive_failures = 0u32;

        log::info!("render loop started at {:?}/frame", self.pacer.target());

        while !self.shutdown.load(Ordering::Relaxed) {
            self.pacer.begin_frame();
            time.update();

            if let Some(size) = self.pending_resize.lock().unwrap().take() {
                self.renderer.resize(size);
            }

            match self.renderer.render_frame(self.view_mode) {
                Ok(()) => consecutive_failures = 0,
                Err(RenderError::SurfaceAcquire(error)) => {
                    consecutive_failures += 1;
                    log::error!(
                        "frame {} skipped ({error}); failure {consecutive_failures}/{MAX_CONSECUTIVE_FAILURES}",
                        time.frame_count(),
                    );
                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(anyhow!(
                            "render loop aborted after {consecutive_failures} consecutive frame failures: {error}"
                        ));
                    }
                }
            }

            if time.frame_count() % FPS_LOG_INTERVAL == 0 {
                log::debug!(
                    "frame {}: {:.2} ms ({:.1} fps)",
                    time.frame_count(),
                    time.delta_seconds() * 1000.0,
                    time.fps(),
                );
            }

            self.pacer.pace();
        }

        log::info!("render loop stopped after {} frames", time.frame_count());
        Ok(())
    }
}
