//! Skydome cloud viewer: opens a window and renders a procedural cloud sky.

mod config;

use anyhow::Result;
use config::ViewerConfig;
use procgen::{DomeConfig, DomeMeshData, NoiseTable};
use renderer::{FrameDriver, MeshBuffers, RenderSettings, Renderer, ViewMode};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

/// Posted through the event loop proxy when the render thread ends, so the
/// event loop wakes immediately instead of waiting for the next window event.
#[derive(Debug)]
struct RenderThreadExited;

/// A running viewer: the window on this thread, rendering on its own.
struct Viewer {
    window: Arc<Window>,
    shutdown: Arc<AtomicBool>,
    pending_resize: Arc<Mutex<Option<PhysicalSize<u32>>>>,
    /// Joins the render thread, logs its outcome, and wakes the event loop.
    watcher: Option<JoinHandle<()>>,
}

impl Viewer {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &ViewerConfig,
        proxy: EventLoopProxy<RenderThreadExited>,
    ) -> Result<Self> {
        let window_attrs = Window::default_attributes()
            .with_title("Skydome Clouds")
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window_width,
                config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // CPU-side assets: the dome mesh and the seeded phase table. Both are
        // built once and never touched again after upload.
        let dome = DomeMeshData::generate(&DomeConfig::default());
        let noise = NoiseTable::generate(config.seed, config.table_len);
        log::info!(
            "Generated dome ({} vertices, {} indices) and {} noise phases (seed {})",
            dome.vertex_count(),
            dome.index_count(),
            noise.phases().len(),
            config.seed,
        );

        let settings = RenderSettings {
            field_width: config.field_size,
            field_height: config.field_size,
            octaves: config.octaves,
            wait_for_gpu: config.wait_for_gpu,
            ..Default::default()
        };
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            settings,
            MeshBuffers {
                vertex_count: dome.vertex_count(),
                index_count: dome.index_count(),
                vertex_bytes: dome.vertex_bytes(),
                index_bytes: dome.index_bytes(),
            },
            noise.phases(),
        ))?;

        let view_mode = if config.show_density_map {
            ViewMode::DensityMap
        } else {
            ViewMode::Clouds
        };
        let driver = FrameDriver::new(renderer, config.target_fps, view_mode);
        let shutdown = driver.shutdown_handle();
        let pending_resize = driver.resize_handle();
        let render_thread = driver.start()?;

        let watcher = std::thread::Builder::new()
            .name("render-watch".into())
            .spawn(move || {
                match render_thread.join() {
                    Ok(Ok(())) => log::info!("render thread exited cleanly"),
                    Ok(Err(e)) => log::error!("render thread failed: {e:#}"),
                    Err(_) => log::error!("render thread panicked"),
                }
                // Fails only if the event loop is already gone.
                let _ = proxy.send_event(RenderThreadExited);
            })?;

        Ok(Self {
            window,
            shutdown,
            pending_resize,
            watcher: Some(watcher),
        })
    }

    /// Stop the render loop and wait for the render and watcher threads.
    /// Idempotent; the second call is a no-op.
    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.watcher.take() {
            if handle.join().is_err() {
                log::error!("render watcher panicked");
            }
        }
    }
}

struct App {
    viewer: Option<Viewer>,
    proxy: EventLoopProxy<RenderThreadExited>,
}

impl App {
    fn new(proxy: EventLoopProxy<RenderThreadExited>) -> Self {
        Self {
            viewer: None,
            proxy,
        }
    }
}

impl ApplicationHandler<RenderThreadExited> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_none() {
            let config = ViewerConfig::load();
            match Viewer::start(event_loop, &config, self.proxy.clone()) {
                Ok(viewer) => self.viewer = Some(viewer),
                Err(e) => {
                    log::error!("Failed to start viewer: {e:#}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                viewer.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                *viewer.pending_resize.lock().unwrap() = Some(size);
                viewer.window.request_redraw();
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _event: RenderThreadExited) {
        // The render thread is already gone; there is nothing left to
        // present, so the window closes with it.
        if let Some(viewer) = &mut self.viewer {
            viewer.stop();
        }
        event_loop.exit();
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting skydome cloud viewer");

    let event_loop = EventLoop::<RenderThreadExited>::with_user_event().build()?;
    // The render thread paces itself; the event loop only needs to wake for
    // window events and the render-thread-exit notification.
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    let mut app = App::new(proxy);
    event_loop.run_app(&mut app)?;

    Ok(())
}
