//! Platform layer: window, OpenGL context and event loop.
//!
//! The event loop and window are owned by [`run`]; everything is torn down
//! before it returns, on success and on error.

use anyhow::{Result, anyhow};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowId,
};

pub mod config;
pub mod debug;
pub mod error;
pub mod window;

pub use config::{GlVersion, WindowConfig};
pub use debug::{DebugKind, DebugMessage, DebugSeverity, DebugSource};
pub use error::PlatformError;
pub use window::GraphicsWindow;

/// Open a window per `config` and call `frame` once per redraw until the
/// window is closed or `frame`, buffer swap or driver diagnostics fail.
pub fn run<F>(config: WindowConfig, frame: F) -> Result<()>
where
    F: FnMut(&GraphicsWindow) -> Result<()>,
{
    let event_loop = EventLoop::new().map_err(|e| anyhow!("Failed to create event loop: {e:?}"))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        config,
        frame,
        window: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App<F> {
    config: WindowConfig,
    frame: F,
    window: Option<GraphicsWindow>,
    error: Option<anyhow::Error>,
}

impl<F> App<F>
where
    F: FnMut(&GraphicsWindow) -> Result<()>,
{
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        self.window = None;
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(window) = &self.window else {
            return Ok(());
        };
        (self.frame)(window)?;
        window.swap_buffers()?;
        window.poll_debug()?;
        // Continuous redraw; vsync paces it when enabled.
        window.window().request_redraw();
        Ok(())
    }
}

impl<F> ApplicationHandler for App<F>
where
    F: FnMut(&GraphicsWindow) -> Result<()>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        match GraphicsWindow::create(event_loop, &self.config) {
            Ok(window) => {
                window.window().request_redraw();
                self.window = Some(window);
            }
            Err(err) => self.fail(event_loop, err.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("Close requested. Exiting event loop.");
                self.window = None;
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(window) = &self.window {
                    window.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.window = None;
    }
}
