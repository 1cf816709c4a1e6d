//! Window + OpenGL context bring-up.

use std::{
    ffi::CString,
    num::NonZeroU32,
    panic::{self, AssertUnwindSafe},
    ptr,
    sync::Arc,
};

use gl::types::GLint;
use glutin::{
    config::{Config, ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
        PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use winit::{dpi::PhysicalSize, event_loop::ActiveEventLoop, window::Window};

use crate::{
    config::{GlVersion, WindowConfig},
    debug::{self, DebugLog},
    error::PlatformError,
};

/// A window with a current OpenGL core context and loaded function pointers.
///
/// Dropping it unregisters the debug callback, then releases the context,
/// surface and window in that order.
pub struct GraphicsWindow {
    debug_log: Option<Arc<DebugLog>>,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

impl GraphicsWindow {
    pub fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, PlatformError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .map(|monitor| monitor.size());
        let size = config.clamp_to_monitor(monitor);
        if size != PhysicalSize::new(config.width, config.height) {
            log::info!(
                "Requested {}x{} clamped to {}x{}",
                config.width,
                config.height,
                size.width,
                size.height
            );
        }

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(size);
        let template = ConfigTemplateBuilder::new().with_depth_size(24);

        let (window, gl_config) = contain_picker_panic(|| {
            DisplayBuilder::new()
                .with_window_attributes(Some(attributes))
                .build(event_loop, template, pick_config)
        })?
        .map_err(|e| PlatformError::Window(e.to_string()))?;
        let window = window
            .ok_or_else(|| PlatformError::Window("display builder returned no window".into()))?;
        let raw_handle = window
            .window_handle()
            .map_err(|e| PlatformError::Window(e.to_string()))?
            .as_raw();

        let display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                config.gl_version.major,
                config.gl_version.minor,
            ))))
            .with_debug(config.debug)
            .build(Some(raw_handle));

        // SAFETY: `raw_handle` belongs to `window`, which outlives the context.
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| PlatformError::UnsupportedContext {
                requested: config.gl_version,
                reason: e.to_string(),
            })?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| PlatformError::Window(e.to_string()))?;
        // SAFETY: as above, the window outlives the surface.
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(PlatformError::Surface)?;
        let context = not_current
            .make_current(&surface)
            .map_err(PlatformError::Surface)?;

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(name) => display.get_proc_address(&name),
            Err(_) => ptr::null(),
        });

        // SAFETY: the context is current and function pointers are loaded.
        let version = unsafe { current_version() };
        if version < config.gl_version {
            return Err(PlatformError::UnsupportedContext {
                requested: config.gl_version,
                reason: format!("driver created a {version} context"),
            });
        }

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            log::warn!("Failed to set swap interval {interval:?}: {err}");
        }

        let debug_log = if config.debug {
            let sink = Arc::new(DebugLog::default());
            // SAFETY: context current; `sink` is stored in the returned value and
            // `Drop` uninstalls the callback before it is released.
            unsafe { debug::install(&sink)? };
            Some(sink)
        } else {
            None
        };

        let graphics = Self {
            debug_log,
            context,
            surface,
            window,
        };
        graphics.resize(graphics.window.inner_size());

        log::info!(
            "OpenGL {} context ready: {}x{}, debug={}, vsync={}",
            version,
            graphics.size().width,
            graphics.size().height,
            graphics.debug_log.is_some(),
            config.vsync
        );
        Ok(graphics)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Resize the surface and viewport. Zero-sized (minimised) windows are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.surface.resize(&self.context, width, height);
        // SAFETY: the context owned by `self` is current on this thread.
        unsafe { gl::Viewport(0, 0, size.width as GLint, size.height as GLint) };
    }

    pub fn swap_buffers(&self) -> Result<(), PlatformError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(PlatformError::Surface)
    }

    /// Drain the driver messages recorded since the last poll; the first
    /// fatal one becomes an error.
    pub fn poll_debug(&self) -> Result<(), PlatformError> {
        match &self.debug_log {
            Some(sink) => debug::check_messages(sink.drain()),
            None => Ok(()),
        }
    }
}

impl Drop for GraphicsWindow {
    fn drop(&mut self) {
        if self.debug_log.is_some() {
            // SAFETY: the context is still alive and current here.
            unsafe { debug::uninstall() };
        }
        log::debug!("GL window released");
    }
}

/// Unwind payload raised by [`pick_config`] when the display offers no config.
struct NoMatchingConfig;

/// `DisplayBuilder::build` gives the picker no way to fail, and EGL can
/// report success with zero matching configs. The picker unwinds with
/// [`NoMatchingConfig`] and this turns that one payload back into an error.
fn contain_picker_panic<R>(build: impl FnOnce() -> R) -> Result<R, PlatformError> {
    panic::catch_unwind(AssertUnwindSafe(build)).map_err(|payload| {
        if payload.is::<NoMatchingConfig>() {
            PlatformError::NoMatchingConfig
        } else {
            panic::resume_unwind(payload)
        }
    })
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    most_samples(configs, |config| config.num_samples())
        .unwrap_or_else(|| panic::panic_any(NoMatchingConfig))
}

/// Prefer the candidate with the most samples; ties keep the earliest.
fn most_samples<T>(candidates: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8) -> Option<T> {
    candidates.reduce(|best, candidate| {
        if samples(&candidate) > samples(&best) {
            candidate
        } else {
            best
        }
    })
}

unsafe fn current_version() -> GlVersion {
    let (mut major, mut minor): (GLint, GLint) = (0, 0);
    unsafe {
        gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
        gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
    }
    GlVersion::new(
        u8::try_from(major).unwrap_or(0),
        u8::try_from(minor).unwrap_or(0),
    )
}
