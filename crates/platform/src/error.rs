//! Errors raised while bringing up the window and GL context.

use thiserror::Error;

use crate::{config::GlVersion, debug::DebugMessage};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to create window: {0}")]
    Window(String),

    #[error("no GL framebuffer config matches the request")]
    NoMatchingConfig,

    #[error("OpenGL {requested} core context unavailable: {reason}")]
    UnsupportedContext {
        requested: GlVersion,
        reason: String,
    },

    #[error("GL surface error")]
    Surface(#[source] glutin::error::Error),

    #[error("driver debug output is not available on this context")]
    MissingDebugOutput,

    #[error("GL driver reported: {0}")]
    Driver(DebugMessage),
}
