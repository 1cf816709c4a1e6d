//! Driver debug output.
//!
//! The GL callback never returns an error or unwinds into the driver. It
//! only appends to a [`DebugLog`] owned by the window; the caller drains the
//! log after each frame and turns fatal messages into a [`PlatformError`].

use std::{
    ffi::{CStr, c_void},
    fmt, ptr, slice,
    sync::Arc,
};

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLuint};
use parking_lot::Mutex;

use crate::error::PlatformError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugSource {
    Api,
    WindowSystem,
    ShaderCompiler,
    ThirdParty,
    Application,
    Other,
    Unknown(GLenum),
}

impl DebugSource {
    pub fn from_gl(value: GLenum) -> Self {
        match value {
            gl::DEBUG_SOURCE_API => Self::Api,
            gl::DEBUG_SOURCE_WINDOW_SYSTEM => Self::WindowSystem,
            gl::DEBUG_SOURCE_SHADER_COMPILER => Self::ShaderCompiler,
            gl::DEBUG_SOURCE_THIRD_PARTY => Self::ThirdParty,
            gl::DEBUG_SOURCE_APPLICATION => Self::Application,
            gl::DEBUG_SOURCE_OTHER => Self::Other,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugKind {
    Error,
    DeprecatedBehavior,
    UndefinedBehavior,
    Portability,
    Performance,
    Marker,
    PushGroup,
    PopGroup,
    Other,
    Unknown(GLenum),
}

impl DebugKind {
    pub fn from_gl(value: GLenum) -> Self {
        match value {
            gl::DEBUG_TYPE_ERROR => Self::Error,
            gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => Self::DeprecatedBehavior,
            gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => Self::UndefinedBehavior,
            gl::DEBUG_TYPE_PORTABILITY => Self::Portability,
            gl::DEBUG_TYPE_PERFORMANCE => Self::Performance,
            gl::DEBUG_TYPE_MARKER => Self::Marker,
            gl::DEBUG_TYPE_PUSH_GROUP => Self::PushGroup,
            gl::DEBUG_TYPE_POP_GROUP => Self::PopGroup,
            gl::DEBUG_TYPE_OTHER => Self::Other,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugSeverity {
    High,
    Medium,
    Low,
    Notification,
    Unknown(GLenum),
}

impl DebugSeverity {
    pub fn from_gl(value: GLenum) -> Self {
        match value {
            gl::DEBUG_SEVERITY_HIGH => Self::High,
            gl::DEBUG_SEVERITY_MEDIUM => Self::Medium,
            gl::DEBUG_SEVERITY_LOW => Self::Low,
            gl::DEBUG_SEVERITY_NOTIFICATION => Self::Notification,
            other => Self::Unknown(other),
        }
    }

    /// Everything above a notification aborts the frame loop.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::Notification)
    }
}

/// One message delivered by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugMessage {
    pub source: DebugSource,
    pub kind: DebugKind,
    pub severity: DebugSeverity,
    pub id: u32,
    pub text: String,
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}/{:?}/{:?} #{}] {}",
            self.source, self.kind, self.severity, self.id, self.text
        )
    }
}

/// Messages recorded by the callback since the last [`DebugLog::drain`].
#[derive(Debug, Default)]
pub struct DebugLog {
    messages: Mutex<Vec<DebugMessage>>,
}

impl DebugLog {
    pub(crate) fn push(&self, message: DebugMessage) {
        self.messages.lock().push(message);
    }

    pub fn drain(&self) -> Vec<DebugMessage> {
        std::mem::take(&mut *self.messages.lock())
    }
}

/// Log every message and return the first fatal one as an error.
pub fn check_messages(messages: Vec<DebugMessage>) -> Result<(), PlatformError> {
    let mut fatal = None;
    for message in messages {
        if message.severity.is_fatal() {
            log::error!("GL: {message}");
            fatal.get_or_insert(message);
        } else {
            log::debug!("GL: {message}");
        }
    }
    match fatal {
        Some(message) => Err(PlatformError::Driver(message)),
        None => Ok(()),
    }
}

/// `GLDEBUGPROC` target. `user_param` must be null or point at a live [`DebugLog`].
pub(crate) extern "system" fn debug_callback(
    source: GLenum,
    kind: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    user_param: *mut c_void,
) {
    if user_param.is_null() {
        return;
    }
    // SAFETY: `install` registers a pointer obtained from an `Arc<DebugLog>`
    // that the owning window keeps alive until after `uninstall`.
    let sink = unsafe { &*user_param.cast_const().cast::<DebugLog>() };
    // SAFETY: the driver passes either a `length`-byte buffer or a
    // nul-terminated string when `length` is negative.
    let text = unsafe { message_text(message, length) };

    sink.push(DebugMessage {
        source: DebugSource::from_gl(source),
        kind: DebugKind::from_gl(kind),
        severity: DebugSeverity::from_gl(severity),
        id,
        text,
    });
}

unsafe fn message_text(message: *const GLchar, length: GLsizei) -> String {
    if message.is_null() {
        return String::new();
    }
    let bytes = match usize::try_from(length) {
        Ok(len) => unsafe { slice::from_raw_parts(message.cast::<u8>(), len) },
        Err(_) => unsafe { CStr::from_ptr(message) }.to_bytes(),
    };
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', '\n', '\r'])
        .to_owned()
}

/// Enable synchronous debug output on the current context and register
/// `sink` as the callback's destination.
///
/// # Safety
/// A GL context must be current and its function pointers loaded. `sink`
/// must outlive the registration; call [`uninstall`] before dropping it.
pub(crate) unsafe fn install(sink: &Arc<DebugLog>) -> Result<(), PlatformError> {
    if !gl::DebugMessageCallback::is_loaded() || !gl::DebugMessageControl::is_loaded() {
        return Err(PlatformError::MissingDebugOutput);
    }

    let mut flags: GLint = 0;
    unsafe { gl::GetIntegerv(gl::CONTEXT_FLAGS, &mut flags) };
    if (flags as GLenum) & gl::CONTEXT_FLAG_DEBUG_BIT == 0 {
        return Err(PlatformError::MissingDebugOutput);
    }

    unsafe {
        gl::Enable(gl::DEBUG_OUTPUT);
        // Synchronous delivery keeps messages on the thread that issued the call.
        gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl::DebugMessageCallback(
            Some(debug_callback),
            Arc::as_ptr(sink).cast::<c_void>(),
        );
        gl::DebugMessageControl(
            gl::DONT_CARE,
            gl::DONT_CARE,
            gl::DONT_CARE,
            0,
            ptr::null(),
            gl::TRUE,
        );
    }
    log::debug!("GL debug output enabled");
    Ok(())
}

/// # Safety
/// The context that `install` ran on must be current.
pub(crate) unsafe fn uninstall() {
    unsafe {
        gl::DebugMessageCallback(None, ptr::null());
        gl::Disable(gl::DEBUG_OUTPUT);
    }
}
