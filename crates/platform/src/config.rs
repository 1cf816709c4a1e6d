//! Window and context settings.

use std::{fmt, str::FromStr};

use winit::dpi::PhysicalSize;

/// Requested OpenGL core-profile version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlVersion {
    pub major: u8,
    pub minor: u8,
}

impl GlVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for GlVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("expected MAJOR.MINOR, got '{s}'"))?;
        let major = major
            .parse::<u8>()
            .map_err(|_| format!("invalid major version '{major}'"))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| format!("invalid minor version '{minor}'"))?;
        Ok(Self::new(major, minor))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gl_version: GlVersion,
    /// Request a debug context and route driver messages into the window's log.
    pub debug: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tutorial".to_owned(),
            width: 1280,
            height: 720,
            gl_version: GlVersion::new(4, 3),
            debug: true,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Requested size limited to the monitor resolution (when known), at least 1x1.
    pub fn clamp_to_monitor(&self, monitor: Option<PhysicalSize<u32>>) -> PhysicalSize<u32> {
        let (mut width, mut height) = (self.width, self.height);
        if let Some(PhysicalSize {
            width: max_w,
            height: max_h,
        }) = monitor
        {
            // A monitor reporting 0x0 (headless, some Wayland setups) is treated as unknown.
            if max_w > 0 && max_h > 0 {
                width = width.min(max_w);
                height = height.min(max_h);
            }
        }
        PhysicalSize::new(width.max(1), height.max(1))
    }
}
