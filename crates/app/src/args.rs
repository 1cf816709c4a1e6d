//! Command-line flags (`--key=value`).

use std::path::PathBuf;

use platform::{GlVersion, WindowConfig};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    pub model: Option<PathBuf>,
    pub window: WindowConfig,
}

/// Parse flags; unknown flags and bad values are reported and skipped.
pub fn parse_args<I, S>(args: I) -> Args
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Args::default();
    let window = &mut parsed.window;

    for arg in args {
        let arg = arg.as_ref();
        if let Some(v) = arg.strip_prefix("--model=") {
            parsed.model = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--size=") {
            match v.split_once('x').or_else(|| v.split_once('X')) {
                Some((sw, sh)) => match (sw.parse::<u32>(), sh.parse::<u32>()) {
                    (Ok(w), Ok(h)) => {
                        window.width = w;
                        window.height = h;
                    }
                    _ => log::warn!("Invalid --size '{}', keeping default.", v),
                },
                None => log::warn!("Invalid --size '{}', expected WxH.", v),
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            match v.parse::<u32>() {
                Ok(w) => window.width = w,
                Err(_) => log::warn!("Invalid --width '{}', keeping default.", v),
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            match v.parse::<u32>() {
                Ok(h) => window.height = h,
                Err(_) => log::warn!("Invalid --height '{}', keeping default.", v),
            }
        } else if let Some(v) = arg.strip_prefix("--gl=") {
            match v.parse::<GlVersion>() {
                Ok(version) => window.gl_version = version,
                Err(err) => log::warn!("Invalid --gl: {}, keeping {}.", err, window.gl_version),
            }
        } else if let Some(v) = arg.strip_prefix("--title=") {
            window.title = v.to_owned();
        } else if arg == "--no-debug" {
            window.debug = false;
        } else if arg == "--no-vsync" {
            window.vsync = false;
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }

    window.width = window.width.max(1);
    window.height = window.height.max(1);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let args = parse_args(Vec::<String>::new());
        assert_eq!(args, Args::default());
        assert!(args.window.debug);
    }

    #[test]
    fn parses_all_flags() {
        let args = parse_args([
            "--model=assets/cube.obj",
            "--size=800x600",
            "--gl=3.3",
            "--no-debug",
            "--no-vsync",
            "--title=Cube",
        ]);
        assert_eq!(args.model, Some(PathBuf::from("assets/cube.obj")));
        assert_eq!((args.window.width, args.window.height), (800, 600));
        assert_eq!(args.window.gl_version, GlVersion::new(3, 3));
        assert!(!args.window.debug);
        assert!(!args.window.vsync);
        assert_eq!(args.window.title, "Cube");
    }

    #[test]
    fn bad_values_keep_defaults() {
        let defaults = WindowConfig::default();
        let args = parse_args(["--size=wide", "--height=tall", "--gl=4", "--bogus"]);
        assert_eq!(args.window, defaults);
    }

    #[test]
    fn width_and_height_override_and_stay_positive() {
        let args = parse_args(["--size=640X480", "--width=0"]);
        assert_eq!((args.window.width, args.window.height), (1, 480));
    }
}
