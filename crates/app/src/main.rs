//! Entry point: load an OBJ model and open a GL window.

mod args;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::parse_args(std::env::args().skip(1));
    let mut window = args.window;

    if let Some(path) = &args.model {
        // Load before any window exists so a bad model fails fast.
        let model = asset::load_obj_model(path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        log::info!(
            "Loaded {}: {} triangles, {} vertices",
            path.display(),
            model.triangle_count(),
            model.vertex_count()
        );
        if let Some((min, max)) = model.bounds() {
            log::info!("Model bounds: min={min} max={max}");
        }
        window.title = format!("{} - {} tris", window.title, model.triangle_count());
    } else {
        log::info!("No --model given; opening an empty window.");
    }

    log::info!(
        "Starting: OpenGL {} core, window_size={}x{}, debug={}, vsync={}",
        window.gl_version,
        window.width,
        window.height,
        window.debug,
        window.vsync
    );

    platform::run(window, |_| {
        // SAFETY: `run` only calls back while its context is current.
        unsafe {
            gl::ClearColor(0.1, 0.1, 0.12, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        Ok(())
    })?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
