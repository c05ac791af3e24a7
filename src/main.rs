//! Command-line entry point for glyphfield

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glyphfield::{ClockMode, FontSpec, Palette, SceneConfig, Simulation};

#[derive(Parser)]
#[command(name = "glyphfield")]
#[command(about = "Particles that fly in and settle into the shape of text", long_about = None)]
#[command(version)]
struct Cli {
    /// Text to form. A literal `\n` starts a new line.
    text: Option<String>,

    /// Scene file (JSON) to start from; other flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font file (otherwise the font family is looked up
    /// among installed fonts; family "builtin" selects the bitmap font)
    #[arg(long)]
    font: Option<PathBuf>,

    /// CSS-style font descriptor, e.g. "900 180px Arial"
    #[arg(long)]
    font_spec: Option<FontSpec>,

    /// Use the poster layout (large canvas, dense sampling) as the base
    #[arg(long)]
    poster: bool,

    /// Number of particles
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// Seed for scatter, colors and depth jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Sampling stride in pixels
    #[arg(long)]
    step: Option<u32>,

    /// Minimum alpha (exclusive) for a pixel to count as ink
    #[arg(long)]
    threshold: Option<u8>,

    /// World units per pixel
    #[arg(long)]
    scale: Option<f32>,

    /// Line pitch as a multiple of line height
    #[arg(long)]
    line_spacing: Option<f32>,

    /// Drawing surface size, e.g. 2000x900
    #[arg(long, value_parser = parse_canvas)]
    canvas: Option<(u32, u32)>,

    /// Color palette: birthday, neon, fire, ocean or grayscale
    #[arg(long)]
    palette: Option<Palette>,

    /// Follow the wall clock, advancing SCALE animation units per second
    #[arg(long, value_name = "SCALE")]
    real_time: Option<f64>,

    /// Simulate FRAMES frames without a window and report convergence
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Write the rasterized text surface to a PNG and exit
    #[arg(long, value_name = "PNG")]
    dump_mask: Option<PathBuf>,

    /// Save the resolved scene as JSON and exit
    #[arg(long, value_name = "JSON")]
    save_config: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_canvas(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width: {}", e))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height: {}", e))?;
    Ok((w, h))
}

impl Cli {
    fn scene(&self) -> Result<SceneConfig, Box<dyn Error>> {
        let mut scene = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };

        if self.poster {
            scene.layout = glyphfield::LayoutConfig::poster();
        }
        if let Some(text) = &self.text {
            scene.text = text.replace("\\n", "\n");
        }
        if let Some(font) = &self.font {
            scene.font_file = Some(font.clone());
        }
        if let Some(spec) = &self.font_spec {
            scene.layout.font = spec.clone();
        }
        if let Some(n) = self.particles {
            scene.field.particle_count = n;
        }
        if let Some(seed) = self.seed {
            scene.field.seed = Some(seed);
        }
        if let Some(step) = self.step {
            scene.layout.sample_step = step;
        }
        if let Some(threshold) = self.threshold {
            scene.layout.alpha_threshold = threshold;
        }
        if let Some(scale) = self.scale {
            scene.layout.world_scale = scale;
        }
        if let Some(spacing) = self.line_spacing {
            scene.layout.line_spacing = spacing;
        }
        if let Some((w, h)) = self.canvas {
            scene.layout.canvas_width = w;
            scene.layout.canvas_height = h;
        }
        if let Some(palette) = &self.palette {
            scene.field.palette = palette.clone();
        }
        if let Some(scale) = self.real_time {
            scene.clock = ClockMode::RealTime { scale };
        }
        Ok(scene)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scene = cli.scene()?;

    if let Some(path) = &cli.save_config {
        scene.save(path)?;
        log::info!("scene written to {}", path.display());
        return Ok(());
    }

    let sim = Simulation::from_scene(scene);

    if let Some(path) = &cli.dump_mask {
        let mask = sim.rasterize();
        mask.save_png(path)?;
        println!(
            "{}x{} surface written to {} ({} pixels above threshold)",
            mask.width(),
            mask.height(),
            path.display(),
            mask.count_above(sim.scene().layout.alpha_threshold)
        );
        return Ok(());
    }

    if let Some(frames) = cli.headless {
        let field = sim.run_headless(frames);
        println!(
            "{} particles, {} bound, t = {:.2}, mean distance to target = {:.5}",
            field.len(),
            field.bound_count(),
            field.time(),
            field.residual()
        );
        return Ok(());
    }

    sim.run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("2000x900"), Ok((2000, 900)));
        assert_eq!(parse_canvas("640X480"), Ok((640, 480)));
        assert!(parse_canvas("2000").is_err());
        assert!(parse_canvas("ax9").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "glyphfield",
            "HAPPY\\nBIRTHDAY",
            "--particles",
            "500",
            "--canvas",
            "800x400",
            "--palette",
            "neon",
            "--real-time",
            "0.6",
            "--font-spec",
            "900 180px Arial",
        ]);
        let scene = cli.scene().unwrap();
        assert_eq!(scene.text, "HAPPY\nBIRTHDAY");
        assert_eq!(scene.field.particle_count, 500);
        assert_eq!((scene.layout.canvas_width, scene.layout.canvas_height), (800, 400));
        assert_eq!(scene.field.palette, Palette::Neon);
        assert_eq!(scene.clock, ClockMode::RealTime { scale: 0.6 });
        assert_eq!(scene.layout.font.weight, 900);
    }
}
