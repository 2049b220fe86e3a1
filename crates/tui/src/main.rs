mod renderer;

use std::fs::File;
use std::io::{Write, stderr, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nox_core::palette::{decode_palette, mix_hex};
use nox_core::surface::{RasterSurface, Surface};
use nox_core::{NoxConfig, StarField};
use nox_protocol::Viewport;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

/// Starfield and theme tools for the Nox page.
#[derive(Debug, Parser)]
#[command(name = "nox", version)]
struct Cli {
    /// JSON file overriding starfield and palette settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Animate the starfield in the terminal (the default).
    Stars {
        /// Draw nothing, as a browser preferring reduced motion would.
        #[arg(long)]
        reduced_motion: bool,
    },
    /// Print the theme variables a logo would produce.
    Palette {
        image: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Render a single starfield frame to a PNG.
    Snapshot {
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        /// Frame time in milliseconds.
        #[arg(long, default_value_t = 0.0)]
        at: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long, default_value = "starfield.png")]
        out: PathBuf,
    },
    /// Mix two hex colors: each channel is a * (1 - ratio) + b * ratio.
    Mix { a: String, b: String, ratio: f64 },
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // stdout carries command output and the live view owns the terminal, so
    // without a log file only warnings reach stderr.
    let default = if log_file.is_some() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(stderr).init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<NoxConfig> {
    let Some(path) = path else {
        return Ok(NoxConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    NoxConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn palette(config: &NoxConfig, image: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let Some(palette) = decode_palette(&bytes, &config.palette)? else {
        writeln!(
            stderr(),
            "{}: no opaque pixels, theme left unchanged",
            image.display()
        )?;
        return Ok(());
    };
    let theme = palette.theme(&config.palette);
    let mut out = stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&theme)?)?;
    } else {
        for (name, value) in theme.css_variables() {
            writeln!(out, "{name}: {value};")?;
        }
    }
    Ok(())
}

fn snapshot(
    config: &NoxConfig,
    viewport: Viewport,
    at: f64,
    seed: Option<u64>,
    out: &Path,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let field = StarField::generate(&config.starfield, viewport, &mut rng);
    let mut surface = RasterSurface::new(viewport);
    surface.draw(&field.render(&config.starfield, at));
    surface
        .into_image()
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(stars = field.len(), path = %out.display(), "snapshot written");
    writeln!(stdout(), "{} stars -> {}", field.len(), out.display())?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Stars {
        reduced_motion: false,
    }) {
        Command::Stars { reduced_motion } => renderer::run_live(config.starfield, reduced_motion),
        Command::Palette { image, json } => palette(&config, &image, json),
        Command::Snapshot {
            width,
            height,
            at,
            seed,
            out,
        } => snapshot(&config, Viewport::new(width, height), at, seed, &out),
        Command::Mix { a, b, ratio } => {
            writeln!(stdout(), "{}", mix_hex(&a, &b, ratio)?)?;
            Ok(())
        }
    }
}
