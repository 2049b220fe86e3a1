use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nox_core::NoxConfig;
use nox_ui::{AppOptions, NoxApp};
use tracing_subscriber::EnvFilter;

/// Desktop preview of the Nox page.
#[derive(Debug, Parser)]
#[command(name = "nox-preview", version)]
struct Args {
    /// JSON file overriding starfield and palette settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start without the animated background.
    #[arg(long)]
    reduced_motion: bool,

    /// Directory for the session record.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<NoxConfig> {
    let Some(path) = path else {
        return Ok(NoxConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    NoxConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let options = AppOptions {
        config: load_config(args.config.as_ref())?,
        reduced_motion: args.reduced_motion,
        data_dir: args.data_dir,
    };

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Nox")
            .with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Nox",
        native,
        Box::new(move |cc| Ok(Box::new(NoxApp::new(cc, options)))),
    )
    .map_err(|e| anyhow::anyhow!("preview window failed: {e}"))
}
