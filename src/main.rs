use anyhow::{Context, Result};
use clap::Parser;
use inkshot::draw::Raster;
use inkshot::script::Script;
use inkshot::{CapturedImage, Config, Editor};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inkshot")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("INKSHOT_GIT_HASH"), ")"),
    about = "Headless screenshot annotation editor"
)]
struct Cli {
    /// Captured image to annotate (PNG)
    #[arg(long, short = 'i', value_name = "PNG")]
    input: PathBuf,

    /// Where to write the flattened result (PNG)
    #[arg(long, short = 'o', value_name = "PNG")]
    output: PathBuf,

    /// TOML script of input events to replay before exporting
    #[arg(long, short = 's', value_name = "TOML")]
    script: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/inkshot/config.toml)
    #[arg(long, short = 'c', value_name = "TOML")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let raster = Raster::read_png(&cli.input)
        .with_context(|| format!("Failed to read capture {}", cli.input.display()))?;
    let mut editor = Editor::new(CapturedImage::from(raster), &config);

    if let Some(path) = &cli.script {
        let script = Script::load(path)?;
        info!("Replaying {} scripted events", script.event.len());
        script.replay(&mut editor)?;
    }

    let flattened = editor.begin_export()?;
    let written = flattened
        .write_png(&cli.output)
        .map_err(|e| e.to_string());
    editor.finish_export(written.clone());
    written
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(
        "Wrote {} ({} annotations)",
        cli.output.display(),
        editor.scene().len()
    );
    Ok(())
}
