use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use tileconv::{Config, OutputFormat, Platform, Session};

#[derive(Parser, Debug)]
#[command(name = "tileconv")]
#[command(author, version, about = "Convert images into console tiles, palettes and maps", long_about = None)]
struct Args {
    /// Input PNG image path
    input: PathBuf,

    /// Target platform: dmg, cgb, sfc or ngpc
    #[arg(short, long)]
    platform: Option<Platform>,

    /// Output file prefix (defaults to the input path without extension)
    #[arg(short, long)]
    output: Option<String>,

    /// Artifact format: bin or hex
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Output tile sheet PNG path (optional)
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Output JSON report path (optional)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Keep duplicate tiles even when there are more than 255
    #[arg(long)]
    no_quantize: bool,

    /// JSON configuration file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(platform) = self.platform {
            config.platform = platform;
        }
        if let Some(prefix) = &self.output {
            config.output_prefix = Some(prefix.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(sheet) = &self.sheet {
            config.output_sheet = Some(sheet.to_string_lossy().into_owned());
        }
        if let Some(report) = &self.report {
            config.output_json = Some(report.to_string_lossy().into_owned());
        }
        if self.no_quantize {
            config.auto_quantize = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = args.config()?;
    info!("Converting {} for {}", args.input.display(), config.platform);

    let session = Session::open(&args.input, config.platform, config.auto_quantize)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    for warning in session.warnings() {
        warn!(
            "Block {},{} had {} colors (maximum is {})",
            warning.x,
            warning.y,
            warning.colors,
            config.platform.palette_size()
        );
    }
    if let Some(map) = session.map() {
        if !map.check_valid_indexes(session.tileset()) {
            warn!(
                "{} tiles do not fit 8-bit map indices, only tiles and palettes will be written",
                session.tileset().tile_count()
            );
        }
    }

    let prefix = config.prefix_for(&args.input);
    let files = session
        .write_artifacts(&prefix, config.format)
        .context("Failed to write artifacts")?;
    for file in &files {
        info!("Wrote {}", file.display());
    }

    if let Some(path) = &config.output_sheet {
        session
            .write_sheet(path)
            .with_context(|| format!("Failed to write tile sheet {path}"))?;
        info!("Wrote {}", path);
    }
    if let Some(path) = &config.output_json {
        session
            .write_report(path)
            .with_context(|| format!("Failed to write report {path}"))?;
        info!("Wrote {}", path);
    }

    info!(
        "{} palettes, {} tiles",
        session.tileset().palette_count(),
        session.tileset().tile_count()
    );
    Ok(())
}
