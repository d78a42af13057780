//! Raster Pyramid - command-line front end.
//!
//! `info` prints the level layout for a geometry; `build` loads an image into a
//! raster and exports every level.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raster_pyramid::{
    codec::{buffer_from_image, decode, export_levels, TileEncoder},
    config::{BuildConfig, Cli, Command, InfoConfig},
    LevelInfo, Point, PyramidLayout, Raster, Rect, Size,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            error!("Failed to configure thread pool: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match cli.command {
        Command::Info(config) => run_info(config),
        Command::Build(config) => run_build(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "raster_pyramid=debug"
    } else {
        "raster_pyramid=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let bounds = Rect::new(0, 0, config.width as i32, config.height as i32);
    let tile_size = Size::new(config.tile_width, config.tile_height);
    let layout = match PyramidLayout::new(bounds, tile_size) {
        Ok(layout) => layout,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let levels: Vec<LevelInfo> = layout.iter().copied().collect();

    if config.json {
        match serde_json::to_string_pretty(&levels) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize layout: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Raster {} with {} tiles", bounds, tile_size);
    println!("{} level(s), coarsest first", levels.len());
    println!();
    println!("{:>5}  {:>12}  {:>9}  {:>10}", "level", "size", "tiles", "downsample");
    for level in &levels {
        println!(
            "{:>5}  {:>12}  {:>9}  {:>10}",
            level.level,
            format!("{}x{}", level.width, level.height),
            format!("{}x{}", level.tiles_across, level.tiles_down),
            level.downsample
        );
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Build Command
// =============================================================================

fn run_build(config: BuildConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match build(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn build(config: &BuildConfig) -> Result<(), String> {
    let kind = config.pixel_kind()?;
    let filter = config.filter()?;
    let format = config.output_format()?;

    let source = std::fs::read(&config.input)
        .map_err(|e| format!("Failed to read {}: {}", config.input.display(), e))?;
    let img = decode(&source).map_err(|e| e.to_string())?;
    let pixels = buffer_from_image(&img, kind).map_err(|e| e.to_string())?;

    let bounds = Rect::from_size(Point::ORIGIN, pixels.size());
    let tile_size = Size::new(config.tile_size, config.tile_size);
    let raster = Raster::with_filter(bounds, tile_size, kind, filter).map_err(|e| e.to_string())?;

    info!(
        input = %config.input.display(),
        bounds = %bounds,
        kind = %kind,
        levels = raster.levels(),
        "loading image"
    );
    raster
        .write_rect(-1, bounds, &pixels)
        .map_err(|e| e.to_string())?;

    let encoder = TileEncoder::new(format).with_quality(config.quality);
    let summary =
        export_levels(&raster, &config.out, &encoder, config.tiles).map_err(|e| e.to_string())?;

    for path in &summary.levels {
        println!("{}", path.display());
    }
    if config.tiles {
        println!("{} tile(s)", summary.tiles);
    }
    Ok(())
}
