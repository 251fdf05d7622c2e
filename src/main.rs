use anyhow::{Context, Result};
use clap::Parser;

use gdi16::config;
use gdi16::demo;
use gdi16::logging::{self, LogLevel};
use gdi16::{Cli, GdiContext};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging (early)
    let level = cli.log_level.map(LogLevel::from_i32).unwrap_or(LogLevel::Warning);
    logging::init_logging(level);
    log::info!("gdi16 demo renderer starting");

    // Load configuration file, then let the command line override it
    let config = config::load_config(cli.config.as_ref())?;
    let config = cli.merge_into_config(config)?;
    log::info!(
        "Screen {}x{}, {} DC slots, {} object slots",
        config.screen_width,
        config.screen_height,
        config.max_dcs,
        config.max_objects
    );

    let mut gdi = GdiContext::init_with(config).context("Failed to initialize GDI")?;
    demo::render_scene(&mut gdi).context("Failed to render demo scene")?;
    demo::save_png(gdi.screen()?, &cli.out)?;
    gdi.free();

    log::info!("Wrote {}", cli.out.display());
    Ok(())
}
