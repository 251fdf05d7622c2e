use crate::config::{parse_resolution, GdiConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// gdi16 - render the demo scene through the software GDI
#[derive(Parser, Debug, Default)]
#[command(name = "gdi16")]
#[command(version = "0.3.0")]
#[command(about = "Software 16-bit GDI renderer - draws a demo scene to PNG", long_about = None)]
pub struct Cli {
    /// Screen width in pixels
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<i32>,

    /// Screen height in pixels
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<i32>,

    /// Screen resolution (e.g., 640x480); overridden by --width/--height
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Property file with screen and table settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (0 = nothing .. 6 = all)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<i32>,

    /// Output PNG path
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,
}

impl Cli {
    /// Merge CLI arguments into the loaded configuration
    pub fn merge_into_config(&self, mut config: GdiConfig) -> Result<GdiConfig> {
        if let Some(ref res) = self.res {
            let res = parse_resolution(res).context("Invalid resolution format")?;
            config.screen_width = res.width;
            config.screen_height = res.height;
        }

        if let Some(width) = self.width {
            config.screen_width = width;
        }

        if let Some(height) = self.height {
            config.screen_height = height;
        }

        config.validate().context("Invalid screen configuration")?;
        Ok(config)
    }
}
