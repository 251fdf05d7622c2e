// gdi16 Rust library
// Software GDI for a 16-bit windowing environment

pub mod cli;
pub mod config;
pub mod demo;
pub mod graphics;
pub mod logging;

pub use cli::Cli;
pub use config::GdiConfig;
pub use graphics::{GdiContext, GdiError};
pub use logging::LogLevel;
