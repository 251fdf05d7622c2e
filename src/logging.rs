use log::LevelFilter;

/// Log levels matching the C enum
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    /// Get the integer representation for the C interface
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// `log` crate filter equivalent. `User` messages are fatal-level in the
    /// C enum and share `Error`.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.to_level_filter()
    }
}

/// Install `env_logger` at `level`. `RUST_LOG` still refines per-module
/// filters. A second call only adjusts the global maximum level.
pub fn init_logging(level: LogLevel) {
    let filter = level.to_level_filter();
    let installed = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
    if installed.is_err() {
        set_log_level(level);
    }
}

/// Change the global maximum level without reinstalling the logger.
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.to_level_filter());
}
