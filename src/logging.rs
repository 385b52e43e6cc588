//! Logger setup for the binaries.

use log::LevelFilter;

use crate::error::Result;

/// Environment variable holding the log level (`error` .. `trace`, `off`).
pub const LOG_LEVEL_ENV: &str = "LANE_SIM_LOG";

/// Install a stderr logger. Must only be called once per process.
pub fn init(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Parse a level name, falling back to `Info` for anything unrecognised.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Read the level from [`LOG_LEVEL_ENV`].
pub fn level_from_env() -> LevelFilter {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}
