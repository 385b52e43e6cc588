use thiserror::Error;

/// Errors raised by the simulator.
///
/// Numeric edge cases in the control loop never produce an error; they
/// saturate instead. Only the strict vehicle entry point, config loading
/// and the I/O surfaces (output files, logger) can fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{quantity} of {value} exceeds the allowed magnitude of {limit}")]
    InvalidInput {
        quantity: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("vehicle {quantity} must be finite and positive, got {value}")]
    InvalidLimit { quantity: &'static str, value: f64 },

    #[error("cannot read the session config: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("cannot parse the session config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("cannot serialise the session summary: {0}")]
    Summary(#[from] serde_json::Error),

    #[error("an error occured while setting up the logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;
