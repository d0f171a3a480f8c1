use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating compressor settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },
}
