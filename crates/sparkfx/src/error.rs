//! Error types for the effects engine.
//!
//! Errors only surface at configuration boundaries: loading presets,
//! parsing tuning, starting an effect. The per-frame path never fails.

use thiserror::Error;

/// Errors raised while configuring or starting effects.
#[derive(Error, Debug)]
pub enum EffectError {
    /// No preset registered under this name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Preset or tuning TOML could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds values the engine cannot use.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Too many effects running at once.
    #[error("session limit reached: {limit} effects already running")]
    SessionLimit {
        /// Configured maximum.
        limit: usize,
    },
}

/// Result type for engine operations.
pub type EffectResult<T> = Result<T, EffectError>;
