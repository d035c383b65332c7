use thiserror::Error;

/// Errors raised at the edges of the core: parsing names, loading config and
/// reading snapshots. The matrix and engine math never produce these.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A state name that is not one of the five modes
    #[error("unknown bot state: {0}")]
    UnknownState(String),

    /// A config value outside its legal range
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Snapshot could not be encoded or decoded
    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
