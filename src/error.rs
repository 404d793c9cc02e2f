use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Corrections themselves never fail for unknown words - they return an empty
/// suggestion list. Errors are reserved for misconfiguration, bad call
/// arguments, I/O and corrupt serialized state.
#[derive(Error, Debug)]
pub enum SymSpellError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

pub type Result<T> = std::result::Result<T, SymSpellError>;
