use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebpluckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Operation already in progress for session {0}")]
    RunInProgress(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, WebpluckError>;
