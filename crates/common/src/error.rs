use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReopenError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type ReopenResult<T> = Result<T, ReopenError>;
