use thiserror::Error;

/// Errors surfaced by the catalog, the session engine and the result sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("difficulty '{0}' has no playable budget in the configured table")]
    InvalidDifficulty(String),

    #[error("catalog has no items")]
    EmptyCatalog,

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("unknown bin label '{0}'")]
    UnknownBin(String),

    #[error("session has not terminated yet")]
    NotTerminated,

    #[error("result store unavailable: {0}")]
    SinkUnavailable(String),
}

impl From<rusqlite::Error> for QuizError {
    fn from(err: rusqlite::Error) -> Self {
        QuizError::SinkUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
