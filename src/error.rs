use thiserror::Error;

/// Everything a command can fail with. Handler-level variants carry the
/// user-facing message in their Display form; `Storage` and `Closed` are
/// logged and replaced with a generic reply before reaching the user.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("{0}")]
    Validation(String),

    #[error("Usage: `{0}`")]
    Usage(&'static str),

    #[error("Event {0} is already on record. Use `.update_event` if you would like to change its details.")]
    DuplicateName(String),

    #[error("Event {0} is not on record.")]
    NotFound(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("the event store connection has been closed")]
    Closed,
}

impl BotError {
    /// True for failures the user cannot fix by retyping the command.
    pub fn is_internal(&self) -> bool {
        matches!(self, BotError::Storage(_) | BotError::Closed)
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
