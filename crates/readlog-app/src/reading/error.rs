use readlog_types::ValidationError;

pub type Result<T, E = ReadingError> = std::result::Result<T, E>;

pub const USER_NOT_FOUND: &str = "User does not exist";
pub const NO_RECORD_TO_SCORE: &str = "Can't score a book without reading it.";
pub const NO_RECORD_TO_DATE: &str = "Can't set finish date of a book without reading it.";
pub const NO_RECORD_TO_REREAD: &str = "Can't reread a book without reading it.";
pub const NOT_FINISHED: &str = "Only a finished book can be reread.";

#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("The date can not be in the future.")]
    InvalidDate,
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("Store error: {0}")]
    Store(#[from] readlog_dal::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidDate,
    InvalidState,
    Store,
}

impl ReadingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReadingError::Validation(_) => ErrorKind::Validation,
            ReadingError::NotFound(_) => ErrorKind::NotFound,
            ReadingError::InvalidDate => ErrorKind::InvalidDate,
            ReadingError::InvalidState(_) => ErrorKind::InvalidState,
            // record deleted by concurrent request between lookup and update
            ReadingError::Store(readlog_dal::Error::RecordNotFound(_)) => ErrorKind::NotFound,
            ReadingError::Store(_) => ErrorKind::Store,
        }
    }
}
