use thiserror::Error;

pub type RevueResult<T> = Result<T, RevueError>;

/// Message shown when anything past validation goes wrong.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred. Check the columns: Account / Label / Balance.";

/// Message shown when the uploaded bytes are not a readable workbook.
pub const DECODE_FAILURE_MESSAGE: &str = "The file could not be read as an Excel workbook.";

#[derive(Error, Debug)]
pub enum RevueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    MissingInput(String),

    #[error("Failed to decode workbook: {0}")]
    Decode(String),

    #[error("Failed to encode workbook: {0}")]
    Encode(String),
}

impl RevueError {
    /// Text safe to show to the end user. Only missing-input errors carry
    /// their own detail; everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            RevueError::MissingInput(msg) => msg.clone(),
            RevueError::Decode(_) => DECODE_FAILURE_MESSAGE.to_string(),
            RevueError::Io(_) | RevueError::Encode(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_missing_input(&self) -> bool {
        matches!(self, RevueError::MissingInput(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, RevueError::Decode(_))
    }
}
