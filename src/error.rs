use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeTestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("language file not found: {0}")]
    LanguageNotFound(String),

    #[error("language {0} has no words")]
    EmptyWordList(String),
}

pub type Result<T> = std::result::Result<T, TypeTestError>;
