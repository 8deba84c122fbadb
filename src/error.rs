use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TypetestError {
    #[error("unsupported test duration: {0}s (expected 15, 30 or 60)")]
    UnsupportedDuration(u64),

    #[error("dictionary `{0}` not found")]
    DictionaryNotFound(String),

    #[error("dictionary `{0}` is not valid utf-8")]
    DictionaryEncoding(String),

    #[error("dictionary `{0}` contains no words")]
    EmptyDictionary(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TypetestError>;
