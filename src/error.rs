use catalog_common::Notice;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// 操作の失敗（通知文言をそのまま表示）
    #[error("{0}")]
    Action(Notice),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Page {page} does not exist (available: 1..={total})")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] catalog_common::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl From<Notice> for ClientError {
    fn from(notice: Notice) -> Self {
        ClientError::Action(notice)
    }
}

impl ClientError {
    /// 認証切れで終了したか
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::Action(notice) if notice.is_session_expired())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
