//! エラー型定義
//!
//! - `Error`: 永続ストレージ層のエラー
//! - `GatewayError`: バックエンド呼び出しの失敗分類（認証 / リクエスト / 通信）

use thiserror::Error;

/// ストレージ層のエラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// 認証失敗の種別
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// トークン未保持のままAPIを呼ぼうとした
    #[error("No token found. Please log in again.")]
    MissingCredential,

    /// サーバーが401を返した
    #[error("Session expired or not authenticated. Please log in again.")]
    Unauthorized,

    /// /token がトークンを発行しなかった
    #[error("{0}")]
    LoginRejected(String),
}

/// バックエンド呼び出しの失敗分類
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 2xx以外（401を除く）、またはリクエスト前の入力検証エラー
    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// 接続不可・レスポンス不正
    #[error("{0}")]
    Transport(String),
}

impl GatewayError {
    /// 送信前の入力検証エラー（HTTPステータスなし）
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Request {
            status: None,
            message: message.into(),
        }
    }

    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        GatewayError::Transport(format!("malformed response: {}", detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_auth_error_converts_into_gateway_error() {
        let error: GatewayError = AuthError::Unauthorized.into();
        assert!(matches!(error, GatewayError::Auth(AuthError::Unauthorized)));
        assert_eq!(
            error.to_string(),
            "Session expired or not authenticated. Please log in again."
        );
    }

    #[test]
    fn test_request_error_displays_server_text_verbatim() {
        let error = GatewayError::Request {
            status: Some(500),
            message: "{\"detail\":\"database locked\"}".to_string(),
        };
        assert_eq!(error.to_string(), "{\"detail\":\"database locked\"}");
    }

    #[test]
    fn test_validation_has_no_status() {
        let error = GatewayError::validation("Please enter requirements to search.");
        assert!(matches!(error, GatewayError::Request { status: None, .. }));
    }

    #[test]
    fn test_malformed_is_transport() {
        let error = GatewayError::malformed("expected value at line 1");
        assert!(matches!(error, GatewayError::Transport(_)));
        assert!(error.to_string().starts_with("malformed response"));
    }
}
