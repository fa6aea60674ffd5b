use std::io;
/// API層のエラー定義
///
/// api.videoとのやり取りで発生するエラーを構造化して定義。
/// 認証エラー（auth/refreshエンドポイントの非2xx）と、それ以外の
/// エンドポイントの予期しないステータスを区別する。
/// どちらもステータスコードとレスポンス本文をそのまま保持する。
use crate::error_severity::ErrorSeverity;
use crate::tags::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 認証・トークン更新エンドポイントが非2xxを返した
    #[error("authentication failed: {status} - {body}")]
    Auth { status: u16, body: String },

    /// リフレッシュトークン未取得の状態でトークン更新を試みた
    #[error("not authenticated: no refresh token available")]
    NotAuthenticated,

    /// APIエンドポイントが予期しないステータスを返した
    #[error("API request failed: {status} - {body}")]
    Request { status: u16, body: String },

    /// ネットワークエラー
    #[error("network error: {message}")]
    Network { message: String },

    /// タイムアウトエラー
    #[error("operation timed out: {operation}")]
    Timeout { operation: String },

    /// タグ台帳への書き込みエラー（list_videosの副作用）
    #[error("tag ledger error")]
    Ledger(#[from] LedgerError),

    /// その他のI/Oエラー（アップロードファイルの読み込み等）
    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl ApiError {
    /// ネットワークエラーを作成
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// タイムアウトエラーを作成
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Auth { .. } | Self::NotAuthenticated => ErrorSeverity::ConfigError,
            _ => ErrorSeverity::SystemError,
        }
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Auth { .. } => Some("Check that your api.video API key is valid."),
            Self::NotAuthenticated => {
                Some("Authenticate with the API key before issuing requests.")
            }
            _ => None,
        }
    }
}
