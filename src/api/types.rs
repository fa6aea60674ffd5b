/// API通信用の型定義
///
/// api.videoのAPIレスポンスをデシリアライズするための構造体を定義します。
/// エンドポイントのペイロードは基本的に serde_json::Value のまま扱うため、
/// ここにあるのは認証フローとタグ台帳の副作用が必要とする最小限の型のみです。
use serde::{Deserialize, Serialize};

/// 認証トークンレスポンス
///
/// POST /auth/api-key および POST /auth/refresh のレスポンス型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// トークンタイプ（常に "Bearer"）
    pub token_type: String,

    /// アクセストークンの有効期限（秒）
    pub expires_in: i64,

    /// アクセストークン（API呼び出し用）
    pub access_token: String,

    /// リフレッシュトークン（トークン更新用）
    pub refresh_token: String,
}

impl TokenResponse {
    /// トークンレスポンスが有効かチェック
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
            && !self.refresh_token.is_empty()
            && self.token_type == "Bearer"
    }
}

/// GET /videos レスポンスのページ
///
/// タグ台帳の副作用に必要な項目だけを取り出す。未知のフィールドは無視。
#[derive(Debug, Clone, Deserialize)]
pub struct VideoPage {
    #[serde(default)]
    pub data: Vec<VideoItem>,
}

/// 動画一覧の1項目
///
/// `videoId` と `tags` の両方を持つ項目だけが台帳に記録される。
#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,

    pub tags: Option<Vec<String>>,
}
