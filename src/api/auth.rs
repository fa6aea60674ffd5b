/// 認証マネージャー
///
/// api.videoのベアラートークン認証を管理します。
/// APIキーからアクセストークン/リフレッシュトークンを取得し、
/// 有効期限を追跡して必要なときだけ更新します。
/// シングルスレッドでの直列利用を前提としており、ロックは持ちません。
use crate::api::error::ApiError;
use crate::api::types::TokenResponse;
use chrono::{DateTime, Duration, Utc};
use log::info;
use reqwest::Client;
use serde_json::json;

/// 認証情報
///
/// APIキーは不変の入力。トークンと有効期限は authenticate / refresh の
/// たびに丸ごと置き換えられる派生状態で、永続化はしない。
#[derive(Debug, Clone)]
pub struct Credential {
    api_key: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// 空の認証情報を作成（トークン未取得の状態）
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            access_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// トークンが未取得、または有効期限切れかどうか
    ///
    /// `now >= expires_at` でちょうど期限切れとみなす。
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now >= expires_at,
            _ => true,
        }
    }

    /// トークンレスポンスで全体を置き換える
    fn store(&mut self, token: TokenResponse, now: DateTime<Utc>) {
        self.expires_at = Some(now + Duration::seconds(token.expires_in));
        self.access_token = Some(token.access_token);
        self.refresh_token = Some(token.refresh_token);
    }
}

/// 認証マネージャー
pub struct Authenticator {
    http: Client,
    base_url: String,
    credential: Credential,
}

impl Authenticator {
    /// 新しい認証マネージャーを作成
    ///
    /// # Arguments
    /// * `http` - 共有のHTTPクライアント
    /// * `base_url` - APIのベースURL（例: "https://ws.api.video"）
    /// * `api_key` - api.video APIキー
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            credential: Credential::new(api_key),
        }
    }

    /// APIキーで認証し、トークン一式を取得する
    ///
    /// POST /auth/api-key。非2xxの場合は ApiError::Auth を返す。
    pub async fn authenticate(&mut self) -> Result<(), ApiError> {
        let payload = json!({ "apiKey": self.credential.api_key });
        let token = self.request_token("/auth/api-key", payload).await?;
        self.credential.store(token, Utc::now());
        Ok(())
    }

    /// リフレッシュトークンでトークン一式を更新する
    ///
    /// POST /auth/refresh。成功・失敗の契約は authenticate と同じ。
    ///
    /// # Errors
    /// リフレッシュトークンを保持していない場合は ApiError::NotAuthenticated。
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let refresh_token = self
            .credential
            .refresh_token
            .clone()
            .ok_or(ApiError::NotAuthenticated)?;

        let payload = json!({ "refreshToken": refresh_token });
        let token = self.request_token("/auth/refresh", payload).await?;
        self.credential.store(token, Utc::now());
        Ok(())
    }

    /// 現在有効なアクセストークンを返す
    ///
    /// トークンが未取得または期限切れの場合のみ、透過的に refresh() を
    /// 呼んでから返す。それ以外ではネットワークアクセスは発生しない。
    pub async fn valid_token(&mut self) -> Result<String, ApiError> {
        if self.credential.needs_refresh(Utc::now()) {
            info!("access token missing or expired, refreshing");
            self.refresh().await?;
        }

        // refresh 成功後は必ず Some
        self.credential
            .access_token
            .clone()
            .ok_or(ApiError::NotAuthenticated)
    }

    /// 認証エンドポイントにPOSTし、トークンレスポンスを取り出す
    async fn request_token(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<TokenResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::timeout(format!("POST {}", path))
                } else {
                    ApiError::network(format!("request failed for POST {}: {}", path, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ApiError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ApiError::network(format!("failed to parse token response: {}", e)))
    }

    /// テスト用: トークン状態を直接セットする
    #[cfg(test)]
    pub(crate) fn seed_tokens(
        &mut self,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) {
        self.credential.access_token = Some(access_token.to_string());
        self.credential.refresh_token = Some(refresh_token.to_string());
        self.credential.expires_at = Some(expires_at);
    }
}
