/// HTTPリクエストディスパッチャ
///
/// api.videoとの通信を担当する共通クライアント。
/// 認証マネージャーから有効なトークンを取り出してAuthorizationヘッダーに
/// 付与し、ボディ種別（JSON / multipart）に応じてエンコードを切り替え、
/// ステータスコードを成功・失敗にマッピングします。
/// リトライもページネーションも行いません。
use crate::api::auth::Authenticator;
use crate::api::error::ApiError;
use crate::config::APP_CONFIG;
use crate::tags::TagLedger;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// APIクライアントの結果型
pub type ApiResult<T> = Result<T, ApiError>;

/// リクエストボディの種別
///
/// 呼び出し側が明示的に選択する。ファイルパートとJSONボディの
/// 暗黙の組み合わせ推論はしない。
#[derive(Debug)]
pub enum RequestBody {
    /// ボディなし（GET / DELETE）
    Empty,

    /// JSONボディ
    Json(Value),

    /// multipart/form-data（ファイルアップロード）
    Multipart(Vec<FilePart>),
}

/// multipartリクエストの1ファイルパート
#[derive(Debug)]
pub struct FilePart {
    /// フォームフィールド名（api.videoでは常に "file"）
    pub name: String,

    /// 送信するファイル名
    pub file_name: String,

    /// ファイル内容
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// ローカルファイルから "file" パートを作成
    pub async fn from_path(path: &Path) -> ApiResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            name: "file".to_string(),
            file_name,
            bytes,
        })
    }
}

/// APIクライアント
///
/// 単一の呼び出し元から直列に使用する前提（&mut self メソッド）。
/// タグ台帳を保持し、list_videos の副作用として書き込む。
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: Authenticator,
    pub(crate) ledger: TagLedger,
}

impl ApiClient {
    /// 新しいAPIクライアントを作成
    ///
    /// # Arguments
    /// * `base_url` - APIのベースURL（例: "https://ws.api.video"）
    /// * `api_key` - api.video APIキー
    /// * `ledger` - 起動時に読み込み済みのタグ台帳
    pub fn new(base_url: String, api_key: String, ledger: TagLedger) -> ApiResult<Self> {
        let timeout = Duration::from_secs(APP_CONFIG.api.timeout_seconds);

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {}", e)))?;

        let auth = Authenticator::new(http.clone(), base_url.clone(), api_key);

        Ok(Self {
            http,
            base_url,
            auth,
            ledger,
        })
    }

    /// デフォルトのプロダクション環境クライアントを作成
    pub fn production(api_key: String, ledger: TagLedger) -> ApiResult<Self> {
        Self::new(APP_CONFIG.api.endpoint.to_string(), api_key, ledger)
    }

    /// APIキーで認証し、トークン一式を取得する
    pub async fn authenticate(&mut self) -> ApiResult<()> {
        self.auth.authenticate().await
    }

    /// リクエストを送信し、レスポンスをパース済みJSONにマッピングする
    ///
    /// # Arguments
    /// * `method` - HTTPメソッド
    /// * `path` - エンドポイントパス（例: "/videos/{id}"）
    /// * `body` - リクエストボディの種別
    /// * `query` - クエリパラメータ（空スライスで省略）
    ///
    /// # Returns
    /// ステータスが 200/201/204 かつボディが非空ならパース済みJSON、
    /// ボディが空なら None。
    ///
    /// # Errors
    /// それ以外のステータスでは ApiError::Request { status, body }。
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: RequestBody,
        query: &[(String, String)],
    ) -> ApiResult<Option<Value>> {
        let token = self.auth.valid_token().await?;
        let url = self.build_url(path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&token);

        if !query.is_empty() {
            request = request.query(query);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = form.part(
                        part.name,
                        reqwest::multipart::Part::bytes(part.bytes).file_name(part.file_name),
                    );
                }
                request.multipart(form)
            }
        };

        let response = Self::dispatch(request, &method, path).await?;
        Self::into_payload(response).await
    }

    /// URLを構築
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// リクエストを送信し、トランスポートエラーをマッピングする
    async fn dispatch(
        request: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> ApiResult<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(format!("{} {}", method, path))
            } else if e.is_connect() {
                ApiError::network(format!("connection failed for {} {}: {}", method, path, e))
            } else {
                ApiError::network(format!("request failed for {} {}: {}", method, path, e))
            }
        })
    }

    /// レスポンスを Option<Value> または ApiError::Request に変換する
    async fn into_payload(response: Response) -> ApiResult<Option<Value>> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("failed to read response body: {}", e)))?;

        if !matches!(status, 200 | 201 | 204) {
            return Err(ApiError::Request { status, body });
        }

        if body.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ApiError::network(format!("failed to parse JSON response: {}", e)))
    }

    /// テスト用: 有効なトークン状態をセットし、認証ラウンドトリップを省く
    #[cfg(test)]
    pub(crate) fn seed_tokens(&mut self) {
        self.auth.seed_tokens(
            "test_access_token",
            "test_refresh_token",
            chrono::Utc::now() + chrono::Duration::hours(1),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn client_for(server: &mockito::Server) -> (ApiClient, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let ledger = TagLedger::load(dir.path().join("video_tags.csv")).expect("ledger");
        let mut client =
            ApiClient::new(server.url(), "test_key".to_string(), ledger).expect("client");
        client.seed_tokens();
        (client, dir)
    }

    #[tokio::test]
    async fn test_send_parses_json_on_200() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/videos/vi123")
            .match_header("authorization", "Bearer test_access_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"videoId": "vi123", "title": "demo"}"#)
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        let payload = client
            .send(Method::GET, "/videos/vi123", RequestBody::Empty, &[])
            .await
            .expect("request failed")
            .expect("payload expected");

        assert_eq!(payload["videoId"], "vi123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_returns_none_on_empty_204() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/videos/vi123")
            .with_status(204)
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        let payload = client
            .send(Method::DELETE, "/videos/vi123", RequestBody::Empty, &[])
            .await
            .expect("request failed");

        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_send_maps_unexpected_status_to_request_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/videos/missing")
            .with_status(404)
            .with_body(r#"{"title":"The requested resource was not found."}"#)
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        let err = client
            .send(Method::GET, "/videos/missing", RequestBody::Empty, &[])
            .await
            .expect_err("must fail");

        match err {
            ApiError::Request { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_maps_500_to_request_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/videos")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        let err = client
            .send(
                Method::POST,
                "/videos",
                RequestBody::Json(serde_json::json!({"title": "t"})),
                &[],
            )
            .await
            .expect_err("must fail");

        assert!(matches!(err, ApiError::Request { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_send_encodes_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/videos/vi123")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"title": "renamed"}),
            ))
            .with_status(200)
            .with_body(r#"{"videoId": "vi123", "title": "renamed"}"#)
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        client
            .send(
                Method::PATCH,
                "/videos/vi123",
                RequestBody::Json(serde_json::json!({"title": "renamed"})),
                &[],
            )
            .await
            .expect("request failed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_uses_multipart_for_file_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/videos/vi123/source")
            .match_header(
                "content-type",
                mockito::Matcher::Regex("multipart/form-data.*".to_string()),
            )
            .with_status(201)
            .with_body(r#"{"videoId": "vi123"}"#)
            .create_async()
            .await;

        let (mut client, _dir) = client_for(&server);
        let part = FilePart {
            name: "file".to_string(),
            file_name: "clip.mp4".to_string(),
            bytes: vec![0u8; 16],
        };
        let payload = client
            .send(
                Method::POST,
                "/videos/vi123/source",
                RequestBody::Multipart(vec![part]),
                &[],
            )
            .await
            .expect("request failed")
            .expect("payload expected");

        assert_eq!(payload["videoId"], "vi123");
        mock.assert_async().await;
    }
}
