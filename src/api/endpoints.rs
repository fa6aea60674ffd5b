/// エンドポイントファサード
///
/// リソースと操作の組み合わせごとに1メソッドを公開します。
/// 各メソッドはパスに識別子を埋め込んでディスパッチャに委譲するだけの
/// 薄いラッパーで、ペイロードは serde_json::Value をそのまま受け渡します。
/// list_videos のみタグ台帳への記録という副作用を持ちます。
use crate::api::client::{ApiClient, ApiResult, FilePart, RequestBody};
use crate::api::types::VideoPage;
use crate::tags::LedgerError;
use reqwest::Method;
use serde_json::Value;
use std::path::Path;

/// タグによる動画絞り込み条件
///
/// 単一のタグ名もタグ名リストも同じように扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    Single(String),
    Many(Vec<String>),
}

impl TagFilter {
    /// 絞り込みに使うタグ名のリストへ正規化する
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::Single(tag) => vec![tag],
            Self::Many(tags) => tags,
        }
    }
}

impl From<&str> for TagFilter {
    fn from(tag: &str) -> Self {
        Self::Single(tag.to_string())
    }
}

impl From<String> for TagFilter {
    fn from(tag: String) -> Self {
        Self::Single(tag)
    }
}

impl From<Vec<String>> for TagFilter {
    fn from(tags: Vec<String>) -> Self {
        Self::Many(tags)
    }
}

impl From<Vec<&str>> for TagFilter {
    fn from(tags: Vec<&str>) -> Self {
        Self::Many(tags.into_iter().map(str::to_string).collect())
    }
}

// Video endpoints
impl ApiClient {
    /// 動画一覧を取得する
    ///
    /// 副作用: 返された項目のうち `videoId` と `tags` の両方を持つものは
    /// タグ台帳に記録される。
    pub async fn list_videos(&mut self, query: &[(String, String)]) -> ApiResult<Option<Value>> {
        let videos = self
            .send(Method::GET, "/videos", RequestBody::Empty, query)
            .await?;

        if let Some(payload) = &videos {
            self.record_listed_tags(payload)?;
        }

        Ok(videos)
    }

    /// 一覧レスポンスの項目からタグを台帳に記録する
    ///
    /// 想定外の形のペイロードは黙って無視する（一覧APIの契約外のため）。
    fn record_listed_tags(&mut self, payload: &Value) -> Result<(), LedgerError> {
        let Ok(page) = serde_json::from_value::<VideoPage>(payload.clone()) else {
            return Ok(());
        };

        for item in page.data {
            if let (Some(video_id), Some(tags)) = (item.video_id, item.tags) {
                self.ledger.record_tags(&video_id, &tags)?;
            }
        }

        Ok(())
    }

    pub async fn create_video(&mut self, data: Value) -> ApiResult<Option<Value>> {
        self.send(Method::POST, "/videos", RequestBody::Json(data), &[])
            .await
    }

    pub async fn get_video(&mut self, video_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/videos/{}", video_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    pub async fn update_video(&mut self, video_id: &str, data: Value) -> ApiResult<Option<Value>> {
        self.send(
            Method::PATCH,
            &format!("/videos/{}", video_id),
            RequestBody::Json(data),
            &[],
        )
        .await
    }

    pub async fn delete_video(&mut self, video_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/videos/{}", video_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    /// 動画ソースをアップロードする（multipart）
    pub async fn upload_video(&mut self, video_id: &str, file_path: &Path) -> ApiResult<Option<Value>> {
        let part = FilePart::from_path(file_path).await?;
        self.send(
            Method::POST,
            &format!("/videos/{}/source", video_id),
            RequestBody::Multipart(vec![part]),
            &[],
        )
        .await
    }
}

// Live stream endpoints
impl ApiClient {
    pub async fn create_live_stream(&mut self, data: Value) -> ApiResult<Option<Value>> {
        self.send(Method::POST, "/live-streams", RequestBody::Json(data), &[])
            .await
    }

    pub async fn get_live_stream(&mut self, live_stream_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/live-streams/{}", live_stream_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    pub async fn update_live_stream(
        &mut self,
        live_stream_id: &str,
        data: Value,
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::PATCH,
            &format!("/live-streams/{}", live_stream_id),
            RequestBody::Json(data),
            &[],
        )
        .await
    }

    pub async fn delete_live_stream(&mut self, live_stream_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/live-streams/{}", live_stream_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }
}

// Player endpoints
impl ApiClient {
    pub async fn create_player(&mut self, data: Value) -> ApiResult<Option<Value>> {
        self.send(Method::POST, "/players", RequestBody::Json(data), &[])
            .await
    }

    pub async fn get_player(&mut self, player_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/players/{}", player_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    pub async fn update_player(&mut self, player_id: &str, data: Value) -> ApiResult<Option<Value>> {
        self.send(
            Method::PATCH,
            &format!("/players/{}", player_id),
            RequestBody::Json(data),
            &[],
        )
        .await
    }

    pub async fn delete_player(&mut self, player_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/players/{}", player_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }
}

// Caption endpoints
impl ApiClient {
    pub async fn upload_caption(
        &mut self,
        video_id: &str,
        language: &str,
        file_path: &Path,
    ) -> ApiResult<Option<Value>> {
        let part = FilePart::from_path(file_path).await?;
        self.send(
            Method::POST,
            &format!("/videos/{}/captions/{}", video_id, language),
            RequestBody::Multipart(vec![part]),
            &[],
        )
        .await
    }

    pub async fn get_caption(&mut self, video_id: &str, language: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/videos/{}/captions/{}", video_id, language),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    pub async fn update_caption(
        &mut self,
        video_id: &str,
        language: &str,
        data: Value,
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::PATCH,
            &format!("/videos/{}/captions/{}", video_id, language),
            RequestBody::Json(data),
            &[],
        )
        .await
    }

    pub async fn delete_caption(
        &mut self,
        video_id: &str,
        language: &str,
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/videos/{}/captions/{}", video_id, language),
            RequestBody::Empty,
            &[],
        )
        .await
    }
}

// Chapter endpoints
impl ApiClient {
    pub async fn upload_chapter(
        &mut self,
        video_id: &str,
        language: &str,
        file_path: &Path,
    ) -> ApiResult<Option<Value>> {
        let part = FilePart::from_path(file_path).await?;
        self.send(
            Method::POST,
            &format!("/videos/{}/chapters/{}", video_id, language),
            RequestBody::Multipart(vec![part]),
            &[],
        )
        .await
    }

    pub async fn get_chapter(&mut self, video_id: &str, language: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/videos/{}/chapters/{}", video_id, language),
            RequestBody::Empty,
            &[],
        )
        .await
    }

    pub async fn delete_chapter(
        &mut self,
        video_id: &str,
        language: &str,
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/videos/{}/chapters/{}", video_id, language),
            RequestBody::Empty,
            &[],
        )
        .await
    }
}

// Watermark endpoints
impl ApiClient {
    pub async fn upload_watermark(&mut self, file_path: &Path) -> ApiResult<Option<Value>> {
        let part = FilePart::from_path(file_path).await?;
        self.send(
            Method::POST,
            "/watermarks",
            RequestBody::Multipart(vec![part]),
            &[],
        )
        .await
    }

    pub async fn delete_watermark(&mut self, watermark_id: &str) -> ApiResult<Option<Value>> {
        self.send(
            Method::DELETE,
            &format!("/watermarks/{}", watermark_id),
            RequestBody::Empty,
            &[],
        )
        .await
    }
}

// Analytics endpoints
impl ApiClient {
    pub async fn video_analytics(
        &mut self,
        video_id: &str,
        query: &[(String, String)],
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/analytics/videos/{}", video_id),
            RequestBody::Empty,
            query,
        )
        .await
    }

    pub async fn live_stream_analytics(
        &mut self,
        live_stream_id: &str,
        query: &[(String, String)],
    ) -> ApiResult<Option<Value>> {
        self.send(
            Method::GET,
            &format!("/analytics/live-streams/{}", live_stream_id),
            RequestBody::Empty,
            query,
        )
        .await
    }
}

// Helper endpoints
impl ApiClient {
    /// タグで動画を絞り込む
    ///
    /// 単一のタグ名を渡しても、1要素のリストを渡しても同じ結果になる。
    pub async fn videos_for_person(
        &mut self,
        filter: impl Into<TagFilter>,
    ) -> ApiResult<Option<Value>> {
        let query: Vec<(String, String)> = filter
            .into()
            .into_tags()
            .into_iter()
            .map(|tag| ("tags".to_string(), tag))
            .collect();

        self.list_videos(&query).await
    }
}
