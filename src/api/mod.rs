//! api.video APIクライアントモジュール
//!
//! api.video (https://ws.api.video) との通信を担当します。
//! - auth: APIキーによる認証とベアラートークンの更新
//! - client: 共通リクエストディスパッチャ（JSON / multipart）
//! - endpoints: リソース別のエンドポイントファサード
//! - types: レスポンスのデシリアライズ用型
//! - error: API層のエラー定義

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;
