//! api.video クライアントライブラリ
//!
//! api.video REST API (https://ws.api.video) の薄いクライアント。
//! APIキー認証とベアラートークンの自動更新、リソース別のCRUDラッパー、
//! list_videos の副作用として動作するタグ台帳、アクティビティCSVの
//! 一括登録ジョブを提供します。
//!
//! 直列利用が前提で、リトライ・ページネーション・同時リクエストは
//! 扱いません。

pub mod api;
pub mod batch;
pub mod config;
pub mod error_severity;
pub mod tags;
