use anyhow::{Context, Result};
use apivid::api::client::ApiClient;
use apivid::api::error::ApiError;
use apivid::batch;
use apivid::config::error::ConfigError;
use apivid::config::{APP_CONFIG, UserConfig};
use apivid::tags::{LedgerError, TagLedger};
use log::info;
use std::path::Path;

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .parse_filters(&APP_CONFIG.logging.level)
        .parse_default_env()
        .init();

    if let Err(e) = run().await {
        handle_error(e);
    }
}

/// バッチジョブのメイン処理
///
/// 固定パスのアクティビティCSVを読み込み、動画ごとにグループ化して
/// メタデータへ書き込む。CLI引数は取らない。
async fn run() -> Result<()> {
    let user_config = UserConfig::load()
        .context("Failed to load user configuration. Please check your config.toml file.")?;

    let auth = user_config.get_auth().context(
        "API key not configured. Add an [auth] section with api_key to the user config file.",
    )?;

    let ledger = TagLedger::load(&APP_CONFIG.ledger.file_path)
        .context("Failed to load the tag ledger")?;

    let mut client = ApiClient::production(auth.api_key.clone(), ledger)
        .context("Failed to create API client")?;

    client
        .authenticate()
        .await
        .context("Authentication against api.video failed")?;

    let groups = batch::read_activities(Path::new(&APP_CONFIG.batch.csv_path))
        .context("Failed to read the activities CSV")?;

    info!("pushing activity metadata for {} videos", groups.len());
    let (updated, failed) = batch::push_metadata(&mut client, groups).await;
    info!("batch finished: {} updated, {} failed", updated, failed);

    Ok(())
}

/// エラーハンドリングとユーザーへの表示
///
/// anyhow::Error から元のエラー型を downcast して、
/// エラーの種類に応じた exit code とメッセージを決定する。
fn handle_error(error: anyhow::Error) {
    eprintln!("Error: {}", error);

    // エラーチェーンを辿って詳細を表示
    let chain: Vec<_> = error.chain().skip(1).collect();
    if !chain.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            eprintln!("  {}: {}", i + 1, cause);
        }
    }

    let exit_code = determine_exit_code(&error);

    if let Some(hint) = get_error_hint(&error) {
        eprintln!("\nHint: {}", hint);
    }

    std::process::exit(exit_code);
}

/// エラーチェーンから適切な終了コードを決定
fn determine_exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            return api_err.severity().exit_code();
        }

        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_err.severity().exit_code();
        }

        if let Some(ledger_err) = cause.downcast_ref::<LedgerError>() {
            return ledger_err.severity().exit_code();
        }
    }

    // 不明なエラーの場合はデフォルトの終了コード
    1
}

/// エラーに対するユーザー向けヒントを取得
fn get_error_hint(error: &anyhow::Error) -> Option<String> {
    for cause in error.chain() {
        if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            if let Some(hint) = api_err.hint() {
                return Some(hint.to_string());
            }
        }

        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            if let Some(hint) = config_err.hint() {
                return Some(hint.to_string());
            }
        }
    }

    None
}
