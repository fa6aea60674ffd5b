/// アプリケーション設定モジュール
///
/// ビルド時に config.toml から読み込まれる静的設定を管理します。
/// これらの設定は実行時には変更できません。
use serde::Deserialize;
use std::sync::LazyLock;

/// ビルド時に埋め込まれたアプリケーション設定
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::load);

/// アプリケーション全体の設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub ledger: LedgerConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

/// API関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// api.video API のベースURL
    pub endpoint: String,

    /// APIリクエストのタイムアウト(秒)
    pub timeout_seconds: u64,
}

/// タグ台帳関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// 台帳ファイルのパス
    pub file_path: String,
}

/// バッチジョブ関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// アクティビティCSVの入力パス
    pub csv_path: String,
}

/// ロギング関連の設定
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// デフォルトのログレベル (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// ビルド時に埋め込まれたconfig.tomlから設定を読み込む
    ///
    /// # Panics
    /// 設定ファイルのパースに失敗した場合はパニックします。
    /// これはビルド時設定なので、実行時エラーではなくビルドの誤りとして扱います。
    fn load() -> Self {
        const CONFIG_STR: &str = include_str!("../../config.toml");
        toml::from_str(CONFIG_STR)
            .expect("Failed to parse embedded config.toml. This is a build-time configuration error.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_loads() {
        assert_eq!(APP_CONFIG.api.endpoint, "https://ws.api.video");
        assert_eq!(APP_CONFIG.api.timeout_seconds, 30);
        assert!(!APP_CONFIG.ledger.file_path.is_empty());
        assert!(!APP_CONFIG.batch.csv_path.is_empty());
        assert!(!APP_CONFIG.logging.level.is_empty());
    }
}
