/// タグ台帳
///
/// どの (video_id, tag) ペアを既に記録したかを保持する永続レコード。
/// 起動時に一度だけCSVファイルから読み込み、新しいペアのみを
/// 追記します。ファイルは書き換えも削除もしない追記専用ログで、
/// ディスク上の内容は常にメモリ上の集合の整合的なログになります。
///
/// 単一ライター前提: 台帳は1プロセス内の1インスタンスが直列に使う。
/// 複数プロセスからの同時書き込みは契約外。
use crate::error_severity::ErrorSeverity;
use log::info;
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 台帳ファイルのヘッダー行
const LEDGER_HEADER: [&str; 2] = ["video_id", "tag"];

/// タグ台帳のエラー定義
#[derive(Error, Debug)]
pub enum LedgerError {
    /// 台帳ファイルのI/Oエラー
    #[error("ledger file I/O error: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 台帳ファイルのCSVエラー
    #[error("ledger file CSV error: {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl LedgerError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::SystemError
    }
}

/// タグ台帳
pub struct TagLedger {
    path: PathBuf,
    entries: HashMap<String, HashSet<String>>,
}

impl TagLedger {
    /// 台帳をファイルから読み込む
    ///
    /// ファイルが存在しない場合は空の台帳として扱う（エラーではない）。
    /// ヘッダー行はスキップされる。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let mut entries: HashMap<String, HashSet<String>> = HashMap::new();

        if path.is_file() {
            let mut reader =
                csv::Reader::from_path(&path).map_err(|e| LedgerError::csv(&path, e))?;
            for record in reader.records() {
                let record = record.map_err(|e| LedgerError::csv(&path, e))?;
                entries
                    .entry(record[0].to_string())
                    .or_default()
                    .insert(record[1].to_string());
            }
        }

        Ok(Self { path, entries })
    }

    /// 動画のタグを記録する
    ///
    /// まだ記録されていない (video_id, tag) ペアのみ、1ペア1行で
    /// ファイルに追記し、メモリ上の集合に追加する。既知のペアの
    /// 再記録は何も行わない（冪等）。
    ///
    /// # Returns
    /// 新しいタグが1つでも追加されたかどうか
    pub fn record_tags(&mut self, video_id: &str, tags: &[String]) -> Result<bool, LedgerError> {
        let known = self.entries.entry(video_id.to_string()).or_default();
        let mut added = false;

        for tag in tags {
            if known.contains(tag) {
                continue;
            }
            Self::append_row(&self.path, video_id, tag)?;
            known.insert(tag.clone());
            added = true;
        }

        if added {
            info!("new tags added for video {}", video_id);
        } else {
            info!("no new tags for video {}", video_id);
        }

        Ok(added)
    }

    /// 1行をファイルに追記する
    ///
    /// ファイルは書き込みごとに開いて閉じる。新規作成時のみ
    /// ヘッダー行を先に書く。
    fn append_row(path: &Path, video_id: &str, tag: &str) -> Result<(), LedgerError> {
        let is_new_file = !path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LedgerError::io(path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new_file {
            writer
                .write_record(LEDGER_HEADER)
                .map_err(|e| LedgerError::csv(path, e))?;
        }
        writer
            .write_record([video_id, tag])
            .map_err(|e| LedgerError::csv(path, e))?;
        writer.flush().map_err(|e| LedgerError::io(path, e))?;

        Ok(())
    }

    /// 動画の既知タグ集合を返す
    pub fn tags_for(&self, video_id: &str) -> Option<&HashSet<String>> {
        self.entries.get(video_id)
    }

    /// 記録済みの動画数を返す
    pub fn video_count(&self) -> usize {
        self.entries.len()
    }
}
