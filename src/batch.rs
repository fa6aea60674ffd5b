/// アクティビティ一括登録ジョブ
///
/// アクティビティCSV（列: index, activity, title, summary, ...）を読み込み、
/// `index` の `_` より前の部分を動画IDとして行をグループ化し、
/// 各グループをJSON文字列にして動画のメタデータに書き込みます。
/// 動画単位の更新失敗はログに残して次の動画へ進みます
/// （バッチレベルでのみ部分失敗を許容）。
use crate::api::client::ApiClient;
use anyhow::{Context, Result};
use log::{error, info};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// アクティビティCSVの1行
///
/// 列名→値のマップとして保持し、派生キー `type`（activity の小文字）を
/// 追加した形でそのままJSONに書き出す。
pub type ActivityRow = BTreeMap<String, String>;

/// アクティビティCSVを読み込み、動画IDごとにグループ化する
///
/// 動画IDは `index` 列の最初の `_` より前の部分。
/// 各グループ内の行はファイル上の出現順を保つ。
pub fn read_activities(path: &Path) -> Result<HashMap<String, Vec<ActivityRow>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open activities CSV: {}", path.display()))?;

    let mut groups: HashMap<String, Vec<ActivityRow>> = HashMap::new();

    for (i, row) in reader.deserialize::<ActivityRow>().enumerate() {
        let mut row = row.with_context(|| format!("failed to parse activity row {}", i + 1))?;

        let video_id = {
            let index = row
                .get("index")
                .with_context(|| format!("activity row {} is missing the `index` column", i + 1))?;
            index.split('_').next().unwrap_or(index).to_string()
        };

        let activity_type = row
            .get("activity")
            .with_context(|| format!("activity row {} is missing the `activity` column", i + 1))?
            .to_lowercase();
        row.insert("type".to_string(), activity_type);

        groups.entry(video_id).or_default().push(row);
    }

    Ok(groups)
}

/// 各動画のメタデータにアクティビティを書き込む
///
/// 失敗した動画はログに残してスキップする。
///
/// # Returns
/// (更新成功数, 失敗数)
pub async fn push_metadata(
    client: &mut ApiClient,
    groups: HashMap<String, Vec<ActivityRow>>,
) -> (usize, usize) {
    let mut updated = 0;
    let mut failed = 0;

    for (video_id, rows) in groups {
        match update_video_metadata(client, &video_id, &rows).await {
            Ok(()) => {
                updated += 1;
                info!("updated metadata for video {}", video_id);
            }
            Err(e) => {
                failed += 1;
                error!("failed to update metadata for video {}: {:#}", video_id, e);
            }
        }
    }

    (updated, failed)
}

/// 1動画分のアクティビティをJSON文字列にしてメタデータへPATCHする
async fn update_video_metadata(
    client: &mut ApiClient,
    video_id: &str,
    rows: &[ActivityRow],
) -> Result<()> {
    let encoded = serde_json::to_string(rows).context("failed to encode activities as JSON")?;
    let payload = json!({ "metadata": { "activities": encoded } });

    client
        .update_video(video_id, payload)
        .await
        .with_context(|| format!("metadata update for video {} failed", video_id))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagLedger;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("activities.csv");
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(content.as_bytes()).expect("write csv");
        path
    }

    #[test]
    fn test_grouping_by_index_prefix() {
        let dir = tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "index,activity,title,summary\n\
             v1_001,Discussion,Kickoff,First item\n\
             v1_002,Decision,Scope,Second item\n\
             v2_001,Discussion,Retro,Other video\n",
        );

        let groups = read_activities(&path).expect("read failed");

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["v1"].len(), 2);
        assert_eq!(groups["v2"].len(), 1);
        // グループ内はファイル上の順序を保つ
        assert_eq!(groups["v1"][0]["title"], "Kickoff");
        assert_eq!(groups["v1"][1]["title"], "Scope");
    }

    #[test]
    fn test_type_key_is_lowercased_activity() {
        let dir = tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "index,activity,title,summary\n\
             v1_001,DECISION,Scope,Agreed on scope\n",
        );

        let groups = read_activities(&path).expect("read failed");
        let row = &groups["v1"][0];

        assert_eq!(row["type"], "decision");
        // 元の列は保持される
        assert_eq!(row["activity"], "DECISION");
        assert_eq!(row["summary"], "Agreed on scope");
    }

    #[test]
    fn test_quoted_summary_with_commas() {
        let dir = tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "index,activity,title,summary\n\
             v1_001,Discussion,Kickoff,\"Talked about goals, risks, and owners\"\n",
        );

        let groups = read_activities(&path).expect("read failed");
        assert_eq!(
            groups["v1"][0]["summary"],
            "Talked about goals, risks, and owners"
        );
    }

    #[test]
    fn test_index_without_separator_uses_whole_value() {
        let dir = tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "index,activity,title,summary\n\
             v9,Discussion,Solo,No underscore here\n",
        );

        let groups = read_activities(&path).expect("read failed");
        assert_eq!(groups["v9"].len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = read_activities(&dir.path().join("nope.csv")).expect_err("must fail");
        assert!(err.to_string().contains("failed to open activities CSV"));
    }

    #[tokio::test]
    async fn test_push_metadata_continues_past_failures() {
        let mut server = mockito::Server::new_async().await;
        let ok_mock = server
            .mock("PATCH", "/videos/v1")
            .with_status(200)
            .with_body(r#"{"videoId": "v1"}"#)
            .expect(1)
            .create_async()
            .await;
        let fail_mock = server
            .mock("PATCH", "/videos/v2")
            .with_status(500)
            .with_body("internal error")
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().expect("tempdir");
        let ledger = TagLedger::load(dir.path().join("video_tags.csv")).expect("ledger");
        let mut client =
            ApiClient::new(server.url(), "test_key".to_string(), ledger).expect("client");
        client.seed_tokens();

        let mut groups: HashMap<String, Vec<ActivityRow>> = HashMap::new();
        let mut row = ActivityRow::new();
        row.insert("index".to_string(), "v1_001".to_string());
        row.insert("type".to_string(), "discussion".to_string());
        groups.insert("v1".to_string(), vec![row.clone()]);
        groups.insert("v2".to_string(), vec![row]);

        let (updated, failed) = push_metadata(&mut client, groups).await;

        assert_eq!(updated, 1);
        assert_eq!(failed, 1);
        ok_mock.assert_async().await;
        fail_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_metadata_payload_is_json_encoded_string() {
        let mut server = mockito::Server::new_async().await;
        let expected = serde_json::json!({
            "metadata": {
                "activities": "[{\"index\":\"v1_001\",\"type\":\"decision\"}]"
            }
        });
        let mock = server
            .mock("PATCH", "/videos/v1")
            .match_body(mockito::Matcher::Json(expected))
            .with_status(200)
            .with_body(r#"{"videoId": "v1"}"#)
            .create_async()
            .await;

        let dir = tempdir().expect("tempdir");
        let ledger = TagLedger::load(dir.path().join("video_tags.csv")).expect("ledger");
        let mut client =
            ApiClient::new(server.url(), "test_key".to_string(), ledger).expect("client");
        client.seed_tokens();

        let mut row = ActivityRow::new();
        row.insert("index".to_string(), "v1_001".to_string());
        row.insert("type".to_string(), "decision".to_string());

        update_video_metadata(&mut client, "v1", &[row])
            .await
            .expect("update failed");

        mock.assert_async().await;
    }
}
