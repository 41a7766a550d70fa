//! Ranking CSV persistence inside a user's ranking folder.

use std::path::Path;

use crate::errors::AppError;
use crate::ranking::table::RankingRow;
use crate::workspace::{FolderKind, UserFolders};

pub const RANKING_PREFIX: &str = "cv_ranking_";

pub fn ranking_file_name(stamp: &str) -> String {
    format!("{RANKING_PREFIX}{stamp}.csv")
}

/// Serializes rows to CSV bytes, header included.
pub fn to_csv(rows: &[RankingRow]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to flush CSV: {e}")))
}

pub fn from_csv(bytes: &[u8]) -> Result<Vec<RankingRow>, AppError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let rows = reader
        .deserialize::<RankingRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Writes `rows` as `cv_ranking_<stamp>.csv` and returns the file name.
pub async fn write_ranking(
    dir: &Path,
    stamp: &str,
    rows: &[RankingRow],
) -> Result<String, AppError> {
    let file_name = ranking_file_name(stamp);
    tokio::fs::write(dir.join(&file_name), to_csv(rows)?).await?;
    Ok(file_name)
}

pub async fn read_ranking(path: &Path) -> Result<Vec<RankingRow>, AppError> {
    let bytes = tokio::fs::read(path).await?;
    from_csv(&bytes)
}

pub async fn list_rankings(folders: &UserFolders) -> Result<Vec<String>, AppError> {
    folders.list(FolderKind::Rankings, RANKING_PREFIX).await
}

/// Name of the newest ranking CSV, if any.
pub async fn latest_ranking(folders: &UserFolders) -> Result<Option<String>, AppError> {
    Ok(list_rankings(folders).await?.into_iter().next())
}

/// Loads the named ranking, or the newest one when `file` is `None`.
/// Returns the file name alongside the rows.
pub async fn load_ranking(
    folders: &UserFolders,
    file: Option<&str>,
) -> Result<(String, Vec<RankingRow>), AppError> {
    let file_name = match file.filter(|f| !f.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => latest_ranking(folders).await?.ok_or_else(|| {
            AppError::NotFound("No ranking is available yet. Analyze some CVs first.".into())
        })?,
    };

    let path = folders.resolve(FolderKind::Rankings, &file_name).await?;
    let rows = read_ranking(&path).await?;
    Ok((file_name, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<RankingRow> {
        vec![
            RankingRow {
                name: "José, \"Pepe\" Díaz".into(),
                score: Some(91.5),
                skills: "Rust, SQL".into(),
                experience: "Dev - Acme (2); Lead - Beta (1)".into(),
                pdf: "Jose_Pepe_Diaz_analysis_20240101.pdf".into(),
                ..RankingRow::unreadable("x")
            },
            RankingRow::unreadable("scan.pdf"),
        ]
    }

    #[test]
    fn test_csv_round_trip_keeps_rows() {
        let rows = sample_rows();
        let bytes = to_csv(&rows).unwrap();
        assert_eq!(from_csv(&bytes).unwrap(), rows);
    }

    #[test]
    fn test_csv_has_header_and_empty_missing_score() {
        let bytes = to_csv(&[RankingRow::unreadable("scan.pdf")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("name,score,industry"));
        assert!(lines.next().unwrap().starts_with("scan.pdf,,N/A"));
    }

    #[tokio::test]
    async fn test_load_latest_and_named() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        let old = vec![RankingRow::unreadable("old.pdf")];
        let new = sample_rows();
        write_ranking(&folders.rankings, "20240101000000", &old).await.unwrap();
        let newest = write_ranking(&folders.rankings, "20250101000000", &new)
            .await
            .unwrap();

        let (name, rows) = load_ranking(&folders, None).await.unwrap();
        assert_eq!(name, newest);
        assert_eq!(rows, new);

        let (_, rows) = load_ranking(&folders, Some("cv_ranking_20240101000000.csv"))
            .await
            .unwrap();
        assert_eq!(rows, old);
    }

    #[tokio::test]
    async fn test_load_without_rankings_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        let err = load_ranking(&folders, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
