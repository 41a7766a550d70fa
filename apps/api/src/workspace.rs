//! Per-user file namespace.
//!
//! Layout under the data dir:
//! ```text
//! <data_dir>/users.json
//! <data_dir>/<user>/uploads/   uploaded CVs
//! <data_dir>/<user>/results/   per-candidate PDF reports
//! <data_dir>/<user>/reports/   global comparison reports
//! <data_dir>/<user>/ranking/   ranking CSVs
//! ```

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use unicode_normalization::UnicodeNormalization;

use crate::errors::AppError;

const MAX_SANITIZED_LEN: usize = 50;

/// The downloadable folders of a user namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Results,
    Reports,
    Rankings,
}

impl FolderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderKind::Results => "results",
            FolderKind::Reports => "reports",
            FolderKind::Rankings => "rankings",
        }
    }
}

impl std::str::FromStr for FolderKind {
    type Err = AppError;

    /// Parses the `/download/:kind` segment. Unknown kinds are `NotFound`.
    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "results" => Ok(FolderKind::Results),
            "reports" => Ok(FolderKind::Reports),
            "rankings" => Ok(FolderKind::Rankings),
            _ => Err(AppError::NotFound("File not found.".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserFolders {
    pub upload: PathBuf,
    pub results: PathBuf,
    pub reports: PathBuf,
    pub rankings: PathBuf,
}

impl UserFolders {
    /// Returns the folders of `username`, creating any that are missing.
    pub async fn ensure(data_dir: &Path, username: &str) -> Result<Self, AppError> {
        if sanitize_filename(username) != username || username.is_empty() {
            return Err(AppError::Validation(format!("Invalid user name '{username}'")));
        }

        let root = data_dir.join(username);
        let folders = Self {
            upload: root.join("uploads"),
            results: root.join("results"),
            reports: root.join("reports"),
            rankings: root.join("ranking"),
        };

        for dir in [
            &folders.upload,
            &folders.results,
            &folders.reports,
            &folders.rankings,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }

        Ok(folders)
    }

    pub fn dir(&self, kind: FolderKind) -> &Path {
        match kind {
            FolderKind::Results => &self.results,
            FolderKind::Reports => &self.reports,
            FolderKind::Rankings => &self.rankings,
        }
    }

    /// Resolves a plain file name inside `kind`. Anything that could escape the folder
    /// (separators, `..`, hidden names) or does not exist is `NotFound`.
    pub async fn resolve(&self, kind: FolderKind, file_name: &str) -> Result<PathBuf, AppError> {
        if !is_plain_file_name(file_name) {
            return Err(AppError::NotFound("File not found.".to_string()));
        }

        let path = self.dir(kind).join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(AppError::NotFound("File not found.".to_string())),
        }
    }

    /// Writes an uploaded CV under a sanitized `.pdf` name and returns that name. A name
    /// already taken gets a `_2`, `_3`, ... suffix.
    pub async fn store_upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let stem = Path::new(original_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let mut stem = sanitize_filename(stem);
        if stem.is_empty() {
            stem = "cv".to_string();
        }

        let mut stored = format!("{stem}.pdf");
        let mut n = 2;
        loop {
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.upload.join(&stored))
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(stored);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    stored = format!("{stem}_{n}.pdf");
                    n += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// File names in `kind` that start with `prefix`, newest first (names embed a sortable
    /// timestamp).
    pub async fn list(&self, kind: FolderKind, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(self.dir(kind)).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

/// Strips a string down to a safe file-name fragment: NFKD-folded to ASCII, spaces become
/// `_`, everything outside `[A-Za-z0-9_-]` is dropped, capped at 50 characters.
pub fn sanitize_filename(name: &str) -> String {
    name.nfkd()
        .filter(|c| c.is_ascii())
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_SANITIZED_LEN)
        .collect()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_accents_and_spaces() {
        assert_eq!(sanitize_filename("José Pérez"), "Jose_Perez");
        assert_eq!(sanitize_filename("Ñandú-Ólafsson"), "Nandu-Olafsson");
    }

    #[test]
    fn test_sanitize_drops_punctuation_and_dots() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("Dr. A. Smith (CV)"), "Dr_A_Smith_CV");
    }

    #[test]
    fn test_sanitize_truncates_to_50() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_filename(&long).len(), 50);
    }

    #[test]
    fn test_folder_kind_from_segment() {
        assert_eq!("reports".parse::<FolderKind>().unwrap(), FolderKind::Reports);
        assert_eq!(
            FolderKind::Rankings.as_str().parse::<FolderKind>().unwrap(),
            FolderKind::Rankings
        );
        assert!(matches!("uploads".parse::<FolderKind>(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_plain_file_name_rules() {
        assert!(is_plain_file_name("cv_ranking_20240101120000.csv"));
        assert!(!is_plain_file_name("../users.json"));
        assert!(!is_plain_file_name("a/b.pdf"));
        assert!(!is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name(""));
    }

    #[tokio::test]
    async fn test_ensure_creates_all_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        for dir in [&folders.upload, &folders.results, &folders.reports, &folders.rankings] {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
        assert!(folders.results.starts_with(tmp.path().join("alice")));
    }

    #[tokio::test]
    async fn test_ensure_rejects_unsafe_user_name() {
        let tmp = tempfile::tempdir().unwrap();
        let result = UserFolders::ensure(tmp.path(), "../bob").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_resolve_only_finds_existing_plain_files() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        tokio::fs::write(folders.reports.join("global_report_1.pdf"), b"%PDF")
            .await
            .unwrap();

        assert!(folders
            .resolve(FolderKind::Reports, "global_report_1.pdf")
            .await
            .is_ok());
        assert!(matches!(
            folders.resolve(FolderKind::Reports, "missing.pdf").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            folders.resolve(FolderKind::Reports, "../../users.json").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_upload_sanitizes_name() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        let stored = folders
            .store_upload("Currículum Ana.PDF", b"%PDF-1.4")
            .await
            .unwrap();
        assert_eq!(stored, "Curriculum_Ana.pdf");
        assert!(folders.upload.join(&stored).is_file());
    }

    #[tokio::test]
    async fn test_store_upload_keeps_colliding_names_apart() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        let first = folders.store_upload("CV (1).pdf", b"first").await.unwrap();
        let second = folders.store_upload("CV 1.pdf", b"second").await.unwrap();
        let third = folders.store_upload("CV_1.pdf", b"third").await.unwrap();

        assert_eq!(first, "CV_1.pdf");
        assert_eq!(second, "CV_1_2.pdf");
        assert_eq!(third, "CV_1_3.pdf");
        assert_eq!(std::fs::read(folders.upload.join(&first)).unwrap(), b"first");
        assert_eq!(std::fs::read(folders.upload.join(&second)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = UserFolders::ensure(tmp.path(), "alice").await.unwrap();
        for name in ["cv_ranking_20240101.csv", "cv_ranking_20250101.csv", "other.csv"] {
            tokio::fs::write(folders.rankings.join(name), b"").await.unwrap();
        }
        let names = folders.list(FolderKind::Rankings, "cv_ranking_").await.unwrap();
        assert_eq!(names, vec!["cv_ranking_20250101.csv", "cv_ranking_20240101.csv"]);
    }
}
