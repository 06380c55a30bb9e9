//! Media storage for project submissions.
//!
//! Files land under `MEDIA_ROOT` at
//! `projects/{subject_type}/{username}/{YYYY-MM-DD_HH-MM-SS}/{filename}`
//! and the relative path is what gets stored in the database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use skillbridge_core::SubjectType;

pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 프로젝트 파일 저장 후 상대 경로 반환
    pub async fn save_project(
        &self,
        subject_type: SubjectType,
        username: &str,
        filename: &str,
        contents: &[u8],
        now: DateTime<Utc>,
    ) -> Result<String> {
        let relative = project_path(subject_type, username, filename, now);
        let absolute = self.root.join(&relative);

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&absolute, contents)
            .await
            .with_context(|| format!("failed to write {}", absolute.display()))?;

        tracing::info!("📁 Project file saved: {} ({} bytes)", relative, contents.len());
        Ok(relative)
    }
}

/// `projects/{subject_type}/{username}/{timestamp}/{filename}`
pub fn project_path(
    subject_type: SubjectType,
    username: &str,
    filename: &str,
    now: DateTime<Utc>,
) -> String {
    format!(
        "projects/{}/{}/{}/{}",
        subject_type.as_str(),
        sanitize_segment(username),
        now.format("%Y-%m-%d_%H-%M-%S"),
        sanitize_filename(filename)
    )
}

/// 경로 구분자 / 상위 디렉터리 참조 제거
fn sanitize_segment(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}

fn sanitize_filename(filename: &str) -> String {
    // 클라이언트가 전체 경로를 보내는 경우 마지막 요소만 사용
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    sanitize_segment(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_project_path_layout() {
        let path = project_path(SubjectType::Midterm, "kim", "report.zip", at());
        assert_eq!(path, "projects/midterm/kim/2025-03-01_14-05-09/report.zip");
    }

    #[test]
    fn test_path_traversal_stripped() {
        let path = project_path(SubjectType::Final, "../kim", "../../etc/passwd", at());
        assert_eq!(path, "projects/final/_kim/2025-03-01_14-05-09/passwd");
        assert!(!path.contains(".."));
    }

    #[test]
    fn test_windows_filename() {
        assert_eq!(sanitize_filename("C:\\Users\\kim\\final.pdf"), "final.pdf");
    }

    #[tokio::test]
    async fn test_save_project_writes_file() {
        let root = std::env::temp_dir().join(format!("skillbridge-media-{}", std::process::id()));
        let storage = MediaStorage::new(&root);

        let relative = tokio_test::assert_ok!(
            storage
                .save_project(SubjectType::Final, "lee", "app.zip", b"PK", at())
                .await
        );

        let written = tokio::fs::read(storage.root().join(&relative)).await.unwrap();
        assert_eq!(written, b"PK");
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
