//! Directory upload
//!
//! Mirrors a local directory tree into a bucket. Every regular file becomes
//! one object whose key is the prefix plus the file's path relative to the
//! root, always `/`-separated. Directories are traversed, never uploaded.

use crate::content_type;
use crate::error::{CloudError, Result, UploadError};
use crate::provider::{ObjectStorage, PutObject};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Metadata key duplicating the content type on the stored object
pub const CONTENT_TYPE_METADATA_KEY: &str = "Content-Type";

/// A file scheduled for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEntry {
    pub local_path: PathBuf,
    pub key: String,
}

/// Every regular file under a root, with its remote key
#[derive(Debug, Clone, Default)]
pub struct UploadPlan {
    pub entries: Vec<UploadEntry>,
}

impl UploadPlan {
    pub fn from_dir(root: &Path, prefix: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(CloudError::SiteDirNotFound(root.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| CloudError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let local_path = entry.into_path();
            let key = remote_key(prefix, root, &local_path);
            entries.push(UploadEntry { local_path, key });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `prefix` followed by `path` relative to `root`, joined with `/`
pub fn remote_key(prefix: &str, root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    format!("{prefix}{}", parts.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    pub key: String,
    pub error: String,
}

/// Outcome of a directory upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedObject>,
    pub failed: Vec<FailedUpload>,
    /// Total upload time in milliseconds
    pub duration_ms: u64,
}

impl UploadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn add_success(&mut self, key: String, content_type: String) {
        self.uploaded.push(UploadedObject { key, content_type });
    }

    pub fn add_failure(&mut self, key: String, error: String) {
        self.failed.push(FailedUpload { key, error });
    }
}

pub struct DirectoryUploader {
    storage: Arc<dyn ObjectStorage>,
}

impl DirectoryUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Upload every file under `root`
    ///
    /// Only a missing root or an unreadable tree is fatal; individual file
    /// failures are logged and collected in the report.
    pub async fn upload_directory(
        &self,
        bucket: &str,
        prefix: &str,
        root: &Path,
    ) -> Result<UploadReport> {
        let start = Instant::now();
        let plan = UploadPlan::from_dir(root, prefix)?;
        tracing::info!("Uploading {} files from {} to {}", plan.len(), root.display(), bucket);

        let mut report = UploadReport::new();
        for entry in plan.entries {
            match self.upload_file(bucket, &entry.key, &entry.local_path).await {
                Ok(content_type) => report.add_success(entry.key, content_type),
                Err(e) => {
                    tracing::warn!(bucket = bucket, key = %entry.key, "Upload failed: {}", e);
                    report.add_failure(entry.key, e.to_string());
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Upload one file, returning the content type it was stored with
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> std::result::Result<String, UploadError> {
        // Stored without parameters: `text/html`, not `text/html; charset=utf-8`
        let content_type = content_type::detect_file(local_path)
            .await
            .map_err(|source| UploadError::Read {
                path: local_path.to_path_buf(),
                source,
            })?
            .essence_str()
            .to_string();

        let metadata = HashMap::from([(
            CONTENT_TYPE_METADATA_KEY.to_string(),
            content_type.clone(),
        )]);
        self.storage
            .put_object(PutObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
                path: local_path.to_path_buf(),
                content_type: content_type.clone(),
                metadata,
            })
            .await?;

        tracing::info!("Uploaded {} ({})", key, content_type);
        Ok(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeCloud};
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::create_dir_all(root.join("posts/2017/hello")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("index.html"), "<!DOCTYPE html><html></html>").unwrap();
        fs::write(root.join("css/site.css"), "body { margin: 0 }").unwrap();
        fs::write(
            root.join("posts/2017/hello/index.html"),
            "<html><body>hi</body></html>",
        )
        .unwrap();
        fs::write(root.join("logo.png"), b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
        dir
    }

    #[test]
    fn test_remote_key() {
        let root = Path::new("/site/public");
        assert_eq!(
            remote_key("", root, Path::new("/site/public/index.html")),
            "index.html"
        );
        assert_eq!(
            remote_key("blog/", root, Path::new("/site/public/a/b/c.txt")),
            "blog/a/b/c.txt"
        );
    }

    #[test]
    fn test_plan_skips_directories() {
        let dir = site();
        let plan = UploadPlan::from_dir(dir.path(), "").unwrap();

        let keys: Vec<_> = plan.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "css/site.css",
                "index.html",
                "logo.png",
                "posts/2017/hello/index.html",
            ]
        );
    }

    #[test]
    fn test_plan_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = UploadPlan::from_dir(&dir.path().join("public"), "").unwrap_err();
        assert!(matches!(err, CloudError::SiteDirNotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_directory_one_call_per_file() {
        let dir = site();
        let cloud = FakeCloud::new();
        let uploader = DirectoryUploader::new(cloud.storage());

        let report = uploader
            .upload_directory("example-site", "", dir.path())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.uploaded.len(), 4);
        let puts = cloud
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::PutObject(_)))
            .count();
        assert_eq!(puts, 4);
    }

    #[tokio::test]
    async fn test_upload_sets_content_type_and_metadata() {
        let dir = site();
        let cloud = FakeCloud::new();
        let uploader = DirectoryUploader::new(cloud.storage());

        uploader
            .upload_directory("example-site", "", dir.path())
            .await
            .unwrap();

        let objects = cloud.objects();
        let find = |key: &str| objects.iter().find(|o| o.key == key).unwrap().clone();

        let index = find("index.html");
        assert_eq!(index.bucket, "example-site");
        assert_eq!(index.content_type, "text/html");
        assert_eq!(
            index.metadata.get(CONTENT_TYPE_METADATA_KEY).map(String::as_str),
            Some("text/html")
        );

        assert_eq!(find("posts/2017/hello/index.html").content_type, "text/html");
        assert_eq!(find("css/site.css").content_type, "text/css");
        assert_eq!(find("logo.png").content_type, "image/png");
    }

    #[tokio::test]
    async fn test_failed_file_does_not_stop_upload() {
        let dir = site();
        let cloud = FakeCloud::new().fail_upload("index.html");
        let uploader = DirectoryUploader::new(cloud.storage());

        let report = uploader
            .upload_directory("example-site", "", dir.path())
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].key, "index.html");
        assert_eq!(report.uploaded.len(), 3);
        assert_eq!(report.total(), 4);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_per_file_failure() {
        let dir = TempDir::new().unwrap();
        let cloud = FakeCloud::new();
        let uploader = DirectoryUploader::new(cloud.storage());

        let err = uploader
            .upload_file("example-site", "gone.html", &dir.path().join("gone.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));
        assert!(cloud.calls().is_empty());
    }
}
