use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

pub const WAV_CONTENT_TYPE: &str = "audio/wav";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Flat directory holding generated audio.
#[derive(Debug, Clone)]
pub struct OutputDir {
    base_path: PathBuf,
}

/// A freshly allocated output file name and its full path.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub filename: String,
    pub path: PathBuf,
}

impl OutputDir {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create the directory (and parents) if absent.
    pub async fn ensure(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Pick a unique `.wav` name inside the directory.
    pub fn allocate(&self) -> OutputFile {
        let filename = output_filename(Utc::now().timestamp());
        let path = self.base_path.join(&filename);
        OutputFile { filename, path }
    }

    /// Path of an existing regular file named `filename`, or `None`.
    ///
    /// Names that are not a single plain path component never resolve.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_filename(filename) {
            return None;
        }

        let path = self.base_path.join(filename);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }
}

/// `output_<unix-seconds>_<8 hex chars>.wav`
pub fn output_filename(timestamp: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("output_{}_{}.wav", timestamp, &suffix[..8])
}

fn is_plain_filename(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Content type served for a stored file.
pub fn content_type_for(filename: &str) -> &'static str {
    let is_wav = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    if is_wav {
        WAV_CONTENT_TYPE
    } else {
        "application/octet-stream"
    }
}

/// Remote object store generated files are published to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file under `key`.
    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Publicly reachable URL of `key`.
    fn public_url(&self, key: &str) -> String;
}

pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build a client for `region` from the default AWS credential chain.
    pub async fn from_env(bucket: String, region: String) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region))
            .load()
            .await;
        Self::new(S3Client::new(&sdk_config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            StorageError::Upload(format!("Failed to read {}: {}", local_path.display(), e))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Upload(format!("S3 upload failed: {}", e)))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }
}

/// Object key for a generated file.
pub fn object_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", prefix, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_has_timestamp_and_hex_suffix() {
        let name = output_filename(1_700_000_000);
        let suffix = name
            .strip_prefix("output_1700000000_")
            .and_then(|rest| rest.strip_suffix(".wav"))
            .unwrap();

        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(output_filename(1_700_000_000), name);
    }

    #[test]
    fn only_plain_names_are_accepted() {
        assert!(is_plain_filename("output_1_deadbeef.wav"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("."));
        assert!(!is_plain_filename("../secret.wav"));
        assert!(!is_plain_filename("nested/file.wav"));
        assert!(!is_plain_filename("..\\secret.wav"));
        assert!(!is_plain_filename("/etc/passwd"));
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("a.wav"), "audio/wav");
        assert_eq!(content_type_for("a.WAV"), "audio/wav");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn object_key_joins_prefix() {
        assert_eq!(object_key("bark-outputs", "a.wav"), "bark-outputs/a.wav");
        assert_eq!(object_key("/bark-outputs/", "a.wav"), "bark-outputs/a.wav");
        assert_eq!(object_key("", "a.wav"), "a.wav");
    }

    #[test]
    fn s3_public_url_format() {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let store = S3Store::new(S3Client::from_conf(conf), "my-bucket".to_string());

        assert_eq!(
            store.public_url("bark-outputs/a.wav"),
            "https://my-bucket.s3.amazonaws.com/bark-outputs/a.wav"
        );
    }

    #[tokio::test]
    async fn resolve_finds_only_existing_files() {
        let base = std::env::temp_dir().join(format!("audiogen-out-{}", Uuid::new_v4()));
        let dir = OutputDir::new(base);
        dir.ensure().await.unwrap();

        let file = dir.allocate();
        assert!(file.path.starts_with(dir.base_path()));
        fs::write(&file.path, b"RIFF").await.unwrap();

        assert_eq!(dir.resolve(&file.filename).await, Some(file.path.clone()));
        assert_eq!(dir.resolve("output_0_00000000.wav").await, None);

        fs::create_dir(dir.base_path().join("subdir")).await.unwrap();
        assert_eq!(dir.resolve("subdir").await, None);

        let _ = fs::remove_dir_all(dir.base_path()).await;
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let base = std::env::temp_dir()
            .join(format!("audiogen-out-{}", Uuid::new_v4()))
            .join("nested");
        let dir = OutputDir::new(&base);

        dir.ensure().await.unwrap();
        dir.ensure().await.unwrap();
        assert!(base.is_dir());

        let _ = fs::remove_dir_all(base.parent().unwrap()).await;
    }
}
