//! Document persistence — where finished resume drafts go.
//!
//! Writers take the synthesizer's markup, render it to plain text, and
//! persist the result, returning an artifact reference the user can follow:
//! a filesystem path for local deployments, a presigned GET URL for S3.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::info;

use crate::render::render_markup;

/// Presigned download links stay valid for one hour.
const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write document to disk: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 upload failed: {0}")]
    Upload(String),

    #[error("failed to presign download URL: {0}")]
    Presign(String),
}

/// Renders and persists one finished document. The returned string is the
/// artifact reference stored on the session.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn persist(
        &self,
        markup_text: &str,
        suggested_filename: &str,
    ) -> Result<String, PersistError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Local filesystem writer
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalDocumentWriter {
    output_dir: PathBuf,
}

impl LocalDocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        LocalDocumentWriter {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl DocumentWriter for LocalDocumentWriter {
    async fn persist(
        &self,
        markup_text: &str,
        suggested_filename: &str,
    ) -> Result<String, PersistError> {
        let rendered = render_markup(markup_text);

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(suggested_filename);
        tokio::fs::write(&path, rendered.as_bytes()).await?;

        info!(path = %path.display(), "saved resume document");
        Ok(path.to_string_lossy().into_owned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 writer
// ────────────────────────────────────────────────────────────────────────────

pub struct S3DocumentWriter {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_prefix: String,
}

impl S3DocumentWriter {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, key_prefix: String) -> Self {
        S3DocumentWriter {
            client,
            bucket,
            key_prefix,
        }
    }

    fn object_key(&self, filename: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            filename.to_string()
        } else {
            format!("{prefix}/{filename}")
        }
    }
}

#[async_trait]
impl DocumentWriter for S3DocumentWriter {
    async fn persist(
        &self,
        markup_text: &str,
        suggested_filename: &str,
    ) -> Result<String, PersistError> {
        let rendered = render_markup(markup_text);
        let key = self.object_key(suggested_filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(rendered.into_bytes()))
            .content_type("text/plain; charset=utf-8")
            .send()
            .await
            .map_err(|e| PersistError::Upload(e.to_string()))?;

        info!("uploaded resume to s3://{}/{}", self.bucket, key);

        let presigning = PresigningConfig::expires_in(PRESIGNED_URL_TTL)
            .map_err(|e| PersistError::Presign(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| PersistError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_writer_persists_rendered_text() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalDocumentWriter::new(dir.path());

        let reference = writer
            .persist("# Jane Doe\n- Built an API\n", "resume_test.txt")
            .await
            .unwrap();

        assert!(reference.ends_with("resume_test.txt"));
        let saved = std::fs::read_to_string(&reference).unwrap();
        assert_eq!(saved, "Jane Doe\n========\n• Built an API\n");
    }

    #[tokio::test]
    async fn test_local_writer_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("resumes");
        let writer = LocalDocumentWriter::new(&nested);

        writer.persist("hello", "resume_test.txt").await.unwrap();

        assert!(nested.join("resume_test.txt").exists());
    }

    #[test]
    fn test_s3_key_joins_prefix_and_filename() {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();
        let writer = S3DocumentWriter::new(
            aws_sdk_s3::Client::from_conf(config),
            "resume-bucket".to_string(),
            "resume/".to_string(),
        );
        assert_eq!(writer.object_key("a.txt"), "resume/a.txt");
    }
}
