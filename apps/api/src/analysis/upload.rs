//! Request-scoped staging of uploaded résumés.
//!
//! A `StagedUpload` owns a `NamedTempFile`; dropping it removes the file, so
//! every exit path of a request cleans up after itself.

use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;

const DEFAULT_FILE_NAME: &str = "resume.pdf";
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    file_name: String,
    content_type: String,
    size: u64,
}

impl StagedUpload {
    /// Streams a multipart field into a fresh temporary file under `dir`.
    ///
    /// `max_bytes` is the request body limit, reported back when the body overruns it.
    pub async fn from_field(
        mut field: Field<'_>,
        dir: &Path,
        max_bytes: usize,
    ) -> Result<Self, AppError> {
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)
            .map_err(|e| anyhow::anyhow!("Failed to stage upload in {}: {e}", dir.display()))?;

        let mut out = tokio::fs::File::from_std(
            file.reopen()
                .map_err(|e| anyhow::anyhow!("Failed to open staged upload: {e}"))?,
        );
        let mut size = 0u64;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| {
                if is_too_large(&e) {
                    too_large(max_bytes)
                } else {
                    AppError::invalid_field("file", format!("Malformed upload: {e}"))
                }
            })?
        {
            out.write_all(&chunk)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to write staged upload: {e}"))?;
            size += chunk.len() as u64;
        }
        out.flush()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to flush staged upload: {e}"))?;

        Ok(Self {
            file,
            file_name,
            content_type,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The client-supplied file name. Never used as a filesystem path.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[cfg(test)]
    pub async fn from_bytes(
        bytes: &[u8],
        file_name: &str,
        dir: &Path,
    ) -> Result<Self, AppError> {
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)
            .map_err(|e| anyhow::anyhow!("Failed to stage upload in {}: {e}", dir.display()))?;
        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write staged upload: {e}"))?;

        Ok(Self {
            file,
            file_name: file_name.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            size: bytes.len() as u64,
        })
    }
}

/// True when the multipart stream was cut off by the body limit.
pub fn is_too_large(err: &MultipartError) -> bool {
    err.status() == StatusCode::PAYLOAD_TOO_LARGE
}

pub fn too_large(max_bytes: usize) -> AppError {
    AppError::invalid_field(
        "file",
        format!("File exceeds the {max_bytes}-byte upload limit"),
    )
}
