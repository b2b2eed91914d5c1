//! Published-output storage.

use super::MediaStore;
use clipforge_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Stores published outputs on local disk under a directory that the HTTP
/// layer serves statically.
pub struct LocalMediaStore {
    output_dir: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(output_dir: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            output_dir,
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn publish(&self, job_id: &str, artifact: &Path) -> Result<String> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let file_name = format!("{}.mp4", job_id);
        let dest = self.output_dir.join(&file_name);

        // The artifact sits in a temp workspace that is about to be
        // dropped, so copy instead of rename across filesystems.
        tokio::fs::copy(artifact, &dest).await.map_err(|e| {
            Error::internal(format!("Failed to publish output for {}: {}", job_id, e))
        })?;

        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file_name
        ))
    }

    fn signed_url(&self, _output_url: &str) -> Result<String> {
        // Local outputs are served as plain static files. Callers fall
        // back to the stored URL.
        Err(Error::internal(
            "URL signing is not supported by the local store".to_string(),
        ))
    }
}
