//! Clip download implementations.

use super::ClipFetcher;
use clipforge_common::{Error, Result};
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Connection timeout for downloads.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads direct URLs with reqwest and TikTok posts with yt-dlp.
pub struct HttpClipFetcher {
    client: reqwest::Client,
}

impl HttpClipFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self { client }
    }
}

impl Default for HttpClipFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClipFetcher for HttpClipFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        // Local paths (uploaded files) are copied rather than fetched
        if !url.starts_with("http://") && !url.starts_with("https://") {
            tokio::fs::copy(url, dest).await.map_err(|e| {
                Error::internal(format!("Failed to copy local file {}: {}", url, e))
            })?;
            return Ok(());
        }

        tracing::debug!(url, dest = %dest.display(), "Downloading clip");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::internal(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::internal(format!(
                "Download of {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| Error::internal(format!("Download stream error: {}", e)))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }

    async fn download_tiktok(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!(url, dest = %dest.display(), "Resolving TikTok post with yt-dlp");

        let output = tokio::process::Command::new("yt-dlp")
            .arg("-f")
            .arg("mp4")
            .arg("-o")
            .arg(dest)
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::internal("yt-dlp is not installed".to_string())
                }
                _ => Error::internal(format!("Failed to run yt-dlp: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr.lines().rev().take(3).collect::<Vec<_>>();
            let tail = tail.into_iter().rev().collect::<Vec<_>>().join(" | ");
            return Err(Error::internal(format!("yt-dlp failed: {}", tail)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_local_file_copies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.mp4");
        let dest = dir.path().join("out.mp4");
        tokio::fs::write(&src, b"fake video").await.unwrap();

        let fetcher = HttpClipFetcher::new();
        fetcher
            .download(src.to_str().unwrap(), &dest)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"fake video");
    }

    #[tokio::test]
    async fn test_download_missing_local_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.mp4");

        let fetcher = HttpClipFetcher::new();
        assert!(fetcher.download("/does/not/exist.mp4", &dest).await.is_err());
    }
}
