//! Remote clip-generation API client.
//!
//! Submits a render request, polls until the clip is ready, then downloads
//! the result. The API contract is submit/poll/fetch over JSON.

use super::{ClipFetcher, GenerationService, HttpClipFetcher};
use crate::config::GenerationConfig;
use clipforge_common::{Error, Result, VideoGenConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub struct HttpGenerationService {
    client: reqwest::Client,
    config: GenerationConfig,
    fetcher: HttpClipFetcher,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    video_url: Option<String>,
    error: Option<String>,
}

impl HttpGenerationService {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            fetcher: HttpClipFetcher::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn submit(&self, config: &VideoGenConfig) -> Result<String> {
        let body = serde_json::json!({
            "mode": config.mode,
            "modelId": config.model_id,
            "imageId": config.image_id,
            "imageUrl": config.image_url,
            "prompt": config.prompt,
            "maxSeconds": config.effective_seconds(),
        });

        let response = self
            .authed(self.client.post(self.url("/generations")))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::internal(format!("Generation submit failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::internal(format!(
                "Generation submit returned HTTP {}",
                response.status()
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Error::internal(format!("Invalid generation response: {}", e)))?;

        Ok(submitted.id)
    }

    async fn poll(&self, generation_id: &str) -> Result<String> {
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.poll_timeout_secs);

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::internal(format!(
                    "Generation {} did not finish within {}s",
                    generation_id, self.config.poll_timeout_secs
                )));
            }

            let response = self
                .authed(
                    self.client
                        .get(self.url(&format!("/generations/{}", generation_id))),
                )
                .send()
                .await
                .map_err(|e| Error::internal(format!("Generation poll failed: {}", e)))?;

            let status: StatusResponse = response
                .json()
                .await
                .map_err(|e| Error::internal(format!("Invalid generation status: {}", e)))?;

            match status.status.as_str() {
                "completed" => {
                    return status.video_url.ok_or_else(|| {
                        Error::internal("Generation completed without a video URL")
                    });
                }
                "failed" => {
                    let reason = status.error.unwrap_or_else(|| "unknown error".to_string());
                    return Err(Error::internal(format!("Generation failed: {}", reason)));
                }
                _ => tokio::time::sleep(interval).await,
            }
        }
    }
}

#[async_trait::async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, config: &VideoGenConfig, dest: &Path) -> Result<()> {
        if self.config.api_url.is_empty() {
            return Err(Error::internal(
                "generation.api_url is not configured".to_string(),
            ));
        }

        let generation_id = self.submit(config).await?;
        tracing::info!(generation_id, "Clip generation submitted");

        let video_url = self.poll(&generation_id).await?;
        self.fetcher.download(&video_url, dest).await
    }
}
