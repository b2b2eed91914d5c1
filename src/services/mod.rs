//! External collaborators the pipeline runner depends on.
//!
//! Each collaborator is a trait object so runner tests can substitute
//! in-process fakes for the generation API, network downloads, and the
//! published-media store.

pub mod engine;
pub mod fetch;
pub mod generation;
pub mod store;

pub use engine::FfmpegEngine;
pub use fetch::HttpClipFetcher;
pub use generation::HttpGenerationService;
pub use store::LocalMediaStore;

use clipforge_av::{MixParams, OverlayParams};
use clipforge_common::{Result, VideoGenConfig};
use std::path::Path;
use std::sync::Arc;

/// Remote clip-generation API.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a clip from the given config and write it to `dest`.
    async fn generate(&self, config: &VideoGenConfig, dest: &Path) -> Result<()>;
}

/// Fetches source and attachment clips onto local disk.
#[async_trait::async_trait]
pub trait ClipFetcher: Send + Sync {
    /// Download a direct video URL (or copy a local path) to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Resolve and download a TikTok post to `dest`.
    async fn download_tiktok(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Transformations applied to the running pipeline artifact.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Burn a text overlay onto `input`, writing the result to `output`.
    async fn overlay(&self, input: &Path, output: &Path, params: &OverlayParams) -> Result<()>;

    /// Mix `music` into `input`'s audio, writing the result to `output`.
    async fn mix(
        &self,
        input: &Path,
        music: &Path,
        output: &Path,
        params: &MixParams,
    ) -> Result<()>;

    /// Concatenate `inputs` in order into `output`, using `work_dir` for
    /// scratch files.
    async fn concat(&self, inputs: &[&Path], output: &Path, work_dir: &Path) -> Result<()>;
}

/// Store for published pipeline outputs.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Move a finished artifact into the store. Returns the durable URL
    /// recorded on the job.
    async fn publish(&self, job_id: &str, artifact: &Path) -> Result<String>;

    /// Produce a short-lived signed URL for a published output. Stores
    /// that serve public URLs may not support this; callers fall back to
    /// the stored URL.
    fn signed_url(&self, output_url: &str) -> Result<String>;
}

/// The collaborator set handed to the runner and the HTTP layer.
#[derive(Clone)]
pub struct Services {
    pub generation: Arc<dyn GenerationService>,
    pub fetcher: Arc<dyn ClipFetcher>,
    pub engine: Arc<dyn MediaEngine>,
    pub store: Arc<dyn MediaStore>,
}
