//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an in-memory database, mock
//! collaborators, and a [`PipelineRunner`] with a short step timeout. The
//! [`TestHarness::with_server`] constructor additionally starts Axum on a
//! random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipforge::config::Config;
use clipforge::pipeline::PipelineRunner;
use clipforge::server::{create_router, AppContext};
use clipforge::services::{ClipFetcher, GenerationService, MediaEngine, MediaStore, Services};
use clipforge_av::{MixParams, OverlayParams};
use clipforge_common::{Error, Result, VideoGenConfig};
use clipforge_db::pool::{init_memory_pool, DbPool, PooledConnection};

/// How a mock collaborator should behave when called.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Write a placeholder file and succeed.
    Succeed,
    /// Fail with the given message.
    Fail(String),
    /// Sleep far past any test timeout.
    Hang,
}

pub struct MockGeneration {
    pub behavior: MockBehavior,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl GenerationService for MockGeneration {
    async fn generate(&self, _config: &VideoGenConfig, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Succeed => {
                tokio::fs::write(dest, b"generated clip").await?;
                Ok(())
            }
            MockBehavior::Fail(msg) => Err(Error::internal(msg.clone())),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

pub struct MockFetcher {
    pub behavior: MockBehavior,
}

impl MockFetcher {
    async fn fetch(&self, dest: &Path) -> Result<()> {
        match &self.behavior {
            MockBehavior::Succeed => {
                tokio::fs::write(dest, b"downloaded clip").await?;
                Ok(())
            }
            MockBehavior::Fail(msg) => Err(Error::internal(msg.clone())),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl ClipFetcher for MockFetcher {
    async fn download(&self, _url: &str, dest: &Path) -> Result<()> {
        self.fetch(dest).await
    }

    async fn download_tiktok(&self, _url: &str, dest: &Path) -> Result<()> {
        self.fetch(dest).await
    }
}

/// Media engine that fabricates output files instead of running ffmpeg.
///
/// Every call checks its input files exist, so a runner that deletes an
/// artifact too early fails the step here.
pub struct MockEngine {
    pub behavior: MockBehavior,
    /// Input lists passed to `concat`, in call order.
    pub concat_calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl MockEngine {
    fn succeeding() -> Self {
        Self {
            behavior: MockBehavior::Succeed,
            concat_calls: Mutex::new(Vec::new()),
        }
    }

    async fn transform(&self, inputs: &[&Path], output: &Path) -> Result<()> {
        for input in inputs {
            if !input.exists() {
                return Err(Error::internal(format!(
                    "input missing: {}",
                    input.display()
                )));
            }
        }
        match &self.behavior {
            MockBehavior::Succeed => {
                tokio::fs::write(output, b"transformed clip").await?;
                Ok(())
            }
            MockBehavior::Fail(msg) => Err(Error::internal(msg.clone())),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl MediaEngine for MockEngine {
    async fn overlay(&self, input: &Path, output: &Path, _params: &OverlayParams) -> Result<()> {
        self.transform(&[input], output).await
    }

    async fn mix(
        &self,
        input: &Path,
        music: &Path,
        output: &Path,
        _params: &MixParams,
    ) -> Result<()> {
        self.transform(&[input, music], output).await
    }

    async fn concat(&self, inputs: &[&Path], output: &Path, _work_dir: &Path) -> Result<()> {
        self.concat_calls
            .lock()
            .unwrap()
            .push(inputs.iter().map(|p| p.to_path_buf()).collect());
        self.transform(inputs, output).await
    }
}

pub struct MockStore {
    /// Whether `signed_url` succeeds.
    pub signing: bool,
}

#[async_trait::async_trait]
impl MediaStore for MockStore {
    async fn publish(&self, job_id: &str, artifact: &Path) -> Result<String> {
        if !artifact.exists() {
            return Err(Error::internal("artifact missing at publish time"));
        }
        Ok(format!("/media/{}.mp4", job_id))
    }

    fn signed_url(&self, output_url: &str) -> Result<String> {
        if self.signing {
            Ok(format!("{}?sig=test-signature", output_url))
        } else {
            Err(Error::internal("signing unavailable"))
        }
    }
}

/// Test harness wrapping an in-memory database, mock services, and a runner.
pub struct TestHarness {
    pub db: DbPool,
    pub services: Services,
    pub engine: Arc<MockEngine>,
    pub runner: Arc<PipelineRunner>,
}

impl TestHarness {
    /// All collaborators succeed; 5 second step timeout.
    pub fn new() -> Self {
        Self::build(
            MockBehavior::Succeed,
            MockBehavior::Succeed,
            true,
            Duration::from_secs(5),
        )
    }

    pub fn build(
        generation: MockBehavior,
        fetch: MockBehavior,
        signing: bool,
        step_timeout: Duration,
    ) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let engine = Arc::new(MockEngine::succeeding());
        let services = Services {
            generation: Arc::new(MockGeneration {
                behavior: generation,
                calls: AtomicUsize::new(0),
            }),
            fetcher: Arc::new(MockFetcher { behavior: fetch }),
            engine: engine.clone(),
            store: Arc::new(MockStore { signing }),
        };
        let runner = Arc::new(PipelineRunner::new(
            db.clone(),
            services.clone(),
            step_timeout,
        ));
        Self {
            db,
            services,
            engine,
            runner,
        }
    }

    pub fn conn(&self) -> PooledConnection {
        self.db.get().expect("failed to get pooled connection")
    }

    /// Start the HTTP server on a random port and return its address.
    pub async fn serve(&self) -> SocketAddr {
        let ctx = AppContext {
            config: Arc::new(Config::default()),
            db_pool: self.db.clone(),
            services: self.services.clone(),
            runner: self.runner.clone(),
        };
        let app = create_router(ctx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("no local addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        addr
    }
}
