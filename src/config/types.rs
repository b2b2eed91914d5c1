use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Where published job outputs live and how they are served.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory published outputs are copied into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL prefix under which `output_dir` is served.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./media")
}
fn default_base_url() -> String {
    "/media".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            base_url: default_base_url(),
        }
    }
}

/// Remote clip-generation API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Base URL of the generation API. Empty disables generation steps.
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Seconds between status polls while a clip renders.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Give up polling after this many seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    5
}
fn default_poll_timeout() -> u64 {
    600
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: None,
            poll_interval_secs: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Hard ceiling for a single step, in seconds. A step that exceeds it
    /// fails the job.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,
}

fn default_step_timeout() -> u64 {
    600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout(),
        }
    }
}
