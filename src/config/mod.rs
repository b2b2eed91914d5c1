mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./clipforge.toml",
        "~/.config/clipforge/config.toml",
        "/etc/clipforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.engine.step_timeout_secs == 0 {
        anyhow::bail!("engine.step_timeout_secs cannot be 0");
    }

    if config.media.base_url.is_empty() {
        anyhow::bail!("media.base_url cannot be empty");
    }

    if config.generation.api_url.is_empty() {
        tracing::warn!("generation.api_url is not set; video-generation steps will fail");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.step_timeout_secs, 600);
        assert_eq!(config.media.base_url, "/media");
        assert_eq!(config.generation.poll_interval_secs, 5);
        assert_eq!(config.generation.poll_timeout_secs, 600);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [generation]
            api_url = "https://gen.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.generation.api_url, "https://gen.example.com");
        assert_eq!(config.generation.poll_interval_secs, 5);
        assert_eq!(config.engine.step_timeout_secs, 600);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.engine.step_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_config(Path::new("/nonexistent/config.toml")).is_err());
    }
}
