mod cli;

use clipforge::{config, server, services};
use clipforge_db::pool::init_pool;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting Clipforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    // Determine data directory from config path or current directory
    let data_dir = config_path
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    // Initialize database
    let db_path = data_dir.join("clipforge.db");
    let db_path_str = db_path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path_str);
    let db_pool = init_pool(&db_path_str)?;

    // Jobs are not resumable; anything left running by a previous process
    // is marked failed.
    if let Ok(conn) = db_pool.get() {
        match clipforge_db::queries::template_jobs::reset_orphaned_jobs(&conn) {
            Ok(count) if count > 0 => {
                tracing::info!("Failed {} orphaned jobs from previous session", count);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to reset orphaned jobs: {}", e);
            }
        }
    }

    for tool in clipforge_av::check_tools() {
        if !tool.available {
            tracing::warn!("Required tool not found on PATH: {}", tool.name);
        }
    }

    let svc = services::Services {
        generation: Arc::new(services::HttpGenerationService::new(
            config.generation.clone(),
        )),
        fetcher: Arc::new(services::HttpClipFetcher::new()),
        engine: Arc::new(services::FfmpegEngine),
        store: Arc::new(services::LocalMediaStore::new(
            config.media.output_dir.clone(),
            config.media.base_url.clone(),
        )),
    };

    server::start_server(config, db_pool, svc).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforge=trace,clipforge_av=trace,clipforge_db=debug,clipforge_common=debug,tower_http=debug"
                .to_string()
        } else {
            "clipforge=debug,clipforge_av=debug,clipforge_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools() -> Result<()> {
    let mut all_available = true;

    println!("Checking external tools...\n");
    for tool in clipforge_av::check_tools() {
        if tool.available {
            let version = tool.version.as_deref().unwrap_or("unknown version");
            let path = tool
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  ok   {} ({}) at {}", tool.name, version, path);
        } else {
            println!("  MISSING  {}", tool.name);
            all_available = false;
        }
    }

    if all_available {
        println!("\nAll tools available.");
        Ok(())
    } else {
        anyhow::bail!("Some required tools are missing");
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    println!("Configuration is valid.");
    println!(
        "  server: {}:{}",
        config.server.host, config.server.port
    );
    println!("  media output: {}", config.media.output_dir.display());
    println!("  step timeout: {}s", config.engine.step_timeout_secs);
    if config.generation.api_url.is_empty() {
        println!("  generation API: (not configured)");
    } else {
        println!("  generation API: {}", config.generation.api_url);
    }
    Ok(())
}
