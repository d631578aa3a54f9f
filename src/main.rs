//! resort-admin - A terminal admin console for the ski resort directory.
//!
//! # Usage
//!
//! ```bash
//! resort-admin
//! resort-admin --api-url http://localhost:3000 --page passes
//! resort-admin --demo --log-file admin.log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use resort_admin::api::{Backend, HttpBackend, MemoryBackend};
use resort_admin::app::{App, Page};
use resort_admin::config::{
    API_URL_ENV, ConfigFlags, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use resort_admin::logging;

/// Browse and bulk-edit ski resorts, ski passes and users
#[derive(Parser, Debug)]
#[command(name = "resort-admin", version, about, long_about = None)]
struct Cli {
    /// Backend base URL (falls back to $RESORT_ADMIN_API_URL, then http://localhost:3000)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Page to open at startup
    #[arg(long, value_enum)]
    page: Option<Page>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Use built-in sample data instead of a backend
    #[arg(long)]
    demo: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = ConfigFlags {
        api_url: cli.api_url,
        page: cli.page,
        log_file: cli.log_file,
        timeout: cli.timeout,
        demo: cli.demo,
    };

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    logging::init(effective.log_file.as_deref()).context("Failed to initialize logging")?;

    let (backend, api_label) = if effective.demo {
        tracing::info!("using in-memory demo data");
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::demo());
        (backend, "demo data".to_string())
    } else {
        let url = effective.api_url_or(std::env::var(API_URL_ENV).ok());
        let http = HttpBackend::new(&url, effective.request_timeout())
            .with_context(|| format!("Failed to create HTTP client for {url}"))?;
        tracing::info!(base_url = http.base_url(), "using backend");
        let label = http.base_url().to_string();
        let backend: Arc<dyn Backend> = Arc::new(http);
        (backend, label)
    };

    let mut app = App::new(backend)
        .with_page(effective.page.unwrap_or_default())
        .with_api_label(api_label)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
