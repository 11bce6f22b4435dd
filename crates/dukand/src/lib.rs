//! Dukan checkout API daemon

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use cli::CLIArgs;
use config::Settings;
use dukan::notification::NotificationChannel;
use dukan::payment::PaymentGateway;
use dukan_ntfy::NtfyChannel;
use dukan_razorpay::RazorpayGateway;
use dukan_resend::ResendChannel;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod config;

const DEFAULT_WORK_DIR: &str = ".dukan";

/// Resolve the working directory, creating it when absent
pub fn get_work_directory(args: &CLIArgs) -> Result<PathBuf> {
    let work_dir = match &args.work_dir {
        Some(work_dir) => PathBuf::from(work_dir),
        None => {
            let home_dir = home::home_dir().ok_or(anyhow!("Unknown home dir"))?;
            home_dir.join(DEFAULT_WORK_DIR)
        }
    };

    fs::create_dir_all(&work_dir)?;

    Ok(work_dir)
}

/// Load settings from the config file in the work dir unless the CLI
/// names one explicitly
pub fn load_settings(work_dir: &Path, config_file_name: Option<String>) -> Result<Settings> {
    let config_path = match config_file_name {
        Some(name) => Some(PathBuf::from(name)),
        None => {
            let default_path = work_dir.join("config.toml");
            default_path.exists().then_some(default_path)
        }
    };

    Ok(Settings::new(config_path)?)
}

/// Initialize the tracing subscriber with an env-overridable filter
pub fn setup_tracing() {
    let default_filter = "debug";
    let hyper_filter = "hyper=warn";
    let reqwest_filter = "reqwest=warn";

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},{},{}",
            default_filter, hyper_filter, reqwest_filter
        ))
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wire the configured gateway and channels into the router and serve
/// it until shutdown
pub async fn run_dukand(settings: &Settings) -> Result<()> {
    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(
        settings.razorpay.key_id.clone(),
        settings.razorpay.key_secret.clone(),
    )?);

    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    let ntfy = match &settings.ntfy.api_url {
        Some(api_url) => NtfyChannel::with_endpoint(api_url.clone(), settings.ntfy.topic.clone())?,
        None => NtfyChannel::new(settings.ntfy.topic.clone())?,
    };
    channels.push(Arc::new(ntfy));

    if let Some(resend) = &settings.resend {
        channels.push(Arc::new(ResendChannel::new(
            resend.api_key.clone(),
            resend.from.clone(),
            resend.to.clone(),
        )));
    }

    let router = dukan_axum::create_store_router(gateway, channels);

    let listen_addr = format!(
        "{}:{}",
        settings.info.listen_host, settings.info.listen_port
    );

    tracing::info!("Starting dukan checkout API on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl+c handler");
    tracing::info!("Shutdown signal received");
}
