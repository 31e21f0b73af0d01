//! Onsite board: who-is-onsite presence service.
//!
//! Single-binary Tokio application that:
//! 1. Polls the OnLocation staff API on a fixed cadence
//! 2. Keeps a shared presence cache with staleness tracking
//! 3. Gates polling on a business-hours schedule
//! 4. Serves the latest snapshot over HTTP

mod config;
mod http;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use onlocation_client::OnLocationClient;
use presence::{BusinessHours, Poller, PollerControls, PresenceCache};
use tracing::{error, info};

/// Staff presence board.
#[derive(Parser)]
#[command(name = "onsite-board", about = "Staff presence board")]
struct Cli {
    /// Just test the API credential with a single staff fetch, then exit.
    #[arg(long)]
    check_auth: bool,

    /// Enable the /debug/* control routes regardless of config.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "onsite_board=info,presence=info,onlocation_client=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Onsite board starting up...");

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if cli.debug {
        cfg.debug = true;
    }

    info!(
        "Timing: poll={}s, stale_after={}s, fetch_timeout={}s",
        cfg.timing.poll_interval_secs,
        cfg.timing.stale_threshold_secs,
        cfg.timing.fetch_timeout_secs,
    );
    info!(
        "Schedule: {} open day(s), UTC offset {:+}h, debug={}",
        cfg.schedule.hours.len(),
        cfg.schedule.utc_offset_hours,
        cfg.debug,
    );

    let client = OnLocationClient::new(
        &cfg.api_key,
        &cfg.api_base_url,
        Duration::from_secs(cfg.timing.fetch_timeout_secs),
    );

    // ── Check-auth mode ──────────────────────────────────────────────
    if cli.check_auth {
        info!("Running auth check...");
        match client.fetch_staff().await {
            Ok(staff) => {
                let onsite = staff.iter().filter(|e| e.is_onsite()).count();
                info!(
                    "Auth successful! {} staff records ({} onsite)",
                    staff.len(),
                    onsite
                );
            }
            Err(e) => {
                error!("Auth check failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Shared state ─────────────────────────────────────────────────
    let hours = match BusinessHours::from_config(&cfg.schedule) {
        Ok(h) => h,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let cache = Arc::new(PresenceCache::new(cfg.timing.stale_threshold_secs));
    let controls = Arc::new(PollerControls::new());

    // ── Spawn tasks ──────────────────────────────────────────────────
    let poller = Poller::new(
        client,
        cache.clone(),
        hours.clone(),
        controls.clone(),
        Duration::from_secs(cfg.timing.poll_interval_secs),
    );
    let poller_handle = tokio::spawn(poller.run());

    let state = http::AppState {
        cache,
        hours: Arc::new(hours),
        controls,
    };
    let router = http::router(state, cfg.debug);
    let bind_addr = cfg.server.bind_addr.clone();
    let server_handle = tokio::spawn(async move { http::serve(&bind_addr, router).await });

    // ── Wait for shutdown ────────────────────────────────────────────
    info!("Onsite board is running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = poller_handle => {
            error!("Poller task exited: {:?}", r);
        }
        r = server_handle => {
            error!("HTTP server exited: {:?}", r);
        }
    }

    info!("Onsite board shut down.");
}
