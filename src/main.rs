//! Unitwatch
//!
//! Run with: cargo run
//!
//! One invocation is one bounded run; schedule it externally (e.g. cron
//! every 5 minutes with the default 280 s budget).
//!
//! Environment variables:
//! - UNITWATCH_URL: Listing page URL (required)
//! - UNITWATCH_TELEGRAM_TOKEN / UNITWATCH_TELEGRAM_CHAT_ID: Telegram target
//!   (notifications are only logged when unset)
//! - UNITWATCH_TYPES: Comma-separated unit types to monitor
//! - UNITWATCH_STATE_FILE: Persisted state path (default: ./unitwatch_state.json)
//! - UNITWATCH_RUN_BUDGET_SECS, UNITWATCH_FAST_POLL_SECS, UNITWATCH_SLOW_POLL_SECS
//! - UNITWATCH_HEARTBEAT_HOURS, UNITWATCH_HEARTBEAT_WINDOW_MINS
//! - RUST_LOG: Log level (default: unitwatch=info)
//!
//! Exit status: 0 when the loop completed, 1 when a page fetch aborted the
//! run, 2 on configuration errors.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unitwatch::alerts::{LogNotifier, Notifier, TelegramNotifier};
use unitwatch::scheduler::{SystemClock, Watcher};
use unitwatch::scrape::HttpPageSource;
use unitwatch::WatchConfig;

const EXIT_CONFIG: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unitwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match WatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    tracing::info!("Unitwatch configuration:");
    tracing::info!("  URL: {}", config.url);
    tracing::info!("  Monitored types: {:?}", config.monitored_types);
    tracing::info!("  State file: {}", config.state_file.display());
    tracing::info!(
        "  Budget: {}s, polling every {}s (free) / {}s (idle)",
        config.poll.run_budget.as_secs(),
        config.poll.fast_interval.as_secs(),
        config.poll.slow_interval.as_secs()
    );
    tracing::info!(
        "  Heartbeat hours: {:?} (first {} min)",
        config.heartbeat.hours,
        config.heartbeat.window_minutes
    );

    let source = match HttpPageSource::new(&config.url, &config.user_agent, config.fetch_timeout) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build page client");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let notifier: Box<dyn Notifier> = match &config.telegram {
        Some(telegram) => match TelegramNotifier::new(telegram, config.notify_timeout) {
            Ok(notifier) => Box::new(notifier),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build Telegram client");
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => {
            tracing::warn!("Telegram not configured, notifications will only be logged");
            Box::new(LogNotifier)
        }
    };

    let watcher = Watcher::new(config, Box::new(source), notifier, Arc::new(SystemClock));
    let report = watcher.run().await;

    if report.outcome.is_aborted() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
