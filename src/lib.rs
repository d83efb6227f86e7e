//! Unitwatch: apartment-unit availability watcher
//!
//! Polls a listing page for units of the monitored types, detects when
//! free units appear, change or disappear, and sends throttled alerts plus
//! an hourly-gated liveness message.
//!
//! # Features
//!
//! - **Extraction**: unit anchors parsed with `lol_html`, status recovered
//!   from the entity-encoded tooltip payload
//! - **Change Detection**: free lists fingerprinted with SHA-256 and driven
//!   through a Quiet/Alerting state machine persisted between runs
//! - **Throttling**: reminder alerts capped per run
//! - **Two-Gear Polling**: fast polling while units are free, slow while
//!   idle, all inside a fixed run budget
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use unitwatch::alerts::LogNotifier;
//! use unitwatch::scheduler::{SystemClock, Watcher};
//! use unitwatch::scrape::HttpPageSource;
//! use unitwatch::WatchConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WatchConfig::new("https://example.org/units");
//! let source = HttpPageSource::new(&config.url, &config.user_agent, config.fetch_timeout)?;
//! let watcher = Watcher::new(config, Box::new(source), Box::new(LogNotifier), Arc::new(SystemClock));
//!
//! let report = watcher.run().await;
//! println!("Cycles: {}", report.cycles);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod data;
pub mod scheduler;
pub mod scrape;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, WatchConfig};
pub use data::{FreeList, Signature, Snapshot, UnitRecord, UnitStatus};
pub use scheduler::{RunOutcome, RunReport, Watcher};
pub use state::{PersistedState, StateStore};
