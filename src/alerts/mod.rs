//! Availability alerts
//!
//! Change detection over free lists, heartbeat gating, message rendering
//! and best-effort delivery.

pub mod decision;
pub mod heartbeat;
pub mod message;
pub mod notifier;

pub use decision::{Decision, DecisionEngine, WatchState};
pub use heartbeat::{heartbeat_key, HeartbeatGate};
pub use notifier::{send_best_effort, LogNotifier, Notifier, NotifierError, TelegramNotifier};
