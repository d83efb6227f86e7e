//! Poll scheduling
//!
//! `policy` decides cadence from remaining budget alone; `runner` owns the
//! loop and all I/O; `clock` makes both testable without real time.

pub mod clock;
pub mod policy;
pub mod runner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::{NextAction, Scheduler};
pub use runner::{RunOutcome, RunReport, Watcher};
