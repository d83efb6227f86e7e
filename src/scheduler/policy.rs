//! Two-gear poll cadence within a bounded run

use std::time::Duration;

use crate::config::PollConfig;

/// What to do after a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Sleep this long, then try another cycle
    Proceed(Duration),
    Stop,
}

/// Pure scheduling policy. Knows nothing about clocks or the network.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: PollConfig,
}

impl Scheduler {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Whether enough budget remains to begin a fetch.
    pub fn can_start(&self, remaining: Duration) -> bool {
        remaining >= self.config.min_start_budget
    }

    /// Poll interval for the current gear.
    pub fn interval(&self, had_free: bool) -> Duration {
        if had_free {
            self.config.fast_interval
        } else {
            self.config.slow_interval
        }
    }

    /// Pick the sleep before the next cycle: short while free units exist,
    /// long while idle, clamped to the remaining budget. Stops when the
    /// sleep would be negligible or would leave too little budget to start
    /// another cycle afterwards.
    pub fn next_action(&self, remaining: Duration, had_free: bool) -> NextAction {
        if remaining < self.config.min_sleep {
            return NextAction::Stop;
        }

        let sleep = self.interval(had_free).min(remaining);
        if sleep < self.config.min_sleep {
            return NextAction::Stop;
        }

        if !self.can_start(remaining - sleep) {
            return NextAction::Stop;
        }

        NextAction::Proceed(sleep)
    }
}
