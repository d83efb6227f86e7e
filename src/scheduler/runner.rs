//! Bounded-duration watch run

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alerts::{
    message, send_best_effort, Decision, DecisionEngine, HeartbeatGate, Notifier,
};
use crate::config::WatchConfig;
use crate::data::{Aggregator, Snapshot};
use crate::scrape::{extract_units, FetchError, PageSource};
use crate::state::{PersistedState, StateStore};

use super::clock::Clock;
use super::policy::{NextAction, Scheduler};

/// Why the poll loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Not enough budget left to start another cycle
    BudgetExhausted,
    /// The next sleep would have been negligibly short
    SleepTooShort,
    /// A fetch failed and the run was abandoned
    Aborted(String),
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::BudgetExhausted => "budget_exhausted",
            RunOutcome::SleepTooShort => "sleep_too_short",
            RunOutcome::Aborted(_) => "aborted",
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub cycles: u32,
    pub alerts: u32,
    pub still_alerts: u32,
    pub throttled: u32,
    pub gone: u32,
    pub heartbeat_sent: bool,
    pub failed_deliveries: u32,
    /// Notifications not attempted because the run deadline was too close
    pub skipped_sends: u32,
    pub outcome: RunOutcome,
    /// State as written at the end of the run
    pub state: PersistedState,
    pub elapsed: Duration,
}

/// Drives fetch, aggregate, decide, notify cycles until the budget runs out
pub struct Watcher {
    source: Box<dyn PageSource>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
    store: StateStore,
    aggregator: Aggregator,
    scheduler: Scheduler,
    heartbeat: HeartbeatGate,
    config: WatchConfig,
}

impl Watcher {
    pub fn new(
        config: WatchConfig,
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            notifier,
            clock,
            store: StateStore::new(&config.state_file),
            aggregator: Aggregator::new(config.monitored_types.iter().cloned()),
            scheduler: Scheduler::new(config.poll.clone()),
            heartbeat: HeartbeatGate::new(config.heartbeat.clone()),
            config,
        }
    }

    /// Fetch and reduce one page.
    pub async fn poll(&self) -> Result<Snapshot, FetchError> {
        let html = self.source.fetch().await?;
        let records = extract_units(&html)?;
        Ok(self.aggregator.aggregate(records))
    }

    /// Execute one bounded run. Never panics on I/O; only a fetch failure
    /// ends the loop early.
    pub async fn run(&self) -> RunReport {
        let started = self.clock.now();
        let deadline = started + self.config.poll.run_budget;

        let mut state = self.store.load();
        let mut engine = DecisionEngine::new(
            self.config.alerts.clone(),
            state.last_free_signature.clone(),
        );

        tracing::info!(
            state = ?engine.state(),
            budget_s = self.config.poll.run_budget.as_secs(),
            notifier = self.notifier.name(),
            "Run started"
        );

        let mut report = RunReport {
            cycles: 0,
            alerts: 0,
            still_alerts: 0,
            throttled: 0,
            gone: 0,
            heartbeat_sent: false,
            failed_deliveries: 0,
            skipped_sends: 0,
            outcome: RunOutcome::BudgetExhausted,
            state: state.clone(),
            elapsed: Duration::ZERO,
        };

        let outcome = loop {
            if !self.scheduler.can_start(self.remaining(deadline)) {
                break RunOutcome::BudgetExhausted;
            }

            report.cycles += 1;
            let fetch_started = self.clock.now();

            let snapshot = match self.poll().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::error!(
                        cycle = report.cycles,
                        error = %e,
                        "Page fetch failed, aborting run"
                    );
                    self.deliver(&message::fetch_failure(&e), deadline, &mut report)
                        .await;
                    break RunOutcome::Aborted(e.to_string());
                }
            };
            let fetch_ms = self.clock.now().duration_since(fetch_started).as_millis() as u64;

            let committed = engine.last_signature().clone();
            let decision = engine.evaluate(&snapshot.free);
            match &decision {
                Decision::Alert { .. } => report.alerts += 1,
                Decision::StillAlert { .. } => report.still_alerts += 1,
                Decision::Throttled => report.throttled += 1,
                Decision::Gone => report.gone += 1,
                Decision::None => {}
            }
            if let Some(text) = message::render(&decision, self.config.alerts.still_alert_max) {
                if !self.deliver(&text, deadline, &mut report).await {
                    engine.rewind(committed);
                }
            }

            if report.cycles == 1 {
                self.maybe_heartbeat(&snapshot, &mut state, deadline, &mut report)
                    .await;
            }

            let remaining = self.remaining(deadline);
            tracing::info!(
                cycle = report.cycles,
                monitored = snapshot.monitored(),
                free = snapshot.counts.free,
                reserved = snapshot.counts.reserved,
                rented = snapshot.counts.rented,
                unknown = snapshot.counts.unknown,
                anomalies = snapshot.anomalies(),
                decision = decision.kind(),
                signature = %engine.last_signature(),
                fetch_ms,
                remaining_s = remaining.as_secs(),
                "Poll cycle complete"
            );

            match self.scheduler.next_action(remaining, snapshot.has_free()) {
                NextAction::Proceed(sleep) => {
                    tracing::debug!(sleep_s = sleep.as_secs(), "Sleeping until next poll");
                    self.clock.sleep(sleep).await;
                }
                NextAction::Stop => {
                    let sleep = self.scheduler.interval(snapshot.has_free()).min(remaining);
                    if sleep < self.config.poll.min_sleep {
                        break RunOutcome::SleepTooShort;
                    }
                    break RunOutcome::BudgetExhausted;
                }
            }
        };

        state.last_free_signature = engine.last_signature().clone();
        if let Err(e) = self.store.save(&state) {
            tracing::error!(
                path = %self.store.path().display(),
                error = %e,
                "Failed to persist state"
            );
        }

        report.outcome = outcome;
        report.state = state;
        report.elapsed = self.clock.now().duration_since(started);

        tracing::info!(
            cycles = report.cycles,
            alerts = report.alerts,
            still_alerts = report.still_alerts,
            throttled = report.throttled,
            gone = report.gone,
            heartbeat = report.heartbeat_sent,
            failed_deliveries = report.failed_deliveries,
            skipped_sends = report.skipped_sends,
            elapsed_s = report.elapsed.as_secs(),
            outcome = report.outcome.as_str(),
            "Run finished"
        );

        report
    }

    async fn maybe_heartbeat(
        &self,
        snapshot: &Snapshot,
        state: &mut PersistedState,
        deadline: Instant,
        report: &mut RunReport,
    ) {
        let now = self.clock.local_now();
        let Some(key) = self.heartbeat.due(now, &state.last_heartbeat_key) else {
            return;
        };

        let text = message::heartbeat(snapshot.monitored(), &snapshot.counts);
        if !self.deliver(&text, deadline, report).await {
            return;
        }
        tracing::info!(key = %key, "Heartbeat sent");
        state.last_heartbeat_key = key;
        report.heartbeat_sent = true;
    }

    /// Send unless the deadline is too close for the send to finish.
    /// Returns whether a send was attempted.
    async fn deliver(&self, text: &str, deadline: Instant, report: &mut RunReport) -> bool {
        if !self.can_send(deadline) {
            tracing::warn!(
                remaining_s = self.remaining(deadline).as_secs(),
                notify_timeout_s = self.config.notify_timeout.as_secs(),
                "Not enough budget left to notify, skipping"
            );
            report.skipped_sends += 1;
            return false;
        }

        let notice_allowed = || self.can_send(deadline);
        if !send_best_effort(self.notifier.as_ref(), text, notice_allowed).await {
            report.failed_deliveries += 1;
        }
        true
    }

    fn can_send(&self, deadline: Instant) -> bool {
        self.remaining(deadline) >= self.config.notify_timeout
    }

    fn remaining(&self, deadline: Instant) -> Duration {
        deadline.saturating_duration_since(self.clock.now())
    }
}
