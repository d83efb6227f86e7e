//! Availability change detection
//!
//! The engine is `Quiet` while the tracked signature is the empty sentinel
//! and `Alerting` otherwise. The tracked signature is seeded from persisted
//! state, so transitions carry across runs.

use crate::config::AlertConfig;
use crate::data::{FreeList, Signature};

/// Engine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    /// No free units tracked
    Quiet,
    /// A non-empty free list is tracked under this signature
    Alerting(Signature),
}

/// What a poll cycle should announce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing free, nothing changed
    None,
    /// New or changed free list
    Alert { free: FreeList },
    /// Same free list as before, under the per-run cap
    StillAlert { free: FreeList, sequence: u32 },
    /// Same free list as before, cap reached
    Throttled,
    /// Free units disappeared
    Gone,
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::None => "none",
            Decision::Alert { .. } => "alert",
            Decision::StillAlert { .. } => "still_alert",
            Decision::Throttled => "throttled",
            Decision::Gone => "gone",
        }
    }
}

/// Notification decision state machine
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: AlertConfig,
    last_signature: Signature,
    still_alerts_sent: u32,
}

impl DecisionEngine {
    pub fn new(config: AlertConfig, last_signature: Signature) -> Self {
        Self {
            config,
            last_signature,
            still_alerts_sent: 0,
        }
    }

    pub fn state(&self) -> WatchState {
        if self.last_signature.is_empty() {
            WatchState::Quiet
        } else {
            WatchState::Alerting(self.last_signature.clone())
        }
    }

    /// Signature to persist
    pub fn last_signature(&self) -> &Signature {
        &self.last_signature
    }

    pub fn still_alerts_sent(&self) -> u32 {
        self.still_alerts_sent
    }

    /// Return to a previously committed signature, so an announcement that
    /// was never sent is decided again next time.
    pub fn rewind(&mut self, signature: Signature) {
        self.last_signature = signature;
    }

    /// Evaluate one poll cycle's free list.
    pub fn evaluate(&mut self, free: &FreeList) -> Decision {
        let current = free.signature();

        match (self.state(), free.is_empty()) {
            (WatchState::Quiet, true) => Decision::None,
            (WatchState::Alerting(_), true) => {
                self.last_signature = Signature::empty();
                Decision::Gone
            }
            (WatchState::Alerting(last), false) if last == current => {
                if self.still_alerts_sent < self.config.still_alert_max {
                    self.still_alerts_sent += 1;
                    Decision::StillAlert {
                        free: free.clone(),
                        sequence: self.still_alerts_sent,
                    }
                } else {
                    Decision::Throttled
                }
            }
            // Quiet -> new list, or Alerting with a changed list
            (_, false) => {
                self.last_signature = current;
                Decision::Alert { free: free.clone() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{UnitRecord, UnitStatus};

    fn free_list(ids: &[&str]) -> FreeList {
        FreeList::from_unsorted(
            ids.iter()
                .map(|id| {
                    UnitRecord::new("Komfort-Apartment", *id, UnitStatus::Free)
                        .with_link(format!("https://example.org/unit/{}", id))
                })
                .collect(),
        )
    }

    fn engine(max: u32) -> DecisionEngine {
        DecisionEngine::new(AlertConfig { still_alert_max: max }, Signature::empty())
    }

    #[test]
    fn test_quiet_stays_quiet() {
        let mut engine = engine(3);
        assert_eq!(engine.evaluate(&FreeList::default()), Decision::None);
        assert_eq!(engine.state(), WatchState::Quiet);
        assert!(engine.last_signature().is_empty());
    }

    #[test]
    fn test_quiet_to_alerting() {
        let mut engine = engine(3);
        let free = free_list(&["12"]);

        let decision = engine.evaluate(&free);
        assert_eq!(decision, Decision::Alert { free: free.clone() });
        assert_eq!(engine.state(), WatchState::Alerting(free.signature()));
        assert_eq!(engine.last_signature(), &free.signature());
    }

    #[test]
    fn test_unchanged_list_is_still_alert() {
        let mut engine = engine(3);
        let free = free_list(&["12"]);
        engine.evaluate(&free);

        let decision = engine.evaluate(&free);
        assert_eq!(
            decision,
            Decision::StillAlert {
                free: free.clone(),
                sequence: 1
            }
        );
        assert_eq!(engine.last_signature(), &free.signature());
    }

    #[test]
    fn test_changed_list_realerts() {
        let mut engine = engine(3);
        engine.evaluate(&free_list(&["12"]));

        let changed = free_list(&["12", "14"]);
        let decision = engine.evaluate(&changed);
        assert_eq!(decision.kind(), "alert");
        assert_eq!(engine.last_signature(), &changed.signature());
    }

    #[test]
    fn test_gone_resets_to_sentinel() {
        let mut engine = engine(3);
        engine.evaluate(&free_list(&["12"]));

        assert_eq!(engine.evaluate(&FreeList::default()), Decision::Gone);
        assert_eq!(engine.state(), WatchState::Quiet);
        assert!(engine.last_signature().is_empty());

        // A second empty cycle does not repeat GONE
        assert_eq!(engine.evaluate(&FreeList::default()), Decision::None);
    }

    #[test]
    fn test_still_alert_cap() {
        let mut engine = engine(2);
        let free = free_list(&["12"]);
        engine.evaluate(&free);

        let kinds: Vec<_> = (0..10).map(|_| engine.evaluate(&free).kind()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == "still_alert").count(), 2);
        assert_eq!(kinds[..2], ["still_alert", "still_alert"]);
        assert!(kinds[2..].iter().all(|k| *k == "throttled"));
        assert_eq!(engine.still_alerts_sent(), 2);
    }

    #[test]
    fn test_persisted_signature_carries_across_runs() {
        let free = free_list(&["12"]);

        // New run seeded with the signature from a previous run
        let mut engine = DecisionEngine::new(AlertConfig::default(), free.signature());
        assert_eq!(engine.evaluate(&free).kind(), "still_alert");

        let mut engine = DecisionEngine::new(AlertConfig::default(), free.signature());
        assert_eq!(engine.evaluate(&FreeList::default()), Decision::Gone);
    }

    #[test]
    fn test_rewind_repeats_unsent_alert() {
        let mut engine = engine(3);
        let free = free_list(&["12"]);
        let committed = engine.last_signature().clone();

        assert_eq!(engine.evaluate(&free).kind(), "alert");
        engine.rewind(committed);

        assert_eq!(engine.state(), WatchState::Quiet);
        assert_eq!(engine.evaluate(&free).kind(), "alert");
    }

    #[test]
    fn test_zero_cap_never_repeats() {
        let mut engine = engine(0);
        let free = free_list(&["1"]);
        assert_eq!(engine.evaluate(&free).kind(), "alert");
        assert_eq!(engine.evaluate(&free), Decision::Throttled);
    }
}
