//! Time-gated liveness messages

use chrono::{NaiveDateTime, Timelike};

use crate::config::HeartbeatConfig;

/// Key identifying one heartbeat opportunity (local date and hour)
pub fn heartbeat_key(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H").to_string()
}

/// Decides whether a heartbeat is due
#[derive(Debug, Clone)]
pub struct HeartbeatGate {
    config: HeartbeatConfig,
}

impl HeartbeatGate {
    pub fn new(config: HeartbeatConfig) -> Self {
        Self { config }
    }

    /// Returns the key to record when a heartbeat should be sent now.
    pub fn due(&self, now: NaiveDateTime, last_key: &str) -> Option<String> {
        if !self.config.hours.contains(&now.hour()) {
            return None;
        }
        if now.minute() >= self.config.window_minutes {
            return None;
        }

        let key = heartbeat_key(now);
        if key == last_key {
            return None;
        }
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn gate() -> HeartbeatGate {
        HeartbeatGate::new(HeartbeatConfig {
            hours: vec![9, 21],
            window_minutes: 10,
        })
    }

    #[test]
    fn test_key_format() {
        assert_eq!(heartbeat_key(at(19, 9, 3)), "2026-10-19T09");
    }

    #[test]
    fn test_fires_inside_window() {
        assert_eq!(gate().due(at(19, 9, 0), ""), Some("2026-10-19T09".to_string()));
        assert_eq!(gate().due(at(19, 21, 9), ""), Some("2026-10-19T21".to_string()));
    }

    #[test]
    fn test_not_outside_hours_or_window() {
        assert_eq!(gate().due(at(19, 10, 0), ""), None);
        assert_eq!(gate().due(at(19, 9, 10), ""), None);
        assert_eq!(gate().due(at(19, 9, 59), ""), None);
    }

    #[test]
    fn test_once_per_hour() {
        let gate = gate();
        let mut last = String::new();
        let mut fired = 0;

        // Many invocations inside the same qualifying hour
        for minute in 0..10 {
            if let Some(key) = gate.due(at(19, 9, minute), &last) {
                fired += 1;
                last = key;
            }
        }
        assert_eq!(fired, 1);

        // Next qualifying hour and next day fire again
        assert!(gate.due(at(19, 21, 0), &last).is_some());
        assert!(gate.due(at(20, 9, 0), &last).is_some());
    }

    #[test]
    fn test_no_hours_never_fires() {
        let gate = HeartbeatGate::new(HeartbeatConfig {
            hours: vec![],
            window_minutes: 60,
        });
        assert_eq!(gate.due(at(19, 9, 0), ""), None);
    }
}
