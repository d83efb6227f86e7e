//! Notification text

use std::fmt::Write;

use super::decision::Decision;
use super::notifier::NotifierError;
use crate::data::{FreeList, StatusCounts};

fn push_units(out: &mut String, free: &FreeList) {
    for unit in free {
        let _ = write!(out, "\n- {} | {}", unit.unit_type, unit.identifier);
        if let Some(link) = &unit.link {
            let _ = write!(out, "\n  {}", link);
        }
    }
}

/// Render the message for a decision, if it produces one.
pub fn render(decision: &Decision, still_alert_max: u32) -> Option<String> {
    match decision {
        Decision::None | Decision::Throttled => None,
        Decision::Alert { free } => {
            let mut out = format!("✅ Free units available ({})!", free.len());
            push_units(&mut out, free);
            Some(out)
        }
        Decision::StillAlert { free, sequence } => {
            let mut out = format!(
                "⏳ Still free ({}) [reminder {}/{}]",
                free.len(),
                sequence,
                still_alert_max
            );
            push_units(&mut out, free);
            Some(out)
        }
        Decision::Gone => Some("❌ Free units are gone.".to_string()),
    }
}

pub fn heartbeat(monitored: usize, counts: &StatusCounts) -> String {
    format!(
        "💓 unitwatch alive\nmonitored: {}\nfree: {} | reserved: {} | rented: {} | unknown: {}",
        monitored, counts.free, counts.reserved, counts.rented, counts.unknown
    )
}

pub fn fetch_failure(error: &dyn std::error::Error) -> String {
    format!("⚠️ unitwatch: page fetch failed, run aborted: {}", error)
}

pub fn delivery_failure(error: &NotifierError) -> String {
    format!("⚠️ unitwatch: a notification could not be delivered: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{UnitRecord, UnitStatus};

    #[test]
    fn test_alert_lists_units_and_links() {
        let free = FreeList::from_unsorted(vec![
            UnitRecord::new("Komfort-Apartment", "12", UnitStatus::Free)
                .with_link("https://example.org/unit/12"),
            UnitRecord::new("Komfort L-Apartment", "3", UnitStatus::Free),
        ]);

        let text = render(&Decision::Alert { free }, 3).unwrap();
        assert_eq!(
            text,
            "✅ Free units available (2)!\n- Komfort L-Apartment | 3\n- Komfort-Apartment | 12\n  https://example.org/unit/12"
        );
    }

    #[test]
    fn test_still_alert_shows_sequence() {
        let free = FreeList::from_unsorted(vec![UnitRecord::new(
            "Komfort-Apartment",
            "12",
            UnitStatus::Free,
        )]);
        let text = render(&Decision::StillAlert { free, sequence: 2 }, 3).unwrap();
        assert!(text.contains("reminder 2/3"));
        assert!(text.contains("- Komfort-Apartment | 12"));
    }

    #[test]
    fn test_silent_decisions() {
        assert!(render(&Decision::None, 3).is_none());
        assert!(render(&Decision::Throttled, 3).is_none());
        assert!(render(&Decision::Gone, 3).is_some());
    }

    #[test]
    fn test_heartbeat_counts() {
        let counts = StatusCounts {
            free: 1,
            reserved: 2,
            rented: 3,
            unknown: 0,
        };
        let text = heartbeat(6, &counts);
        assert!(text.contains("monitored: 6"));
        assert!(text.contains("free: 1 | reserved: 2 | rented: 3 | unknown: 0"));
    }
}
