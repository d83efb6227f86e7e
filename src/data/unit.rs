use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability status of a single unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Free,
    Reserved,
    Rented,
    Unknown,
}

impl UnitStatus {
    /// Map a status word from the listing page to a status.
    ///
    /// The site is German; English synonyms are accepted as well.
    /// Anything unrecognized maps to `Unknown`.
    pub fn from_word(word: &str) -> Self {
        match word.trim().to_lowercase().as_str() {
            "frei" | "verfügbar" | "free" | "available" => UnitStatus::Free,
            "reserviert" | "reserved" => UnitStatus::Reserved,
            "vermietet" | "rented" => UnitStatus::Rented,
            _ => UnitStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Free => "free",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Rented => "rented",
            UnitStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One unit scraped from the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Normalized unit-type label ("Nr." suffix stripped)
    pub unit_type: String,
    /// Display number/label, whitespace-normalized
    pub identifier: String,
    pub status: UnitStatus,
    /// Detail page link, when present in the payload
    pub link: Option<String>,
}

impl UnitRecord {
    pub fn new(
        unit_type: impl Into<String>,
        identifier: impl Into<String>,
        status: UnitStatus,
    ) -> Self {
        Self {
            unit_type: unit_type.into(),
            identifier: identifier.into(),
            status,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Identity key used for deduplication
    pub fn key(&self) -> (&str, &str) {
        (&self.unit_type, &self.identifier)
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_word() {
        assert_eq!(UnitStatus::from_word("frei"), UnitStatus::Free);
        assert_eq!(UnitStatus::from_word("Frei"), UnitStatus::Free);
        assert_eq!(UnitStatus::from_word("Verfügbar"), UnitStatus::Free);
        assert_eq!(UnitStatus::from_word("reserviert"), UnitStatus::Reserved);
        assert_eq!(UnitStatus::from_word("VERMIETET"), UnitStatus::Rented);
        assert_eq!(UnitStatus::from_word("demnächst"), UnitStatus::Unknown);
        assert_eq!(UnitStatus::from_word(""), UnitStatus::Unknown);
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  12\n\t A  "), "12 A");
        assert_eq!(normalize_ws(""), "");
    }

    #[test]
    fn test_record_key() {
        let rec = UnitRecord::new("Komfort-Apartment", "12", UnitStatus::Free).with_link("/u/12");
        assert_eq!(rec.key(), ("Komfort-Apartment", "12"));
        assert_eq!(rec.link.as_deref(), Some("/u/12"));
    }
}
