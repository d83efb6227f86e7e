//! Listing page fetch and unit extraction

pub mod extract;
pub mod fetch;

pub use extract::{base_type, extract_units, parse_status_payload, StatusParse, StatusSource};
pub use fetch::{FetchError, HttpPageSource, PageSource};
