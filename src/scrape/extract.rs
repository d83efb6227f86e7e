//! Unit extraction from listing page markup
//!
//! Each unit is an `<a class="apartment">` anchor. The anchor title carries
//! the unit type ("Komfort-Apartment Nr. 12"), its text carries the unit
//! number, and its `data-text` attribute carries an entity-encoded HTML
//! fragment with a "Status: <word>" label and, usually, a detail link.

use std::cell::RefCell;
use std::sync::OnceLock;

use html_escape::decode_html_entities;
use lol_html::{element, text, HtmlRewriter, Settings};
use regex::Regex;

use super::fetch::FetchError;
use crate::data::{normalize_ws, UnitRecord, UnitStatus};

const UNIT_SELECTOR: &str = "a.apartment";
const FREE_MARKER: &str = "unit_free";

fn status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Status:(?:\s|<[^>]+>)*([A-Za-zÄÖÜäöüß]+)").expect("status pattern")
    })
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)href=(?:"|&quot;)([^"&]+)(?:"|&quot;)"#).expect("link pattern")
    })
}

fn type_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*Nr\..*$").expect("type suffix pattern"))
}

/// How a status was recovered from a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// "Status: <word>" label
    Label,
    /// Free-marker token without a label
    FreeMarker,
    /// Nothing recoverable
    Missing,
}

/// Typed result of parsing one status payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusParse {
    pub status: UnitStatus,
    pub link: Option<String>,
    pub source: StatusSource,
    /// Set when the status could not be determined
    pub anomaly: bool,
}

/// Parse an entity-encoded status payload.
///
/// Precedence: a labelled status wins; without a label the free marker
/// yields `Free`; otherwise the status is `Unknown`. An unrecognized
/// labelled word is also `Unknown`.
pub fn parse_status_payload(payload: &str) -> StatusParse {
    let decoded = decode_html_entities(payload);

    let link = link_re()
        .captures(&decoded)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|l| !l.is_empty());

    let labelled = status_re()
        .captures(&decoded)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase());

    let (status, source) = match labelled {
        Some(word) => (UnitStatus::from_word(&word), StatusSource::Label),
        None if decoded.contains(FREE_MARKER) => (UnitStatus::Free, StatusSource::FreeMarker),
        None => (UnitStatus::Unknown, StatusSource::Missing),
    };

    StatusParse {
        status,
        link,
        source,
        anomaly: status == UnitStatus::Unknown,
    }
}

/// Strip a trailing "Nr. …" suffix from an anchor title.
pub fn base_type(title: &str) -> String {
    type_suffix_re().replace(title, "").trim().to_string()
}

#[derive(Debug, Default)]
struct RawAnchor {
    title: String,
    text: String,
    payload: String,
}

/// Extract unit records in document order. No type filtering happens here.
pub fn extract_units(html: &str) -> Result<Vec<UnitRecord>, FetchError> {
    let anchors: RefCell<Vec<RawAnchor>> = RefCell::new(Vec::new());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!(UNIT_SELECTOR, |el| {
                    let title = el
                        .get_attribute("data-original-title")
                        .filter(|t| !t.trim().is_empty())
                        .or_else(|| el.get_attribute("title"))
                        .unwrap_or_default();
                    let payload = el.get_attribute("data-text").unwrap_or_default();

                    anchors.borrow_mut().push(RawAnchor {
                        title: decode_html_entities(&title).into_owned(),
                        text: String::new(),
                        payload: decode_html_entities(&payload).into_owned(),
                    });
                    Ok(())
                }),
                text!(UNIT_SELECTOR, |chunk| {
                    if let Some(anchor) = anchors.borrow_mut().last_mut() {
                        anchor.text.push_str(chunk.as_str());
                        if chunk.last_in_text_node() {
                            anchor.text.push(' ');
                        }
                    }
                    Ok(())
                }),
            ],
            strict: false,
            ..Settings::default()
        },
        |_: &[u8]| {},
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| FetchError::Markup(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| FetchError::Markup(e.to_string()))?;

    let records = anchors
        .into_inner()
        .into_iter()
        .map(|anchor| {
            let parsed = parse_status_payload(&anchor.payload);
            let identifier = normalize_ws(&decode_html_entities(&anchor.text));
            if parsed.anomaly {
                tracing::debug!(
                    title = %anchor.title,
                    identifier = %identifier,
                    "Unit status could not be determined"
                );
            }
            UnitRecord {
                unit_type: base_type(&anchor.title),
                identifier,
                status: parsed.status,
                link: parsed.link,
            }
        })
        .collect();

    Ok(records)
}
