//! Raw scan payload handling.
//!
//! Ticket apps render the QR payload either as the bare code string or as a
//! small JSON envelope `{"qrCode": "..."}`. Both arrive here as text from the
//! decoder (or typed by the operator) and are reduced to the effective code
//! before anything else looks at them.

use serde_json::Value;

/// Extract the effective code from a raw scan payload.
///
/// If the payload parses as a JSON object with a string `qrCode` field, that
/// field's value is the code. Anything else (plain text, JSON of another
/// shape, a non-string `qrCode`) is used verbatim. Parse failure is the
/// expected path for bare codes, not an error.
pub fn effective_code(raw: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        if let Some(Value::String(code)) = map.get("qrCode") {
            return code.clone();
        }
    }
    raw.to_string()
}

/// Which scan a code belongs to, inferred from its prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeKind {
    Primary,
    Secondary,
}

/// Classify a code by its leading character: primary codes start with `1`,
/// secondary codes with `2`. Advisory only; the verification flow never
/// gates on this.
pub fn detect_kind(code: &str) -> Option<CodeKind> {
    match code.chars().next() {
        Some('1') => Some(CodeKind::Primary),
        Some('2') => Some(CodeKind::Secondary),
        _ => None,
    }
}
