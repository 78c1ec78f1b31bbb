//! Recovery of the structured extraction from free-text model replies.
//!
//! Models wrap the JSON in prose or markdown fences, so the reply is
//! scanned for the first balanced `{...}` object (braces inside string
//! literals do not count) and only that substring is parsed.

use serde::Deserialize;
use trafficeye_core::extraction::{normalize_confidence, ExtractionResult};

use crate::extractor::ExtractionFailure;

#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(rename = "vehicleNumber")]
    vehicle_number: String,
    #[serde(rename = "violationType")]
    violation_type: String,
    confidence: serde_json::Value,
}

/// Locate the first balanced JSON object in `text`.
pub fn first_json_object(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            return Some(&text[start..start + end]);
        }
        search_from = start + 1;
    }
    None
}

/// Byte length of the object starting at `text[0] == '{'`, if it closes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a model reply into an [`ExtractionResult`].
pub fn parse_reply(text: &str) -> Result<ExtractionResult, ExtractionFailure> {
    let json = first_json_object(text).ok_or(ExtractionFailure::NoJson)?;
    let raw: RawExtraction =
        serde_json::from_str(json).map_err(|e| ExtractionFailure::Malformed(e.to_string()))?;

    let confidence = parse_confidence(&raw.confidence).ok_or_else(|| {
        ExtractionFailure::Malformed(format!("confidence is not a number: {}", raw.confidence))
    })?;

    Ok(ExtractionResult::new(
        raw.vehicle_number.trim(),
        raw.violation_type.trim(),
        confidence,
    ))
}

/// Accept `92`, `91.5` or `"92%"`.
fn parse_confidence(value: &serde_json::Value) -> Option<u8> {
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        _ => return None,
    };
    normalize_confidence(raw)
}
