//! Turning the field extractor's raw reply into [`OrderFields`].
//!
//! The reply is expected to be a JSON object but is often wrapped in a
//! markdown code fence (```` ```json ... ``` ````). Keys are normalized so that
//! `"Vessel Name"`, `" vessel name "` style variations written by the
//! extractor land on the same field as long as only whitespace differs.

use billrecon_model::OrderFields;
use serde_json::Value;

use crate::error::{ReconError, Result};

/// Removes surrounding code fence markers and an optional language tag.
///
/// The tag is dropped after an opening fence, and also without a fence when
/// it is followed by whitespace or the opening brace (`json\n{...}`).
/// Other text is returned trimmed and otherwise unchanged.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let opened = trimmed.trim_start_matches('`');
    let fenced = opened.len() < trimmed.len();
    let untagged = opened.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let tagged = untagged.len() < opened.len();
    let body = if fenced || (tagged && untagged.starts_with(|c: char| c.is_whitespace() || c == '{'))
    {
        untagged
    } else {
        opened
    };
    body.trim_end_matches('`').trim()
}

/// Normalizes a payload key: trims it and replaces each run of whitespace
/// with a single `_`. Case is preserved.
pub fn normalize_key(key: &str) -> String {
    key.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Parses a raw extractor payload into order fields.
///
/// `null` values are treated as absent. When several keys normalize to the
/// same name, the first non-null one in payload order wins.
pub fn parse_order_fields(raw: &str) -> Result<OrderFields> {
    let body = strip_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| ReconError::MalformedPayload {
        message: e.to_string(),
    })?;
    let Value::Object(map) = value else {
        return Err(ReconError::MalformedPayload {
            message: format!("expected a JSON object, found {}", json_kind(&value)),
        });
    };

    let mut fields = OrderFields::default();
    for (raw_key, value) in map {
        if value.is_null() {
            continue;
        }
        let key = normalize_key(&raw_key);
        match fields.known_field_mut(&key) {
            Some(slot) => {
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
            None => {
                fields.extra.entry(key).or_insert(value);
            }
        }
    }

    tracing::debug!(
        vessel_name = fields.vessel_name(),
        vessel_number = fields.vessel_number().as_deref(),
        billing_counterpart = fields.billing_counterpart(),
        extra_fields = fields.extra.len(),
        "Parsed order fields"
    );
    Ok(fields)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
