//! Fields extracted from a single order document.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical field keys as they appear after key normalization.
pub mod field {
    pub const BILLING_COUNTERPART: &str = "billing_counterpart";
    pub const ORDERING_PARTY: &str = "ordering_party";
    pub const BILLING_INSTRUCTIONS: &str = "billing_instructions";
    pub const SPECIAL_POSTAL_ADDRESS: &str = "special_postal_address";
    pub const BILLING_ADDRESS_FULL: &str = "billing_address_full";
    pub const VESSEL_NAME: &str = "vessel_name";
    pub const VESSEL_NUMBER: &str = "vessel_number";
}

/// Normalized order fields.
///
/// A field that was missing or `null` in the payload is `None`; it is never
/// represented as an empty string. Known fields keep the payload value as
/// written (a vessel number may arrive as `8423154` or `"8423154"`), so the
/// persisted record mirrors what the extractor produced. Keys the extractor
/// produced that are not one of the known fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_counterpart: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering_party: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_instructions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_postal_address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address_full: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_number: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OrderFields {
    /// Returns the slot for a known field key, or `None` for unknown keys.
    pub fn known_field_mut(&mut self, key: &str) -> Option<&mut Option<Value>> {
        match key {
            field::BILLING_COUNTERPART => Some(&mut self.billing_counterpart),
            field::ORDERING_PARTY => Some(&mut self.ordering_party),
            field::BILLING_INSTRUCTIONS => Some(&mut self.billing_instructions),
            field::SPECIAL_POSTAL_ADDRESS => Some(&mut self.special_postal_address),
            field::BILLING_ADDRESS_FULL => Some(&mut self.billing_address_full),
            field::VESSEL_NAME => Some(&mut self.vessel_name),
            field::VESSEL_NUMBER => Some(&mut self.vessel_number),
            _ => None,
        }
    }

    /// Looks up any field by its normalized key, as written in the payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let known = match key {
            field::BILLING_COUNTERPART => &self.billing_counterpart,
            field::ORDERING_PARTY => &self.ordering_party,
            field::BILLING_INSTRUCTIONS => &self.billing_instructions,
            field::SPECIAL_POSTAL_ADDRESS => &self.special_postal_address,
            field::BILLING_ADDRESS_FULL => &self.billing_address_full,
            field::VESSEL_NAME => &self.vessel_name,
            field::VESSEL_NUMBER => &self.vessel_number,
            _ => return self.extra.get(key),
        };
        known.as_ref()
    }

    /// Returns a string value when it is present and not blank.
    ///
    /// Non-string values are never used as text.
    pub fn non_blank(value: Option<&Value>) -> Option<&str> {
        match value {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn billing_counterpart(&self) -> Option<&str> {
        Self::non_blank(self.billing_counterpart.as_ref())
    }

    pub fn billing_address_full(&self) -> Option<&str> {
        Self::non_blank(self.billing_address_full.as_ref())
    }

    pub fn vessel_name(&self) -> Option<&str> {
        Self::non_blank(self.vessel_name.as_ref())
    }

    /// The vessel number as trimmed text. Strings and numbers are accepted.
    pub fn vessel_number(&self) -> Option<Cow<'_, str>> {
        match self.vessel_number.as_ref()? {
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            other => Self::non_blank(Some(other)).map(|s| Cow::Borrowed(s.trim())),
        }
    }
}
