//! The address lookup seam.
//!
//! The engine never calls a lookup service itself. The surrounding application does,
//! shows the matches, and feeds the chosen one back into the address field's sub-fields
//! through [`AddressMatch::form_data`].

use crate::error::LookupError;
use crate::state::FormData;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub(crate) static POSTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").expect("POSTCODE_REGEX: invalid regex pattern")
});

/// One address returned for a postcode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressMatch {
    /// Unique property reference number.
    pub uprn: String,
    /// The full address on one line, for choosing from a list.
    pub address: String,
    pub premises: String,
    pub street: String,
    pub locality: String,
    pub town: String,
    pub postcode: String,
}

impl AddressMatch {
    /// Builds a match from an Ordnance Survey Places `DPA` record.
    ///
    /// Premises falls back from the building number to the building name.
    pub fn from_places_record(record: &Value) -> Option<Self> {
        let text = |key: &str| {
            record
                .get(key)
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default()
        };
        let uprn = text("UPRN");
        if uprn.is_empty() {
            return None;
        }
        let premises = Some(text("BUILDING_NUMBER"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| text("BUILDING_NAME"));
        Some(Self {
            uprn,
            address: text("ADDRESS"),
            premises,
            street: text("THOROUGHFARE_NAME"),
            locality: text("DEPENDENT_LOCALITY"),
            town: text("POST_TOWN"),
            postcode: text("POSTCODE"),
        })
    }

    /// The form data that selects this match in the address field `field_name`.
    pub fn form_data(&self, field_name: &str) -> FormData {
        [
            ("premises", &self.premises),
            ("street", &self.street),
            ("locality", &self.locality),
            ("town", &self.town),
            ("postcode", &self.postcode),
        ]
        .into_iter()
        .map(|(part, value)| (format!("{}__{}", field_name, part), Value::String(value.clone())))
        .collect()
    }
}

/// Finds addresses by postcode. Implemented by the embedding application.
pub trait AddressLookup {
    fn lookup(&self, postcode: &str) -> Result<Vec<AddressMatch>, LookupError>;
}

/// Trims and upper-cases a postcode, rejecting anything that is not shaped like one.
pub fn normalise_postcode(postcode: &str) -> Result<String, LookupError> {
    let trimmed = postcode.trim().to_uppercase();
    if POSTCODE_REGEX.is_match(&trimmed) {
        Ok(trimmed)
    } else {
        Err(LookupError::InvalidPostcode(postcode.to_string()))
    }
}
