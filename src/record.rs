// src/record.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One phone/email/fax entry. A unit commonly lists several, so contacts are
/// an ordered list, never a map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub kind: String,
    pub value: String,
}

/// Address block of a detail record. Every field is optional; the rendered
/// panel rarely carries all of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.number.is_none()
            && self.complement.is_none()
            && self.district.is_none()
            && self.postal_code.is_none()
            && self.city.is_none()
            && self.state.is_none()
    }

    pub fn values(&self) -> impl Iterator<Item = &String> {
        [
            &self.street,
            &self.number,
            &self.complement,
            &self.district,
            &self.postal_code,
            &self.city,
            &self.state,
        ]
        .into_iter()
        .filter_map(|v| v.as_ref())
    }
}

/// Classified detail record of one organisational unit. Empty sections are
/// dropped from the JSON, matching the persisted file contract.
///
/// `error` and populated fields are not mutually exclusive: a node that failed
/// halfway may still carry partial data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decree: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub general: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Address::is_empty")]
    pub address: Address,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Record {
    pub fn failed(reason: impl Into<String>) -> Self {
        Record { error: Some(reason.into()), ..Record::default() }
    }

    /// True when no pass produced any classified field.
    pub fn has_no_fields(&self) -> bool {
        self.general.is_empty() && self.address.is_empty() && self.contacts.is_empty()
    }
}
