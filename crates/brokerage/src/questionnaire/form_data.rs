use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::steps::ContactDetails;
use crate::catalog::ServiceId;

pub const CONTACT_KEY: &str = "contact";

/// Top-level key of a form-data slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormKey {
    Service(ServiceId),
    Contact,
}

impl FormKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FormKey::Service(id) => id.key(),
            FormKey::Contact => CONTACT_KEY,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw == CONTACT_KEY {
            return Some(FormKey::Contact);
        }
        ServiceId::ALL
            .into_iter()
            .find(|id| id.key() == raw)
            .map(FormKey::Service)
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers accumulated across the questionnaire, one JSON object per service plus `contact`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    slices: BTreeMap<String, Map<String, Value>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later answers overwrite earlier fields with the same name.
    pub fn merge(&mut self, key: FormKey, fields: Map<String, Value>) {
        let slice = self.slices.entry(key.as_str().to_string()).or_default();
        for (name, value) in fields {
            slice.insert(name, value);
        }
    }

    pub fn slice(&self, key: FormKey) -> Option<&Map<String, Value>> {
        self.slices.get(key.as_str())
    }

    pub fn remove(&mut self, key: FormKey) -> Option<Map<String, Value>> {
        self.slices.remove(key.as_str())
    }

    pub fn contact(&self) -> Option<ContactDetails> {
        self.slice(FormKey::Contact)
            .and_then(|fields| serde_json::from_value(Value::Object(fields.clone())).ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// First key that is neither `contact` nor one of `allowed`.
    pub fn stray_key(&self, allowed: &[ServiceId]) -> Option<String> {
        self.slices
            .keys()
            .find(|raw| match FormKey::parse(raw) {
                Some(FormKey::Contact) => false,
                Some(FormKey::Service(id)) => !allowed.contains(&id),
                None => true,
            })
            .cloned()
    }

    /// Drops every slice outside `allowed` and `contact`.
    pub fn retain_services(&mut self, allowed: &[ServiceId]) {
        self.slices.retain(|raw, _| match FormKey::parse(raw) {
            Some(FormKey::Contact) => true,
            Some(FormKey::Service(id)) => allowed.contains(&id),
            None => false,
        });
    }
}
