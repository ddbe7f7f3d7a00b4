//! The structured record written by enrichment and read by reconciliation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields extracted for one unit of work.
///
/// The four known fields are typed; any other key in `output.json` lands in
/// `extra` untouched and is written back as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(default, deserialize_with = "scalar_text")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "scalar_text")]
    pub utr: Option<String>,

    #[serde(default, deserialize_with = "scalar_text")]
    pub transaction_id: Option<String>,

    #[serde(default, deserialize_with = "scalar_text")]
    pub transaction_amount: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ExtractedRecord {
    /// The username exactly as extracted, unless it is absent or blank.
    pub fn key(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Overlay `newer` on top of `self`: every value `newer` actually carries
    /// wins, anything it lacks keeps the current value.
    pub fn overlay(&mut self, newer: ExtractedRecord) {
        if newer.username.is_some() {
            self.username = newer.username;
        }
        if newer.utr.is_some() {
            self.utr = newer.utr;
        }
        if newer.transaction_id.is_some() {
            self.transaction_id = newer.transaction_id;
        }
        if newer.transaction_amount.is_some() {
            self.transaction_amount = newer.transaction_amount;
        }
        for (key, value) in newer.extra {
            if !value.is_null() {
                self.extra.insert(key, value);
            }
        }
    }
}

/// Accept strings, numbers and booleans for the known fields; LLM output is
/// not consistent about quoting amounts.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar value, found {}",
            other
        ))),
    }
}
