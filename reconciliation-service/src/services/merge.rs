//! Field-by-field merge policy for account records.
//!
//! Every known field has exactly one policy in [`MERGE_POLICY`]; fields in
//! the open attribute bag all follow [`ATTRIBUTE_POLICY`].

use crate::models::AccountRecord;
use crate::services::amount::render_amount;
use pipeline_core::ExtractedRecord;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Username,
    TransactionAmount,
    Utr,
    TransactionId,
}

impl AccountField {
    pub const ALL: [AccountField; 4] = [
        AccountField::Username,
        AccountField::TransactionAmount,
        AccountField::Utr,
        AccountField::TransactionId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::TransactionAmount => "transaction_amount",
            Self::Utr => "utr",
            Self::TransactionId => "transaction_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Primary key; set once at creation.
    NeverOverwrite,
    /// Running total of normalized amounts.
    Accumulate,
    /// Last write wins when the incoming record carries a value.
    AlwaysOverwrite,
}

pub const MERGE_POLICY: [(AccountField, FieldPolicy); 4] = [
    (AccountField::Username, FieldPolicy::NeverOverwrite),
    (AccountField::TransactionAmount, FieldPolicy::Accumulate),
    (AccountField::Utr, FieldPolicy::AlwaysOverwrite),
    (AccountField::TransactionId, FieldPolicy::AlwaysOverwrite),
];

pub const ATTRIBUTE_POLICY: FieldPolicy = FieldPolicy::AlwaysOverwrite;

pub fn policy_for(field: AccountField) -> FieldPolicy {
    MERGE_POLICY
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, policy)| *policy)
        .unwrap_or(FieldPolicy::AlwaysOverwrite)
}

/// Apply `incoming` to `account` according to the policy table.
///
/// `total` is the already-accumulated amount; it is only written to fields
/// whose policy is [`FieldPolicy::Accumulate`].
pub fn merge_into(account: &mut AccountRecord, incoming: &ExtractedRecord, total: Decimal) {
    for (field, policy) in MERGE_POLICY {
        match policy {
            FieldPolicy::NeverOverwrite => {}
            FieldPolicy::Accumulate => set_field(account, field, render_amount(total)),
            FieldPolicy::AlwaysOverwrite => {
                if let Some(value) = incoming_value(incoming, field) {
                    set_field(account, field, value.to_string());
                }
            }
        }
    }

    if ATTRIBUTE_POLICY == FieldPolicy::AlwaysOverwrite {
        for (key, value) in &incoming.extra {
            if !value.is_null() {
                account.attributes.insert(key.clone(), value.clone());
            }
        }
    }
}

fn incoming_value(record: &ExtractedRecord, field: AccountField) -> Option<&str> {
    match field {
        AccountField::Username => record.key(),
        AccountField::TransactionAmount => record.transaction_amount.as_deref(),
        AccountField::Utr => record.utr.as_deref(),
        AccountField::TransactionId => record.transaction_id.as_deref(),
    }
}

fn set_field(account: &mut AccountRecord, field: AccountField, value: String) {
    match field {
        AccountField::Username => account.username = value,
        AccountField::TransactionAmount => account.transaction_amount = value,
        AccountField::Utr => account.utr = Some(value),
        AccountField::TransactionId => account.transaction_id = Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn incoming() -> ExtractedRecord {
        let mut record = ExtractedRecord {
            username: Some("mallory".to_string()),
            utr: Some("UTR-2".to_string()),
            transaction_id: None,
            transaction_amount: Some("£50.5".to_string()),
            ..Default::default()
        };
        record.extra.insert("bank".to_string(), json!("SBI"));
        record.extra.insert("cleared".to_string(), serde_json::Value::Null);
        record
    }

    #[test]
    fn every_field_has_exactly_one_policy() {
        for field in AccountField::ALL {
            let count = MERGE_POLICY.iter().filter(|(f, _)| *f == field).count();
            assert_eq!(count, 1, "{} has {} policies", field.as_str(), count);
        }
    }

    #[test]
    fn key_and_amount_policies_are_fixed() {
        assert_eq!(
            policy_for(AccountField::Username),
            FieldPolicy::NeverOverwrite
        );
        assert_eq!(
            policy_for(AccountField::TransactionAmount),
            FieldPolicy::Accumulate
        );
    }

    #[test]
    fn merge_overwrites_scalars_but_not_the_key() {
        let mut account = AccountRecord::new("alice", "100.0");
        account.utr = Some("UTR-1".to_string());
        account.transaction_id = Some("TXN-1".to_string());
        account.attributes.insert("bank".to_string(), json!("HDFC"));
        account.attributes.insert("cleared".to_string(), json!(true));

        merge_into(&mut account, &incoming(), Decimal::from_str("150.5").unwrap());

        assert_eq!(account.username, "alice");
        assert_eq!(account.transaction_amount, "150.5");
        assert_eq!(account.utr.as_deref(), Some("UTR-2"));
        // Absent on the incoming record, so the previous value stays.
        assert_eq!(account.transaction_id.as_deref(), Some("TXN-1"));
        assert_eq!(account.attributes.get("bank"), Some(&json!("SBI")));
        assert_eq!(account.attributes.get("cleared"), Some(&json!(true)));
    }
}
