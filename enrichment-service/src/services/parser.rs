//! Line-based extraction of labeled fields from LLM replies.
//!
//! Replies look like `"Username: alice\nUTR: 123456"`, sometimes wrapped in
//! markdown bullets or bold markers. Each line is matched against the
//! labels of the requested fields; the value is whatever follows the last
//! `:` on that line.

use pipeline_core::ExtractedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyField {
    Username,
    Utr,
    TransactionId,
    TransactionAmount,
}

impl ReplyField {
    /// Fields requested from the email body.
    pub const EMAIL: [ReplyField; 2] = [ReplyField::Username, ReplyField::Utr];

    /// Fields requested from the receipt text.
    pub const RECEIPT: [ReplyField; 2] = [ReplyField::TransactionId, ReplyField::TransactionAmount];

    /// Substrings that mark a line as carrying this field.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Username => &["Username"],
            Self::Utr => &["UTR", "Transaction Reference Number"],
            Self::TransactionId => &["Transaction ID"],
            Self::TransactionAmount => &["Transaction Amount"],
        }
    }

    fn slot<'a>(&self, record: &'a mut ExtractedRecord) -> &'a mut Option<String> {
        match self {
            Self::Username => &mut record.username,
            Self::Utr => &mut record.utr,
            Self::TransactionId => &mut record.transaction_id,
            Self::TransactionAmount => &mut record.transaction_amount,
        }
    }
}

/// Parse `reply` for `fields`. Fields with no non-empty value stay `None`;
/// when several lines match, the last non-empty value wins.
pub fn parse_reply(reply: &str, fields: &[ReplyField]) -> ExtractedRecord {
    let mut record = ExtractedRecord::default();

    for line in reply.lines() {
        for field in fields {
            if !field.labels().iter().any(|label| line.contains(label)) {
                continue;
            }
            if let Some(value) = line_value(line) {
                *field.slot(&mut record) = Some(value);
            }
        }
    }

    record
}

fn line_value(line: &str) -> Option<String> {
    let raw = line.rsplit(':').next().unwrap_or(line);
    let value = raw.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '-');
    (!value.is_empty()).then(|| value.to_string())
}
