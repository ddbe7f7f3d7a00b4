//! Splitting a parsed MIME message into body text and attachments.

use mailparse::{DispositionType, MailHeaderMap, MailParseError, ParsedMail};

/// A file carried by the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as declared by the sender, not yet sanitized.
    pub filename: String,
    pub content: Vec<u8>,
}

/// What the pipeline keeps from one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParts {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Extract the first `text/plain` body and every named inline or attached
/// part. A single-part message is all body, whatever its content type.
pub fn split_message(mail: &ParsedMail) -> Result<MessageParts, MailParseError> {
    let mut parts = MessageParts {
        subject: mail.headers.get_first_value("Subject"),
        from: mail.headers.get_first_value("From"),
        ..Default::default()
    };

    if mail.subparts.is_empty() {
        parts.body = Some(mail.get_body()?);
    } else {
        walk(mail, &mut parts)?;
    }

    Ok(parts)
}

fn walk(part: &ParsedMail, parts: &mut MessageParts) -> Result<(), MailParseError> {
    if let Some(filename) = attachment_name(part) {
        parts.attachments.push(Attachment {
            filename,
            content: part.get_body_raw()?,
        });
    } else if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") && parts.body.is_none() {
        parts.body = Some(part.get_body()?);
    }

    for sub in &part.subparts {
        walk(sub, parts)?;
    }
    Ok(())
}

/// File name of a part with an explicit `inline` or `attachment` disposition.
fn attachment_name(part: &ParsedMail) -> Option<String> {
    // mailparse reports `inline` when the header is missing altogether.
    part.headers.get_first_value("Content-Disposition")?;

    let disposition = part.get_content_disposition();
    if !matches!(
        disposition.disposition,
        DispositionType::Inline | DispositionType::Attachment
    ) {
        return None;
    }

    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailparse::parse_mail;

    const MULTIPART: &str = "From: Payments <payments@example.com>\r\n\
Subject: Payment received\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: multipart/alternative; boundary=\"ALT\"\r\n\
\r\n\
--ALT\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Username: alice\r\n\
--ALT\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Username: alice</p>\r\n\
--ALT--\r\n\
--XYZ\r\n\
Content-Type: text/plain; name=\"notes.txt\"\r\n\
Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
\r\n\
second text part\r\n\
--XYZ\r\n\
Content-Type: image/png\r\n\
Content-Disposition: inline; filename=\"receipt.png\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
--XYZ--\r\n";

    #[test]
    fn multipart_message_yields_body_and_named_parts() {
        let mail = parse_mail(MULTIPART.as_bytes()).unwrap();
        let parts = split_message(&mail).unwrap();

        assert_eq!(parts.subject.as_deref(), Some("Payment received"));
        assert_eq!(
            parts.from.as_deref(),
            Some("Payments <payments@example.com>")
        );
        assert_eq!(parts.body.as_deref().map(str::trim), Some("Username: alice"));

        let names: Vec<&str> = parts
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec!["notes.txt", "receipt.png"]);
        assert_eq!(
            parts.attachments[1].content,
            vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']
        );
    }

    #[test]
    fn single_part_message_is_all_body() {
        let raw = "Subject: hi\r\nContent-Type: text/plain\r\n\r\nUTR 1234\r\n";
        let mail = parse_mail(raw.as_bytes()).unwrap();
        let parts = split_message(&mail).unwrap();

        assert_eq!(parts.body.as_deref().map(str::trim), Some("UTR 1234"));
        assert!(parts.attachments.is_empty());
    }

    #[test]
    fn parts_without_disposition_are_not_attachments() {
        let raw = "Content-Type: multipart/mixed; boundary=\"B\"\r\n\
\r\n\
--B\r\n\
Content-Type: image/png; name=\"logo.png\"\r\n\
\r\n\
xx\r\n\
--B--\r\n";
        let mail = parse_mail(raw.as_bytes()).unwrap();
        let parts = split_message(&mail).unwrap();

        assert!(parts.body.is_none());
        assert!(parts.attachments.is_empty());
    }
}
