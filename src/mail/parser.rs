use mail_parser::{Address, Message, MessageParser, MimeHeaders, PartType};

use super::attachment::{build_attachment, html_to_text};
use super::types::{EmailDocument, SourceFormat};
use crate::error::{Result, SummarizeError};
use crate::extract::PdfExtractor;

/// Parse a raw RFC 5322 message (.eml file).
///
/// Headers are returned decoded. The body is every text part, with HTML
/// parts rendered to plain text, joined by blank lines. Named attachments
/// are recorded and their text extracted where the format allows.
pub fn parse_eml(raw: &[u8], pdf: &PdfExtractor) -> Result<EmailDocument> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| SummarizeError::Eml("not a valid RFC 5322 message".to_string()))?;

    let mut doc = EmailDocument::new(SourceFormat::Eml);
    doc.subject = message.subject().unwrap_or_default().trim().to_string();
    doc.from = format_addresses(message.from());
    doc.to = format_addresses(message.to());
    doc.cc = format_addresses(message.cc());
    doc.date = message
        .header_raw("Date")
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    doc.message_id = message.message_id().unwrap_or_default().to_string();
    doc.content = extract_body(&message);

    doc.attachments = message
        .attachments()
        .filter_map(|part| {
            let Some(name) = part.attachment_name() else {
                tracing::debug!("Skipping unnamed attachment");
                return None;
            };
            let content_type = part
                .content_type()
                .map(|ct| match ct.subtype() {
                    Some(sub) => format!("{}/{}", ct.ctype(), sub),
                    None => ct.ctype().to_string(),
                })
                .unwrap_or_else(|| "application/octet-stream".to_string());
            Some(build_attachment(name, &content_type, part.contents(), pdf))
        })
        .collect();

    Ok(doc)
}

fn extract_body(message: &Message) -> String {
    let mut parts: Vec<String> = message
        .text_bodies()
        .filter_map(|part| match &part.body {
            PartType::Text(text) => Some(text.to_string()),
            PartType::Html(html) => Some(html_to_text(html)),
            _ => None,
        })
        .collect();

    // Fallback: HTML-only messages whose text body list came back empty
    if parts.is_empty() {
        parts = message
            .html_bodies()
            .filter_map(|part| match &part.body {
                PartType::Html(html) => Some(html_to_text(html)),
                _ => None,
            })
            .collect();
    }

    parts.join("\n\n")
}

/// "Name <addr>, addr2" style rendering of an address header
fn format_addresses(addresses: Option<&Address>) -> String {
    let Some(addresses) = addresses else {
        return String::new();
    };

    addresses
        .iter()
        .filter_map(|addr| match (addr.name(), addr.address()) {
            (Some(name), Some(address)) => Some(format!("{} <{}>", name, address)),
            (None, Some(address)) => Some(address.to_string()),
            (Some(name), None) => Some(name.to_string()),
            (None, None) => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::OcrEngine;

    fn extractor() -> PdfExtractor {
        PdfExtractor::new(1, OcrEngine::disabled())
    }

    #[test]
    fn test_parse_simple_email() {
        let raw = b"From: Sender Name <sender@example.com>\r\n\
                    To: recipient@example.com, other@example.com\r\n\
                    Subject: Test Email\r\n\
                    Date: Mon, 1 Jan 2024 12:00:00 +0000\r\n\
                    Message-ID: <test@example.com>\r\n\
                    \r\n\
                    Hello, this is a test email.";

        let doc = parse_eml(raw, &extractor()).unwrap();
        assert_eq!(doc.format, SourceFormat::Eml);
        assert_eq!(doc.subject, "Test Email");
        assert_eq!(doc.from, "Sender Name <sender@example.com>");
        assert_eq!(doc.to, "recipient@example.com, other@example.com");
        assert_eq!(doc.date, "Mon, 1 Jan 2024 12:00:00 +0000");
        assert_eq!(doc.message_id, "test@example.com");
        assert!(doc.content.contains("Hello, this is a test email."));
        assert!(doc.attachments.is_empty());
    }

    #[test]
    fn test_encoded_subject_is_decoded() {
        let raw = b"From: a@example.com\r\n\
                    Subject: =?UTF-8?B?UsOpdW5pb24gZGUgYnVkZ2V0?=\r\n\
                    \r\n\
                    body";

        let doc = parse_eml(raw, &extractor()).unwrap();
        assert_eq!(doc.subject, "R\u{e9}union de budget");
    }

    #[test]
    fn test_html_only_body_is_rendered() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Newsletter\r\n\
                    Content-Type: text/html; charset=utf-8\r\n\
                    \r\n\
                    <html><body><p>Launch moved to <b>Friday</b></p></body></html>";

        let doc = parse_eml(raw, &extractor()).unwrap();
        assert!(doc.content.contains("Launch moved to"));
        assert!(!doc.content.contains("<p>"));
    }

    #[test]
    fn test_multipart_with_text_attachment() {
        let raw = b"From: pm@example.com\r\n\
                    To: team@example.com\r\n\
                    Subject: Project notes\r\n\
                    MIME-Version: 1.0\r\n\
                    Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
                    \r\n\
                    --XYZ\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    \r\n\
                    Please review the attached notes.\r\n\
                    --XYZ\r\n\
                    Content-Type: text/plain; name=\"notes.txt\"\r\n\
                    Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
                    \r\n\
                    Deploy by 07/01/2025.\r\n\
                    --XYZ--\r\n";

        let doc = parse_eml(raw, &extractor()).unwrap();
        assert!(doc.content.contains("Please review the attached notes."));
        assert!(!doc.content.contains("Deploy by"));
        assert_eq!(doc.attachments.len(), 1);
        assert_eq!(doc.attachments[0].filename, "notes.txt");
        assert_eq!(doc.attachments[0].content_type, "text/plain");
        assert!(
            doc.attachments[0]
                .extracted_text
                .as_deref()
                .unwrap()
                .contains("Deploy by 07/01/2025.")
        );

        let email = doc.into_email();
        assert!(email.content.contains("--- Attachment: notes.txt ---"));
    }
}
