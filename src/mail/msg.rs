//! Outlook .msg files.
//!
//! MSG is an OLE compound document holding MAPI properties. Well-formed
//! files go through `msg_parser`. Files it rejects, or that lack the OLE
//! signature, get a best-effort recovery that scans the raw bytes for
//! printable text and header-like lines.

use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use msg_parser::Outlook;
use regex::Regex;

use super::attachment::build_attachment;
use super::types::{EmailDocument, SourceFormat};
use crate::constants::{MSG_FALLBACK_BODY_LINES, MSG_FALLBACK_RAW_CHARS};
use crate::error::{Result, SummarizeError};
use crate::extract::PdfExtractor;

const OLE_SIGNATURE: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

/// Shortest printable run kept when scanning raw bytes
const MIN_RUN: usize = 4;

static SUBJECT_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?i)Subject:[ \t]*([^\r\n]+)"]));

static FROM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)From:[ \t]*([^\r\n]+)",
        r"(?i)Sender:[ \t]*([^\r\n]+)",
        r"<([^@\s<>]+@[^\s<>]+)>",
    ])
});

static TO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)To:[ \t]*([^\r\n]+)",
        r"(?i)Recipients?:[ \t]*([^\r\n]+)",
    ])
});

static HEX_DUMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-F0-9\s]+$").expect("hex pattern is valid"));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("msg header patterns are valid"))
        .collect()
}

/// Parse a .msg file, falling back to raw text recovery when the
/// structured parse fails.
pub fn parse_msg(path: &Path, pdf: &PdfExtractor) -> Result<EmailDocument> {
    let raw = std::fs::read(path)?;

    if !raw.starts_with(OLE_SIGNATURE) {
        tracing::info!(
            "{} has no OLE signature, recovering text heuristically",
            path.display()
        );
        return recover_from_bytes(&raw);
    }

    match Outlook::from_path(path) {
        Ok(outlook) => Ok(outlook_to_document(outlook, pdf)),
        Err(e) => {
            tracing::warn!("Structured MSG parse failed ({}), recovering text", e);
            recover_from_bytes(&raw)
        }
    }
}

fn outlook_to_document(outlook: Outlook, pdf: &PdfExtractor) -> EmailDocument {
    let mut doc = EmailDocument::new(SourceFormat::Msg);
    doc.subject = outlook.subject.trim().to_string();
    doc.from = format_person(&outlook.sender.name, &outlook.sender.email);
    doc.to = join_people(outlook.to.iter().map(|p| format_person(&p.name, &p.email)));
    doc.cc = join_people(outlook.cc.iter().map(|p| format_person(&p.name, &p.email)));
    doc.date = outlook.headers.date.trim().to_string();
    doc.content = outlook.body.trim().to_string();

    doc.attachments = outlook
        .attachments
        .iter()
        .map(|att| {
            let filename = if att.file_name.is_empty() {
                &att.display_name
            } else {
                &att.file_name
            };
            let content_type = if att.mime_tag.is_empty() {
                "application/octet-stream"
            } else {
                att.mime_tag.as_str()
            };
            build_attachment(filename, content_type, &decode_payload(&att.payload), pdf)
        })
        .collect();

    doc
}

fn format_person(name: &str, email: &str) -> String {
    match (name.trim(), email.trim()) {
        ("", email) => email.to_string(),
        (name, "") => name.to_string(),
        (name, email) if name == email => email.to_string(),
        (name, email) => format!("{} <{}>", name, email),
    }
}

fn join_people(people: impl Iterator<Item = String>) -> String {
    people
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Attachment payloads come back as text: hex for binary properties,
/// base64 in some producers. Anything else is taken as-is.
fn decode_payload(payload: &str) -> Vec<u8> {
    let trimmed = payload.trim();

    if !trimmed.is_empty()
        && trimmed.len() % 2 == 0
        && trimmed.bytes().all(|b| b.is_ascii_hexdigit())
    {
        let decoded: Option<Vec<u8>> = (0..trimmed.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&trimmed[i..i + 2], 16).ok())
            .collect();
        if let Some(bytes) = decoded {
            return bytes;
        }
    }

    base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .unwrap_or_else(|_| payload.as_bytes().to_vec())
}

/// Header values and a body guessed from whatever readable text the file
/// contains.
fn recover_from_bytes(raw: &[u8]) -> Result<EmailDocument> {
    let text = readable_text(raw);
    if text.trim().is_empty() {
        return Err(SummarizeError::Msg(
            "could not extract readable text from MSG file".to_string(),
        ));
    }

    let mut doc = EmailDocument::new(SourceFormat::Msg);
    doc.subject = first_capture(&SUBJECT_PATTERNS, &text).unwrap_or_default();
    doc.from = first_capture(&FROM_PATTERNS, &text).unwrap_or_default();
    doc.to = first_capture(&TO_PATTERNS, &text).unwrap_or_default();

    let body_lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| looks_like_body(line))
        .take(MSG_FALLBACK_BODY_LINES)
        .collect();
    doc.content = body_lines.join("\n");

    if doc.subject.is_empty() && doc.content.is_empty() {
        let readable: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.chars().count() > 10 && alpha_ratio(line) > 0.3)
            .take(10)
            .collect();
        if let Some(first) = readable.first() {
            doc.subject = first.chars().take(100).collect();
            doc.content = readable.join("\n");
        }
    }

    if doc.subject.is_empty() {
        doc.subject = "MSG File".to_string();
    }
    if doc.from.is_empty() {
        doc.from = "Unknown".to_string();
    }
    if doc.content.is_empty() {
        doc.content = text.chars().take(MSG_FALLBACK_RAW_CHARS).collect();
    }

    Ok(doc)
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

fn looks_like_body(line: &str) -> bool {
    const HEADER_PREFIXES: &[&str] = &["From:", "To:", "Subject:", "Date:", "Message-ID:"];

    line.chars().count() > 20
        && !HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
        && !HEX_DUMP.is_match(line)
        && alpha_ratio(line) > 0.5
}

fn alpha_ratio(line: &str) -> f64 {
    let total = line.chars().count();
    if total == 0 {
        return 0.0;
    }
    line.chars().filter(|c| c.is_alphabetic()).count() as f64 / total as f64
}

/// Printable ASCII runs found in the bytes, read both as UTF-16LE (how MSG
/// stores Unicode string properties) and as single-byte text. Runs shorter
/// than four characters are noise and dropped.
fn readable_text(raw: &[u8]) -> String {
    let wide: Vec<u8> = raw
        .chunks_exact(2)
        .map(|pair| if pair[1] == 0 { pair[0] } else { 0 })
        .collect();

    let mut lines = printable_runs(&wide);
    lines.extend(printable_runs(raw));
    lines.join("\n")
}

fn printable_runs(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| !(b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\r' | b'\n')))
        .filter(|run| run.len() >= MIN_RUN)
        .map(|run| String::from_utf8_lossy(run).into_owned())
        .filter(|run| !run.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::OcrEngine;
    use std::io::Write;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_recover_headers_from_wide_strings() {
        let mut raw = vec![0x00, 0x01, 0x02, 0xff];
        raw.extend(utf16le("Subject: Vendor contract renewal\r\n"));
        raw.extend([0x00, 0x00, 0x07, 0x08]);
        raw.extend(utf16le("From: Legal Team <legal@example.com>\r\n"));
        raw.extend([0x03, 0x00, 0x00, 0x00]);
        raw.extend(utf16le(
            "Please review the renewal terms before the meeting on Thursday.\r\n",
        ));

        let doc = recover_from_bytes(&raw).unwrap();
        assert_eq!(doc.format, SourceFormat::Msg);
        assert_eq!(doc.subject, "Vendor contract renewal");
        assert_eq!(doc.from, "Legal Team <legal@example.com>");
        assert!(doc.content.contains("Please review the renewal terms"));
    }

    #[test]
    fn test_recover_without_headers_uses_readable_lines() {
        let raw = b"\x01\x02\x03\x04budget approved\x00\x00\x05";
        let doc = recover_from_bytes(raw).unwrap();
        assert_eq!(doc.subject, "budget approved");
        assert_eq!(doc.from, "Unknown");
        assert_eq!(doc.content, "budget approved");
    }

    #[test]
    fn test_recover_binary_noise_is_error() {
        let raw = [0x00u8, 0x01, 0x02, 0x03, 0xfe, 0xff, 0x10, 0x11];
        assert!(matches!(recover_from_bytes(&raw), Err(SummarizeError::Msg(_))));
    }

    #[test]
    fn test_hex_lines_are_not_body() {
        assert!(!looks_like_body("DEADBEEF 0011 2233 4455 6677 8899 AABB"));
        assert!(!looks_like_body("Subject: this line is long enough to count"));
        assert!(looks_like_body("The shipment arrives at the warehouse tomorrow"));
        // lowercase prose that happens to use only hex letters
        assert!(looks_like_body("a bad dead cafe faced a decade"));
    }

    #[test]
    fn test_decode_payload() {
        assert_eq!(decode_payload("48656c6c6f"), b"Hello");
        assert_eq!(decode_payload("SGVsbG8="), b"Hello");
        assert_eq!(decode_payload("plain text!"), b"plain text!");
    }

    #[test]
    fn test_format_person() {
        assert_eq!(
            format_person("Ann Lee", "ann@example.com"),
            "Ann Lee <ann@example.com>"
        );
        assert_eq!(format_person("", "ops@example.com"), "ops@example.com");
        assert_eq!(format_person("ops@example.com", "ops@example.com"), "ops@example.com");
        let people = ["A <a@x.io>".to_string(), String::new(), "b@x.io".to_string()];
        assert_eq!(join_people(people.into_iter()), "A <a@x.io>, b@x.io");
    }

    fn person(name: &str, email: &str) -> msg_parser::Person {
        msg_parser::Person {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn outlook_attachment(
        display_name: &str,
        file_name: &str,
        mime_tag: &str,
        payload: &str,
    ) -> msg_parser::Attachment {
        msg_parser::Attachment {
            display_name: display_name.to_string(),
            payload: payload.to_string(),
            extension: String::new(),
            mime_tag: mime_tag.to_string(),
            file_name: file_name.to_string(),
        }
    }

    #[test]
    fn test_outlook_fields_map_to_document() {
        let outlook = Outlook {
            headers: msg_parser::TransportHeaders {
                content_type: String::new(),
                date: " Tue, 4 Mar 2025 09:15:00 +0000 ".to_string(),
                message_id: String::new(),
                reply_to: String::new(),
            },
            sender: person("Ann Lee", "ann@example.com"),
            to: vec![person("Bob", "bob@example.com"), person("", "ops@example.com")],
            cc: vec![person("carol@example.com", "carol@example.com")],
            bcc: String::new(),
            subject: "  Q2 vendor review ".to_string(),
            body: "\nPlease send comments by Friday.\n".to_string(),
            rtf_compressed: String::new(),
            attachments: vec![
                // "Agenda" as hex
                outlook_attachment("Agenda", "agenda.txt", "text/plain", "4167656e6461"),
                outlook_attachment("notes.txt", "", "", "Tm90ZXM="),
                outlook_attachment("logo.png", "logo.png", "image/png", "89504e47"),
            ],
        };

        let pdf = PdfExtractor::new(1, OcrEngine::disabled());
        let doc = outlook_to_document(outlook, &pdf);

        assert_eq!(doc.format, SourceFormat::Msg);
        assert_eq!(doc.subject, "Q2 vendor review");
        assert_eq!(doc.from, "Ann Lee <ann@example.com>");
        assert_eq!(doc.to, "Bob <bob@example.com>, ops@example.com");
        assert_eq!(doc.cc, "carol@example.com");
        assert_eq!(doc.date, "Tue, 4 Mar 2025 09:15:00 +0000");
        assert_eq!(doc.content, "Please send comments by Friday.");

        assert_eq!(doc.attachments.len(), 3);
        assert_eq!(doc.attachments[0].filename, "agenda.txt");
        assert_eq!(doc.attachments[0].extracted_text.as_deref(), Some("Agenda"));
        assert_eq!(doc.attachments[1].filename, "notes.txt");
        assert_eq!(doc.attachments[1].content_type, "application/octet-stream");
        assert_eq!(doc.attachments[1].extracted_text.as_deref(), Some("Notes"));
        assert_eq!(doc.attachments[2].size, 4);
        assert_eq!(doc.attachments[2].extracted_text, None);

        let email = doc.into_email();
        assert!(email.content.contains("--- Attachment: agenda.txt ---\nAgenda"));
    }

    #[test]
    fn test_non_ole_file_is_recovered() {
        let mut file = tempfile::Builder::new().suffix(".msg").tempfile().unwrap();
        file.write_all(b"Subject: Exported note\nThis message was saved as plain text by a tool.\n")
            .unwrap();

        let pdf = PdfExtractor::new(1, OcrEngine::disabled());
        let doc = parse_msg(file.path(), &pdf).unwrap();
        assert_eq!(doc.subject, "Exported note");
        assert!(doc.content.contains("saved as plain text"));
    }
}
