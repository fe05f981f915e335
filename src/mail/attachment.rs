use std::path::Path;

use crate::constants::{EXTRACTABLE_ATTACHMENTS, HTML_RENDER_WIDTH};
use crate::extract::PdfExtractor;

use super::types::Attachment;

/// Convert HTML to readable plain text
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), HTML_RENDER_WIDTH)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to render HTML: {}", e);
            String::new()
        })
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Text content of an attachment, for the formats we can read.
///
/// Unreadable formats give None. A PDF that fails to load gives a short
/// bracketed error note instead, so the summary still mentions it.
pub fn extract_attachment_text(
    filename: &str,
    data: &[u8],
    pdf: &PdfExtractor,
) -> Option<String> {
    let ext = extension(filename)?;
    if !EXTRACTABLE_ATTACHMENTS.contains(&ext.as_str()) {
        return None;
    }

    let text = match ext.as_str() {
        ".txt" => String::from_utf8_lossy(data).into_owned(),
        ".html" | ".htm" => html_to_text(&String::from_utf8_lossy(data)),
        ".pdf" => match pdf.extract_text_from_bytes(data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to extract text from attachment {}: {}", filename, e);
                return Some(format!("[Error extracting text from {filename}: {e}]"));
            }
        },
        // .doc, .docx and .rtf are listed but not decoded
        _ => return None,
    };

    Some(text).filter(|t| !t.trim().is_empty())
}

/// Record an attachment, extracting its text where possible
pub fn build_attachment(
    filename: &str,
    content_type: &str,
    data: &[u8],
    pdf: &PdfExtractor,
) -> Attachment {
    Attachment {
        filename: filename.to_string(),
        content_type: content_type.to_string(),
        size: data.len(),
        extracted_text: extract_attachment_text(filename, data, pdf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::OcrEngine;

    fn extractor() -> PdfExtractor {
        PdfExtractor::new(1, OcrEngine::disabled())
    }

    #[test]
    fn test_text_attachment() {
        let att = build_attachment(
            "Notes.TXT",
            "text/plain",
            b"Deadline: 06/30/2025",
            &extractor(),
        );
        assert_eq!(att.size, 20);
        assert_eq!(att.extracted_text.as_deref(), Some("Deadline: 06/30/2025"));
    }

    #[test]
    fn test_html_attachment() {
        let html = b"<html><body><p>Budget <b>approved</b></p></body></html>";
        let text = extract_attachment_text("memo.html", html, &extractor()).unwrap();
        assert!(text.contains("Budget"));
        assert!(text.contains("approved"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_html_to_text_renders_markup() {
        let text = html_to_text("<div><h1>Offsite</h1><ul><li>Room booked</li></ul></div>\n");
        assert!(text.contains("Offsite"));
        assert!(text.contains("Room booked"));
        assert!(!text.contains("<li>"));
        assert_eq!(text, text.trim());
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_unreadable_formats() {
        assert_eq!(extract_attachment_text("photo.png", b"\x89PNG", &extractor()), None);
        assert_eq!(extract_attachment_text("spec.docx", b"PK\x03\x04", &extractor()), None);
        assert_eq!(extract_attachment_text("no_extension", b"text", &extractor()), None);
        assert_eq!(extract_attachment_text("empty.txt", b"  \n", &extractor()), None);
    }

    #[test]
    fn test_broken_pdf_attachment_notes_error() {
        let text = extract_attachment_text("scan.pdf", b"not a pdf", &extractor()).unwrap();
        assert!(text.starts_with("[Error extracting text from scan.pdf:"));
    }
}
