use std::fmt;

use serde::Serialize;

use crate::constants::NOT_FOUND;

/// Input file kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Pdf,
    Eml,
    Msg,
}

impl SourceFormat {
    /// Match a lowercase extension including the dot (".pdf")
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".pdf" => Some(Self::Pdf),
            ".eml" => Some(Self::Eml),
            ".msg" => Some(Self::Msg),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Eml => "eml",
            Self::Msg => "msg",
        })
    }
}

/// One message of a thread, as handed to the summarizers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEmail {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl ParsedEmail {
    /// An email with every header unknown
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            subject: NOT_FOUND.to_string(),
            from: NOT_FOUND.to_string(),
            to: NOT_FOUND.to_string(),
            date: NOT_FOUND.to_string(),
            content: content.into(),
            cc: None,
            message_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

/// A whole .eml or .msg file: headers, body and attachments
#[derive(Debug, Clone, PartialEq)]
pub struct EmailDocument {
    pub format: SourceFormat,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub date: String,
    pub message_id: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl EmailDocument {
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            subject: String::new(),
            from: String::new(),
            to: String::new(),
            cc: String::new(),
            date: String::new(),
            message_id: String::new(),
            content: String::new(),
            attachments: Vec::new(),
        }
    }

    /// Flatten into a single email. Extracted attachment text is appended
    /// to the body so the summarizers see it.
    pub fn into_email(self) -> ParsedEmail {
        let attachment_texts: Vec<String> = self
            .attachments
            .iter()
            .filter_map(|att| {
                att.extracted_text
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .map(|text| format!("\n--- Attachment: {} ---\n{}", att.filename, text))
            })
            .collect();

        let mut content = self.content;
        if !attachment_texts.is_empty() {
            content.push_str("\n\n");
            content.push_str(&attachment_texts.join("\n"));
        }

        ParsedEmail {
            subject: self.subject,
            from: self.from,
            to: self.to,
            date: self.date,
            content,
            cc: Some(self.cc).filter(|s| !s.is_empty()),
            message_id: Some(self.message_id).filter(|s| !s.is_empty()),
        }
    }
}
