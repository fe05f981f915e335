use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SummaryType;
use crate::mail::{ParsedEmail, SourceFormat};

/// Which summarizer produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    Ai,
    Basic,
}

/// Result of summarizing one file
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub success: bool,
    pub source: PathBuf,
    pub email_count: usize,
    pub summary: String,
    pub summary_type: SummaryType,
    pub method: SummaryMethod,
    /// Length in characters of the cleaned text that was summarized
    pub raw_text_length: usize,
    pub emails: Vec<ParsedEmail>,
    /// Only set for .eml and .msg inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<SourceFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments_count: Option<usize>,
    pub generated_at: DateTime<Utc>,
}
