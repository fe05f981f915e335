//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Upper bound on extraction worker threads, whatever the CPU count.
pub const MAX_WORKERS_CAP: usize = 8;

/// File extensions (lowercase, with dot) accepted by the pipeline.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".eml", ".msg"];

/// Attachment extensions worth looking at for text content.
/// Only .txt, .html/.htm and .pdf actually yield text today.
pub const EXTRACTABLE_ATTACHMENTS: &[&str] =
    &[".pdf", ".txt", ".doc", ".docx", ".rtf", ".html", ".htm"];

/// Placeholder for header fields the thread splitter could not find.
pub const NOT_FOUND: &str = "Not found";

/// Cleaned text must be longer than this before an LLM call is worth it.
pub const MIN_AI_TEXT_LEN: usize = 100;

/// Per-email content budget in LLM prompts.
pub const PROMPT_CONTENT_LIMIT: usize = 1000;

/// Per-email content budget in LLM prompts for long summaries.
pub const PROMPT_CONTENT_LIMIT_LONG: usize = 1200;

/// Line width used when rendering HTML bodies to plain text.
pub const HTML_RENDER_WIDTH: usize = 100;

// === Basic summary ===

/// Characters of the first email shown as a preview.
pub const PREVIEW_CHARS: usize = 300;

/// Maximum number of "important details" listed.
pub const MAX_IMPORTANT_DETAILS: usize = 5;

/// Maximum number of participants listed for a thread.
pub const MAX_PARTICIPANTS: usize = 5;

// === MSG fallback recovery ===

/// Maximum body lines recovered from an unparseable MSG file.
pub const MSG_FALLBACK_BODY_LINES: usize = 50;

/// Characters of raw text used when nothing structured was recovered.
pub const MSG_FALLBACK_RAW_CHARS: usize = 1000;

// === Batch processing ===

/// Number of files summarized concurrently by `summarize` with several inputs.
pub const FILE_CONCURRENCY: usize = 4;
