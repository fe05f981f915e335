use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Shown when a PDF yields no text at all, usually a scanned document
/// on a machine without the OCR tools.
pub const NO_TEXT_HINT: &str = "Could not extract text from PDF. This appears to be an \
image-based PDF (scanned document). To process this type of PDF:\n\n\
1. Install Tesseract OCR (https://github.com/tesseract-ocr/tesseract)\n\
2. Install Poppler utilities (pdftoppm)\n\
3. Make sure both are on your PATH, or set extract.tesseract_cmd and \
extract.pdftoppm_cmd in the config file\n\n\
Alternatively, export your emails as text-based PDF, EML or MSG files.";

pub type Result<T> = std::result::Result<T, SummarizeError>;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format: {ext}. Supported formats: {supported}")]
    UnsupportedFormat { ext: String, supported: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to load PDF: {0}")]
    Pdf(String),

    #[error("{}", NO_TEXT_HINT)]
    NoTextExtracted,

    #[error("OCR tools unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Failed to parse .eml file: {0}")]
    Eml(String),

    #[error("Failed to parse .msg file: {0}")]
    Msg(String),

    #[error("No emails found in the file")]
    NoEmails,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}
