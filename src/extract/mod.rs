//! Text extraction from PDF exports of email threads.
//!
//! - `pdf`: native text layer via lopdf, one page per worker
//! - `ocr`: pdftoppm + tesseract for scanned documents
//! - `clean`: removal of page furniture before thread splitting

mod clean;
mod ocr;
mod pdf;

pub use clean::clean_email_text;
pub use ocr::OcrEngine;
pub use pdf::PdfExtractor;

#[cfg(test)]
pub(crate) use pdf::tests::make_pdf;

use crate::error::{Result, SummarizeError};

/// Bounded pool for page-level work. Callers collect with `par_iter`, which
/// keeps results in input order.
fn build_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("mailsum-extract-{i}"))
        .build()
        .map_err(|e| SummarizeError::WorkerPool(e.to_string()))
}
