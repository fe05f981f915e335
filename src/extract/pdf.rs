//! PDF text extraction with per-page parallelism and OCR fallback.

use std::io::Write;
use std::path::Path;

use lopdf::Document;
use rayon::prelude::*;

use super::build_pool;
use super::ocr::OcrEngine;
use crate::config::clamp_workers;
use crate::error::{Result, SummarizeError};

enum PdfSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

#[derive(Debug, Clone)]
pub struct PdfExtractor {
    max_workers: usize,
    ocr: OcrEngine,
}

impl PdfExtractor {
    pub fn new(max_workers: usize, ocr: OcrEngine) -> Self {
        Self {
            max_workers: clamp_workers(max_workers),
            ocr,
        }
    }

    /// Set the worker count, clamped to 1..=8
    pub fn set_max_workers(&mut self, max_workers: usize) {
        self.max_workers = clamp_workers(max_workers);
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn ocr(&self) -> &OcrEngine {
        &self.ocr
    }

    /// Extract the text of a PDF file.
    ///
    /// Returns an empty string when the document has no text layer and OCR
    /// is unavailable or finds nothing. A document lopdf cannot load is
    /// handed to OCR when possible, and is an error otherwise.
    pub fn extract_text_from_pdf(&self, path: &Path) -> Result<String> {
        self.extract(Document::load(path), PdfSource::Path(path))
    }

    /// Same as [`Self::extract_text_from_pdf`] for an in-memory PDF, such as
    /// an email attachment.
    pub fn extract_text_from_bytes(&self, bytes: &[u8]) -> Result<String> {
        self.extract(Document::load_mem(bytes), PdfSource::Bytes(bytes))
    }

    fn extract(
        &self,
        loaded: std::result::Result<Document, lopdf::Error>,
        source: PdfSource<'_>,
    ) -> Result<String> {
        let doc = match loaded {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Error reading PDF: {}", e);
                if self.ocr.is_available() {
                    tracing::info!("Trying OCR as fallback...");
                    return self.run_ocr(&source).map_err(|ocr_err| {
                        tracing::warn!("OCR also failed: {}", ocr_err);
                        SummarizeError::Pdf(e.to_string())
                    });
                }
                return Err(SummarizeError::Pdf(e.to_string()));
            }
        };

        let text = self.extract_pages(&doc)?;
        if !text.trim().is_empty() {
            return Ok(text.trim().to_string());
        }

        if !self.ocr.is_available() {
            tracing::info!("No text layer found and OCR is unavailable");
            return Ok(String::new());
        }

        tracing::info!("No text layer found, trying OCR...");
        match self.run_ocr(&source) {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                tracing::warn!("OCR failed: {}", e);
                Ok(String::new())
            }
        }
    }

    /// Text of every page in page order. Multi-page documents are spread
    /// over the worker pool.
    fn extract_pages(&self, doc: &Document) -> Result<String> {
        let pages: Vec<u32> = doc.get_pages().into_keys().collect();

        match pages.as_slice() {
            [] => Ok(String::new()),
            [only] => Ok(page_text(doc, *only)),
            _ => {
                tracing::info!(
                    "Processing {} pages on {} workers",
                    pages.len(),
                    self.max_workers
                );
                let pool = build_pool(self.max_workers)?;
                let texts: Vec<String> = pool.install(|| {
                    pages
                        .par_iter()
                        .map(|&page| format!("{}\n", page_text(doc, page)))
                        .collect()
                });
                Ok(texts.join("\n"))
            }
        }
    }

    fn run_ocr(&self, source: &PdfSource<'_>) -> Result<String> {
        match source {
            PdfSource::Path(path) => self.ocr.extract(path, self.max_workers),
            PdfSource::Bytes(bytes) => {
                let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile()?;
                tmp.write_all(bytes)?;
                tmp.flush()?;
                self.ocr.extract(tmp.path(), self.max_workers)
            }
        }
    }
}

fn page_text(doc: &Document, page: u32) -> String {
    doc.extract_text(&[page]).unwrap_or_else(|e| {
        tracing::warn!("Error extracting text from page {}: {}", page, e);
        String::new()
    })
}
