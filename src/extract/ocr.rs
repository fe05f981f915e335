//! OCR fallback for image-only PDFs.
//!
//! Pages are rendered to PNG with poppler's `pdftoppm` and each image is
//! run through the `tesseract` CLI. Both are external programs; the engine
//! reports itself unavailable when either cannot be started.

use std::path::{Path, PathBuf};
use std::process::Command;

use rayon::prelude::*;

use super::build_pool;
use crate::config::ExtractConfig;
use crate::error::{Result, SummarizeError};

const TESSERACT_LOCATIONS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

const PDFTOPPM_LOCATIONS: &[&str] = &[
    r"C:\Program Files\poppler\Library\bin\pdftoppm.exe",
    r"C:\poppler\Library\bin\pdftoppm.exe",
    "/usr/local/bin/pdftoppm",
    "/opt/homebrew/bin/pdftoppm",
];

#[derive(Debug, Clone)]
pub struct OcrEngine {
    tesseract: Option<PathBuf>,
    pdftoppm: Option<PathBuf>,
    dpi: u32,
    language: String,
}

impl OcrEngine {
    /// Locate the OCR tools according to the config. With `ocr = false`
    /// nothing is probed and the engine is unavailable.
    pub fn from_config(config: &ExtractConfig) -> Self {
        if !config.ocr {
            return Self::disabled();
        }

        let tesseract = locate(
            config.tesseract_cmd.as_deref(),
            "tesseract",
            TESSERACT_LOCATIONS,
            "--version",
        );
        let pdftoppm = locate(
            config.pdftoppm_cmd.as_deref(),
            "pdftoppm",
            PDFTOPPM_LOCATIONS,
            "-v",
        );

        if tesseract.is_none() {
            tracing::debug!("tesseract not found, OCR fallback disabled");
        }
        if pdftoppm.is_none() {
            tracing::debug!("pdftoppm not found, OCR fallback disabled");
        }

        Self {
            tesseract,
            pdftoppm,
            dpi: config.ocr_dpi,
            language: config.ocr_language.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            tesseract: None,
            pdftoppm: None,
            dpi: 300,
            language: "eng".to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.tesseract.is_some() && self.pdftoppm.is_some()
    }

    pub fn tesseract(&self) -> Option<&Path> {
        self.tesseract.as_deref()
    }

    pub fn pdftoppm(&self) -> Option<&Path> {
        self.pdftoppm.as_deref()
    }

    /// OCR every page of `pdf`, `workers` pages at a time. Page order is
    /// preserved; a page tesseract chokes on contributes an empty string.
    pub fn extract(&self, pdf: &Path, workers: usize) -> Result<String> {
        let (Some(tesseract), Some(pdftoppm)) = (self.tesseract(), self.pdftoppm()) else {
            return Err(SummarizeError::OcrUnavailable(
                "OCR requires pdftoppm (poppler-utils) and tesseract-ocr".to_string(),
            ));
        };

        let temp_dir = tempfile::Builder::new().prefix("mailsum-ocr").tempdir()?;
        let prefix = temp_dir.path().join("page");

        tracing::info!(
            "Rendering {} for OCR (dpi={}, lang={})",
            pdf.display(),
            self.dpi,
            self.language
        );

        let output = Command::new(pdftoppm)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| SummarizeError::Ocr(format!("failed to run pdftoppm: {e}")))?;

        if !output.status.success() {
            return Err(SummarizeError::Ocr(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut images: Vec<(usize, PathBuf)> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        images.sort_by_key(|(n, _)| *n);

        if images.is_empty() {
            return Err(SummarizeError::Ocr("pdftoppm produced no images".to_string()));
        }

        let total = images.len();
        tracing::info!("Converting {} pages to text using OCR...", total);

        let pool = build_pool(workers)?;
        let pages: Vec<String> = pool.install(|| {
            images
                .par_iter()
                .map(|(n, image)| self.ocr_page(tesseract, image, *n, total))
                .collect()
        });

        Ok(pages.join("\n").trim().to_string())
    }

    fn ocr_page(&self, tesseract: &Path, image: &Path, page: usize, total: usize) -> String {
        tracing::debug!("OCR page {}/{}", page, total);

        match Command::new(tesseract)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).replace('\x0c', "")
            }
            Ok(output) => {
                tracing::warn!(
                    "tesseract failed on page {}: {}",
                    page,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                String::new()
            }
            Err(e) => {
                tracing::warn!("Could not run tesseract on page {}: {}", page, e);
                String::new()
            }
        }
    }
}

/// Page number from a pdftoppm output name (`page-1.png`, `page-07.png`).
fn page_number(path: &Path) -> Option<usize> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (_, num) = stem.rsplit_once('-')?;
    num.parse().ok()
}

/// First candidate that can actually be started: the configured path, then
/// well-known install locations, then a bare name resolved through PATH.
fn locate(
    explicit: Option<&Path>,
    name: &str,
    known: &[&str],
    version_arg: &str,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if runs(path, version_arg) {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Configured {} at {} does not run", name, path.display());
    }

    known
        .iter()
        .map(Path::new)
        .filter(|p| p.exists())
        .find(|p| runs(p, version_arg))
        .map(Path::to_path_buf)
        .or_else(|| {
            let bare = Path::new(name);
            runs(bare, version_arg).then(|| bare.to_path_buf())
        })
}

fn runs(cmd: &Path, version_arg: &str) -> bool {
    Command::new(cmd).arg(version_arg).output().is_ok()
}
