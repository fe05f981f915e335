//! File-to-summary pipeline: route on extension, extract, split, summarize.

use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::StreamExt;

use crate::ai::AiSummarizer;
use crate::config::Config;
use crate::constants::{FILE_CONCURRENCY, SUPPORTED_EXTENSIONS};
use crate::error::{Result, SummarizeError};
use crate::extract::{OcrEngine, PdfExtractor, clean_email_text};
use crate::mail::{ParsedEmail, SourceFormat, parse_eml, parse_msg, split_email_threads};
use crate::summary::{SummaryMethod, SummaryReport, SummaryType, generate_basic_summary};

/// What a file yields before summarization
struct Extracted {
    emails: Vec<ParsedEmail>,
    /// The text the summary is based on
    text: String,
    file_format: Option<SourceFormat>,
    attachments_count: Option<usize>,
}

pub struct Summarizer {
    config: Config,
    pdf: PdfExtractor,
    ai: Option<AiSummarizer>,
}

impl Summarizer {
    pub fn from_config(config: Config) -> Self {
        let ocr = OcrEngine::from_config(&config.extract);
        let pdf = PdfExtractor::new(config.extract.workers(), ocr);

        let ai = config
            .ai
            .api_key
            .as_deref()
            .filter(|_| config.ai.is_enabled())
            .and_then(|key| build_ai(&config, key));

        tracing::debug!(
            "Summarizer ready: {} workers, OCR {}, AI {}",
            pdf.max_workers(),
            if pdf.ocr().is_available() { "on" } else { "off" },
            ai.as_ref().map_or("off", |a| a.model())
        );

        Self { config, pdf, ai }
    }

    /// Number of page extraction workers, clamped to 1..=8
    pub fn set_parallel_workers(&mut self, workers: usize) {
        self.pdf.set_max_workers(workers);
    }

    pub fn parallel_workers(&self) -> usize {
        self.pdf.max_workers()
    }

    /// Disable the LLM for this summarizer, whatever the config says
    pub fn disable_ai(&mut self) {
        self.ai = None;
    }

    /// Summarize one .pdf, .eml or .msg file.
    ///
    /// `api_key` overrides the configured key for this call.
    pub async fn summarize_file(
        &self,
        path: &Path,
        summary_type: SummaryType,
        api_key: Option<&str>,
    ) -> Result<SummaryReport> {
        if !path.exists() {
            return Err(SummarizeError::NotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let Some(format) = SourceFormat::from_extension(&ext) else {
            return Err(SummarizeError::UnsupportedFormat {
                ext: if ext.is_empty() { "(none)".to_string() } else { ext },
                supported: SUPPORTED_EXTENSIONS.join(", "),
            });
        };

        tracing::info!("Summarizing {} ({})", path.display(), format);

        // Extraction is blocking (file I/O, rayon, OCR subprocesses)
        let pdf = self.pdf.clone();
        let owned = path.to_path_buf();
        let extracted = tokio::task::spawn_blocking(move || extract(&pdf, &owned, format))
            .await
            .map_err(|e| SummarizeError::WorkerPool(e.to_string()))??;

        let (summary, method) = self
            .summarize_emails(&extracted.emails, &extracted.text, summary_type, api_key)
            .await;

        Ok(SummaryReport {
            success: true,
            source: path.to_path_buf(),
            email_count: extracted.emails.len(),
            summary,
            summary_type,
            method,
            raw_text_length: extracted.text.chars().count(),
            emails: extracted.emails,
            file_format: extracted.file_format,
            attachments_count: extracted.attachments_count,
            generated_at: Utc::now(),
        })
    }

    /// Summarize several files, a few at a time. Results come back in input
    /// order, one per path.
    pub async fn summarize_files(
        &self,
        paths: &[PathBuf],
        summary_type: SummaryType,
        api_key: Option<&str>,
    ) -> Vec<Result<SummaryReport>> {
        futures::stream::iter(
            paths
                .iter()
                .map(|path| self.summarize_file(path, summary_type, api_key)),
        )
        .buffered(FILE_CONCURRENCY)
        .collect()
        .await
    }

    /// LLM summary when available and the text is long enough, basic
    /// summary otherwise or when the LLM call fails.
    async fn summarize_emails(
        &self,
        emails: &[ParsedEmail],
        text: &str,
        summary_type: SummaryType,
        api_key: Option<&str>,
    ) -> (String, SummaryMethod) {
        let override_ai = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .and_then(|key| build_ai(&self.config, key));

        let long_enough = text.chars().count() > self.config.ai.min_text_length;

        if let Some(ai) = override_ai.as_ref().or(self.ai.as_ref())
            && long_enough
        {
            match ai.summarize(emails, summary_type).await {
                Ok(summary) => return (summary, SummaryMethod::Ai),
                Err(e) => {
                    tracing::warn!("AI summary failed, using basic summary: {}", e);
                }
            }
        } else if !long_enough {
            tracing::debug!("Text too short for AI summary, using basic summary");
        }

        (generate_basic_summary(emails), SummaryMethod::Basic)
    }
}

fn build_ai(config: &Config, api_key: &str) -> Option<AiSummarizer> {
    match AiSummarizer::new(&config.ai, api_key) {
        Ok(ai) => Some(ai),
        Err(e) => {
            tracing::warn!("Could not create AI client: {}", e);
            None
        }
    }
}

fn extract(pdf: &PdfExtractor, path: &Path, format: SourceFormat) -> Result<Extracted> {
    match format {
        SourceFormat::Pdf => extract_pdf(pdf, path),
        SourceFormat::Eml | SourceFormat::Msg => extract_email_file(pdf, path, format),
    }
}

fn extract_pdf(pdf: &PdfExtractor, path: &Path) -> Result<Extracted> {
    let raw = pdf.extract_text_from_pdf(path)?;
    if raw.is_empty() {
        return Err(SummarizeError::NoTextExtracted);
    }

    let text = clean_email_text(&raw);
    let emails = split_email_threads(&text);
    tracing::info!(
        "Extracted {} chars, {} email(s) from {}",
        text.chars().count(),
        emails.len(),
        path.display()
    );

    Ok(Extracted {
        emails,
        text,
        file_format: None,
        attachments_count: None,
    })
}

fn extract_email_file(pdf: &PdfExtractor, path: &Path, format: SourceFormat) -> Result<Extracted> {
    let doc = match format {
        SourceFormat::Msg => parse_msg(path, pdf)?,
        _ => parse_eml(&std::fs::read(path)?, pdf)?,
    };

    let file_format = doc.format;
    let attachments_count = doc.attachments.len();
    let email = doc.into_email();
    if email.subject.trim().is_empty() && email.content.trim().is_empty() {
        return Err(SummarizeError::NoEmails);
    }

    let emails = vec![email];
    let text = emails
        .iter()
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(Extracted {
        emails,
        text,
        file_format: Some(file_format),
        attachments_count: Some(attachments_count),
    })
}
