//! Command implementations for the `sigplace` binary
//!
//! A plan is the JSON array produced by `AnnotationStore::to_json`: the same
//! annotations a browser session places, with drawn signatures embedded as
//! PNG data URLs.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use sigplace_core::{
    export_document, AnnotationStore, DocumentSession, ExportOptions, PageSize, PlacementDefaults,
    SignerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Date format accepted by `--date`
pub const DATE_ARG_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone)]
pub struct SignRequest {
    pub input: PathBuf,
    pub plan: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignSummary {
    pub output: PathBuf,
    pub placed: usize,
    pub skipped: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub page_count: u32,
    pub pages: Vec<PageSize>,
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_ARG_FORMAT)
        .map_err(|e| format!("expected MM/DD/YYYY: {}", e))
}

pub fn load_config(path: Option<&Path>) -> Result<SignerConfig> {
    match path {
        Some(path) => SignerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SignerConfig::default()),
    }
}

fn read_pdf(path: &Path) -> Result<DocumentSession> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    DocumentSession::from_bytes(bytes).with_context(|| format!("Invalid PDF {}", path.display()))
}

/// Apply a plan to a PDF and write the signed copy
pub fn sign(request: &SignRequest) -> Result<SignSummary> {
    let config = load_config(request.config.as_deref())?;
    let document = read_pdf(&request.input)?;

    let plan = fs::read_to_string(&request.plan)
        .with_context(|| format!("Failed to read plan {}", request.plan.display()))?;
    let store = AnnotationStore::from_json(&plan, PlacementDefaults::from(&config))
        .with_context(|| format!("Invalid plan {}", request.plan.display()))?;
    if store.is_empty() {
        bail!("Plan {} contains no annotations", request.plan.display());
    }

    let skipped = store
        .iter()
        .filter(|a| document.page_size(a.page_number).is_none())
        .inspect(|a| {
            warn!(
                id = %a.id,
                page = a.page_number,
                page_count = document.page_count(),
                "annotation targets a page the document does not have"
            )
        })
        .count();

    let mut options = ExportOptions::new(config);
    if let Some(date) = request.date {
        options = options.with_date(date);
    }

    let signed = export_document(document.bytes(), store.annotations(), &options)
        .context("Export failed")?;
    fs::write(&request.output, &signed)
        .with_context(|| format!("Failed to write {}", request.output.display()))?;

    info!(output = %request.output.display(), bytes = signed.len(), "signed document written");
    Ok(SignSummary {
        output: request.output.clone(),
        placed: store.len() - skipped,
        skipped,
        bytes: signed.len(),
    })
}

/// Page count and sizes of a PDF
pub fn info(input: &Path) -> Result<DocumentInfo> {
    let document = read_pdf(input)?;
    Ok(DocumentInfo {
        page_count: document.page_count(),
        pages: document.page_sizes().to_vec(),
    })
}
