use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::models::{CaseStatus, TranscriptDocument};

static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[ \t]+").expect("line number pattern is valid"));

/// Strip leading transcript line numbers ("12   INMATE: ...")
pub fn remove_line_numbers(text: &str) -> String {
    LINE_NUMBER.replace_all(text, "").into_owned()
}

/// Collapse runs of spaces and tabs inside lines and reduce any run of blank
/// lines to a single paragraph break. Line starts are kept so speaker labels
/// stay anchored.
pub fn normalize_whitespace(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut paragraph_break = false;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            paragraph_break = !output.is_empty();
            continue;
        }

        if !output.is_empty() {
            output.push('\n');
            if paragraph_break {
                output.push('\n');
            }
        }
        paragraph_break = false;
        output.push_str(&collapsed);
    }

    output
}

/// Full preprocessing applied before segmentation
pub fn preprocess(text: &str) -> String {
    normalize_whitespace(&remove_line_numbers(text))
}

/// Read a plain-text transcript and preprocess it
pub fn read_document(
    path: &Path,
    id: impl Into<String>,
    subject_name: Option<String>,
) -> Result<TranscriptDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;

    Ok(TranscriptDocument {
        id: id.into(),
        text: preprocess(&content),
        subject_name,
    })
}

/// Document id derived from a transcript file name
pub fn document_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One transcript listed in a batch manifest.
///
/// ```json
/// [{"id": "case-17", "path": "transcripts/case-17.txt", "subject_name": "SMITH"}]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub path: PathBuf,
    #[serde(default)]
    pub subject_name: Option<String>,
}

/// One case listed in a ranking manifest. The latest stored analysis of
/// `document_id` is attached when present.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseEntry {
    pub subject_id: String,
    #[serde(default)]
    pub document_id: Option<String>,
    /// Transcript used for panel and keyword scans
    #[serde(default)]
    pub transcript: Option<PathBuf>,
    #[serde(default)]
    pub hearing_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Parse a JSON manifest, resolving relative paths against its directory
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let mut entries: Vec<ManifestEntry> =
        serde_json::from_str(&content).context("Failed to parse batch manifest")?;

    let base = path.parent().unwrap_or(Path::new("."));
    for entry in &mut entries {
        entry.path = resolve(base, &entry.path);
    }
    Ok(entries)
}

/// Parse a ranking manifest, resolving transcript paths against its directory
pub fn read_case_manifest(path: &Path) -> Result<Vec<CaseEntry>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let mut entries: Vec<CaseEntry> =
        serde_json::from_str(&content).context("Failed to parse case manifest")?;

    let base = path.parent().unwrap_or(Path::new("."));
    for entry in &mut entries {
        if let Some(transcript) = entry.transcript.take() {
            entry.transcript = Some(resolve(base, &transcript));
        }
    }
    Ok(entries)
}

/// Load every transcript of a batch manifest
pub fn load_documents(entries: &[ManifestEntry]) -> Result<Vec<TranscriptDocument>> {
    entries
        .iter()
        .map(|entry| {
            let id = entry
                .id
                .clone()
                .unwrap_or_else(|| document_id_for(&entry.path));
            read_document(&entry.path, id, entry.subject_name.clone())
        })
        .collect()
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
