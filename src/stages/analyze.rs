use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::io::AnalysisStore;
use crate::llm::{validate_response, SignalClassifier};
use crate::models::{
    AnalysisRecord, AnalysisReport, AnalysisResult, ChunkConfig, Claim, SignalType,
    TranscriptChunk, TranscriptDocument,
};
use crate::stages::{
    aggregate, plan_chunks, summarize, SpeakerDiagnostics, SpeakerSegmenter,
    DEFAULT_CONTEXT_MAX_LEN,
};

/// Configuration for document analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Chunk budget in characters (about 8000 tokens at 4 chars per token)
    pub max_chunk_chars: usize,
    /// Upper bound on the carried context summary
    pub context_max_len: usize,
    /// Pause between classifier calls, for rate limits only
    pub chunk_delay: Duration,
    /// Pause between documents in a batch
    pub document_delay: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: ChunkConfig::default().max_chars,
            context_max_len: DEFAULT_CONTEXT_MAX_LEN,
            chunk_delay: Duration::from_secs(1),
            document_delay: Duration::from_secs(2),
        }
    }
}

impl AnalysisConfig {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            max_chars: self.max_chunk_chars,
        }
    }
}

/// Terminal failures of one document analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Classifier unavailable: {0} is not configured")]
    ClassifierUnavailable(String),

    #[error("No subject speech found in document ({turns} turns detected)")]
    NoSubjectSpeech { turns: usize },

    #[error("Failed to store analysis: {0:#}")]
    Store(anyhow::Error),
}

/// Claims and progress gathered over the chunk loop
struct ChunkRun {
    claims: Vec<Claim>,
    chunks_processed: usize,
    chunks_total: usize,
    cancelled: bool,
}

/// Analyze one document end to end.
///
/// Never returns an error: every failure comes back as a report with
/// `success == false`, an error message and zeroed scores.
pub async fn analyze_document<C, S>(
    classifier: &C,
    store: &S,
    document: &TranscriptDocument,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisReport
where
    C: SignalClassifier + ?Sized,
    S: AnalysisStore + ?Sized,
{
    match try_analyze(classifier, store, document, config, cancel).await {
        Ok((result, run)) => {
            info!(
                "Document {}: score {:.2}, {} claims, {}/{} chunks",
                document.id,
                result.innocence_score,
                result.claims.len(),
                run.chunks_processed,
                run.chunks_total
            );
            build_report(&result, &run)
        }
        Err(e) => {
            warn!("Document {} failed: {}", document.id, e);
            AnalysisReport::failed(&document.id, e.to_string())
        }
    }
}

async fn try_analyze<C, S>(
    classifier: &C,
    store: &S,
    document: &TranscriptDocument,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<(AnalysisResult, ChunkRun), AnalysisError>
where
    C: SignalClassifier + ?Sized,
    S: AnalysisStore + ?Sized,
{
    let model = classifier.model_info();
    if !model.available {
        return Err(AnalysisError::ClassifierUnavailable(model.model));
    }

    let segmenter = SpeakerSegmenter::new();
    let subject_hint = document.subject_name.as_deref();
    let turns = segmenter.segment(&document.text, subject_hint);
    let chunks = plan_chunks(&document.text, &turns, &config.chunk_config());

    if chunks.is_empty() {
        let diagnostics =
            SpeakerDiagnostics::from_turns(&segmenter, &document.text, subject_hint, &turns);
        warn!("No subject speech in document {}\n{}", document.id, diagnostics);
        return Err(AnalysisError::NoSubjectSpeech { turns: turns.len() });
    }

    info!(
        "Document {}: {} turns, {} chunks",
        document.id,
        turns.len(),
        chunks.len()
    );

    let run = process_chunks(classifier, &chunks, config, cancel).await;
    let aggregate = aggregate(&run.claims);
    let analyzed_at = Utc::now();

    let result = AnalysisResult {
        run_id: Uuid::new_v4(),
        document_id: document.id.clone(),
        claims: run.claims.clone(),
        innocence_score: aggregate.innocence_score,
        model_version: format!("{}-{}", model.model, analyzed_at.format("%Y%m%d")),
        analyzed_at,
    };

    if run.cancelled {
        info!("Document {} cancelled, partial result not stored", document.id);
        return Ok((result, run));
    }

    store
        .insert_analysis(&AnalysisRecord::from_result(&result))
        .await
        .map_err(AnalysisError::Store)?;
    store
        .mark_processed(&document.id)
        .await
        .map_err(AnalysisError::Store)?;

    Ok((result, run))
}

/// Run the classifier over the chunks in order, carrying context forward.
/// Cancellation is honored between chunks only.
async fn process_chunks<C>(
    classifier: &C,
    chunks: &[TranscriptChunk],
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> ChunkRun
where
    C: SignalClassifier + ?Sized,
{
    let mut run = ChunkRun {
        claims: Vec::new(),
        chunks_processed: 0,
        chunks_total: chunks.len(),
        cancelled: false,
    };

    for (i, chunk) in chunks.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Cancelled after {} of {} chunks", i, chunks.len());
            run.cancelled = true;
            break;
        }

        let preceding: Vec<&TranscriptChunk> = chunks[..i].iter().collect();
        let context = summarize(&preceding, config.context_max_len);
        let context = (!context.is_empty()).then_some(context.as_str());

        let claims = match classifier.classify(&chunk.text, context).await {
            Ok(response) => validate_response(&response, chunk),
            Err(e) => {
                warn!("Chunk {} failed, contributing no claims: {:#}", i + 1, e);
                vec![]
            }
        };

        debug!(
            "Chunk {}/{}: {} subject turns, {} claims",
            i + 1,
            chunks.len(),
            chunk.subject_turn_count(),
            claims.len()
        );

        run.claims.extend(claims);
        run.chunks_processed += 1;

        if i + 1 < chunks.len() && !config.chunk_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(config.chunk_delay) => {}
            }
        }
    }

    run
}

fn build_report(result: &AnalysisResult, run: &ChunkRun) -> AnalysisReport {
    let of = |t: SignalType| result.claims_of(t).cloned().collect::<Vec<_>>();

    AnalysisReport {
        success: true,
        document_id: result.document_id.clone(),
        explicit_claims: of(SignalType::Explicit),
        implicit_signals: of(SignalType::Implicit),
        contextual_signals: of(SignalType::Contextual),
        bias_language: of(SignalType::BiasLanguage),
        innocence_score: result.innocence_score,
        chunks_processed: run.chunks_processed,
        chunks_total: run.chunks_total,
        cancelled: run.cancelled,
        run_id: Some(result.run_id),
        error: None,
    }
}

/// Analyze documents one after another. A failed document is reported in its
/// slot and does not stop the batch.
pub async fn analyze_batch<C, S>(
    classifier: &C,
    store: &S,
    documents: &[TranscriptDocument],
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Vec<AnalysisReport>
where
    C: SignalClassifier + ?Sized,
    S: AnalysisStore + ?Sized,
{
    let mut reports = Vec::with_capacity(documents.len());

    for (i, document) in documents.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Batch cancelled, {} documents not started", documents.len() - i);
            break;
        }

        info!("Analyzing document {}/{}: {}", i + 1, documents.len(), document.id);
        reports.push(analyze_document(classifier, store, document, config, cancel).await);

        if i + 1 < documents.len() && !config.document_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(config.document_delay) => {}
            }
        }
    }

    let succeeded = reports.iter().filter(|r| r.success).count();
    info!("Batch complete: {}/{} succeeded", succeeded, reports.len());

    reports
}
