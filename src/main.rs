use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use innocence_triage::{
    analyze_batch, analyze_document, document_id_for, format_recommendations, load_documents,
    plan_chunks, preprocess, read_case_manifest, read_document, read_manifest, write_json,
    AnalysisConfig, AnalysisStore, AnthropicClassifier, CaseSnapshot, ChunkConfig,
    ClassifierConfig, JsonDirStore, PriorityPolicy, PriorityRanker, ReportSummary, Roster,
    SignalClassifier, SpeakerDiagnostics, SpeakerSegmenter,
};

#[derive(Parser)]
#[command(name = "innocence-triage")]
#[command(author, version, about = "Innocence signal analysis and case prioritization for hearing transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one transcript for innocence signals
    Analyze {
        /// Input transcript (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Document id (defaults to the file name)
        #[arg(long)]
        id: Option<String>,

        /// Subject name used to recognize the subject's speaker label
        #[arg(long)]
        subject: Option<String>,

        /// Output file for the JSON report (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze every transcript listed in a JSON manifest
    Batch {
        /// Manifest: [{"id": ..., "path": ..., "subject_name": ...}]
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output file for the JSON reports (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Delay between documents in milliseconds
        #[arg(long, default_value = "2000")]
        document_delay_ms: u64,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rank cases for review
    Rank {
        /// Case manifest: [{"subject_id": ..., "document_id": ..., "transcript": ..., ...}]
        #[arg(short, long)]
        cases: PathBuf,

        /// Directory of stored analysis runs
        #[arg(long, default_value = "analyses")]
        store: PathBuf,

        /// Adjudicator roster JSON (bundled roster when omitted)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Priority policy JSON overriding the default thresholds
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        top: usize,

        /// Reference date for urgency (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show speaker detection and chunk planning without calling the classifier
    Inspect {
        /// Input transcript (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Subject name used to recognize the subject's speaker label
        #[arg(long)]
        subject: Option<String>,

        /// Chunk budget in characters
        #[arg(long, default_value = "32000")]
        max_chunk_chars: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct AnalysisArgs {
    /// Directory of stored analysis runs
    #[arg(long, default_value = "analyses")]
    store: PathBuf,

    /// Chunk budget in characters
    #[arg(long, default_value = "32000")]
    max_chunk_chars: usize,

    /// Maximum length of the context carried between chunks
    #[arg(long, default_value = "500")]
    context_max_len: usize,

    /// Delay between classifier calls in milliseconds
    #[arg(long, default_value = "1000")]
    chunk_delay_ms: u64,
}

impl AnalysisArgs {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_chunk_chars: self.max_chunk_chars,
            context_max_len: self.context_max_len,
            chunk_delay: Duration::from_millis(self.chunk_delay_ms),
            ..AnalysisConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            id,
            subject,
            output,
            analysis,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_transcript(input, id, subject, output, analysis).await
        }
        Commands::Batch {
            manifest,
            output,
            document_delay_ms,
            analysis,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_manifest(manifest, output, document_delay_ms, analysis).await
        }
        Commands::Rank {
            cases,
            store,
            roster,
            policy,
            top,
            today,
            json,
            verbose,
        } => {
            setup_logging(verbose);
            rank_cases(cases, store, roster, policy, top, today, json).await
        }
        Commands::Inspect {
            input,
            subject,
            max_chunk_chars,
            verbose,
        } => {
            setup_logging(verbose);
            inspect_transcript(input, subject, max_chunk_chars)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Build the remote classifier, failing before any document work when it is
/// not configured
fn build_classifier() -> Result<AnthropicClassifier> {
    let config = ClassifierConfig::from_env()?;
    let classifier = AnthropicClassifier::new(config)?;

    let model = classifier.model_info();
    if !model.available {
        bail!("Classifier {} is not configured", model.model);
    }
    info!("Using model {}", model.model);
    Ok(classifier)
}

/// Cancel the token on Ctrl-C; running analyses stop at the next chunk boundary
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current chunk");
            child.cancel();
        }
    });
    token
}

async fn analyze_transcript(
    input: PathBuf,
    id: Option<String>,
    subject: Option<String>,
    output: Option<PathBuf>,
    analysis: AnalysisArgs,
) -> Result<()> {
    let classifier = build_classifier()?;
    let store = JsonDirStore::new(&analysis.store);

    info!("Loading transcript from {:?}", input);
    let id = id.unwrap_or_else(|| document_id_for(&input));
    let document = read_document(&input, id, subject)?;

    let report = analyze_document(
        &classifier,
        &store,
        &document,
        &analysis.config(),
        &cancel_on_ctrl_c(),
    )
    .await;

    eprint!("{}", ReportSummary::new(&report).format());
    emit_json(&report, output.as_deref())?;

    if !report.success {
        bail!(report.error.unwrap_or_else(|| "Analysis failed".to_string()));
    }
    Ok(())
}

async fn analyze_manifest(
    manifest: PathBuf,
    output: Option<PathBuf>,
    document_delay_ms: u64,
    analysis: AnalysisArgs,
) -> Result<()> {
    let classifier = build_classifier()?;
    let store = JsonDirStore::new(&analysis.store);

    let entries = read_manifest(&manifest)?;
    let documents = load_documents(&entries)?;
    info!("Loaded {} documents from {:?}", documents.len(), manifest);

    let config = AnalysisConfig {
        document_delay: Duration::from_millis(document_delay_ms),
        ..analysis.config()
    };
    let reports =
        analyze_batch(&classifier, &store, &documents, &config, &cancel_on_ctrl_c()).await;

    for report in &reports {
        eprintln!("{}", ReportSummary::new(report).format());
    }
    emit_json(&reports, output.as_deref())
}

async fn rank_cases(
    cases: PathBuf,
    store: PathBuf,
    roster: Option<PathBuf>,
    policy: Option<PathBuf>,
    top: usize,
    today: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let roster = match roster {
        Some(path) => Roster::from_file(&path)?,
        None => Roster::bundled()?,
    };
    info!("Loaded roster with {} adjudicators", roster.len());

    let policy = match policy {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {:?}", path))?;
            serde_json::from_str(&content).context("Failed to parse priority policy")?
        }
        None => PriorityPolicy::default(),
    };

    let store = JsonDirStore::new(store);
    let entries = read_case_manifest(&cases)?;
    let mut snapshots = Vec::with_capacity(entries.len());

    for entry in entries {
        let analysis = match &entry.document_id {
            Some(document_id) => store
                .latest_analysis(document_id)
                .await?
                .map(|record| record.into_result()),
            None => None,
        };
        let raw_text = match &entry.transcript {
            Some(path) => preprocess(
                &std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file: {:?}", path))?,
            ),
            None => String::new(),
        };

        snapshots.push(CaseSnapshot {
            subject_id: entry.subject_id,
            analysis,
            raw_text,
            hearing_date: entry.hearing_date,
            status: entry.status,
            assigned_to: entry.assigned_to,
        });
    }

    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let ranker = PriorityRanker::new(&roster, policy, today);
    let recommendations = ranker.rank(&snapshots, top);
    info!(
        "Ranked {} cases, returning top {}",
        snapshots.len(),
        recommendations.len()
    );

    if json {
        emit_json(&recommendations, None)
    } else {
        print!("{}", format_recommendations(&recommendations));
        Ok(())
    }
}

fn inspect_transcript(input: PathBuf, subject: Option<String>, max_chunk_chars: usize) -> Result<()> {
    let document = read_document(&input, document_id_for(&input), subject)?;
    let segmenter = SpeakerSegmenter::new();
    let hint = document.subject_name.as_deref();
    let turns = segmenter.segment(&document.text, hint);

    print!(
        "{}",
        SpeakerDiagnostics::from_turns(&segmenter, &document.text, hint, &turns)
    );

    let chunks = plan_chunks(
        &document.text,
        &turns,
        &ChunkConfig {
            max_chars: max_chunk_chars,
        },
    );
    println!("\n=== Chunk plan ===");
    if chunks.is_empty() {
        println!("No subject speech, nothing to analyze");
    }
    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "Chunk {}: bytes {}..{} ({} turns, {} subject)",
            i + 1,
            chunk.start_offset,
            chunk.end_offset,
            chunk.turns.len(),
            chunk.subject_turn_count()
        );
    }
    Ok(())
}

fn emit_json<T: serde::Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(value, path)?;
            info!("Wrote {:?}", path);
        }
        None => println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize output")?
        ),
    }
    Ok(())
}
