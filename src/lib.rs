pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use heuristics::{RoleLookup, Rule, RuleSet};
pub use io::{
    document_id_for, format_recommendations, load_documents, preprocess, read_case_manifest,
    read_document, read_manifest, write_json, AnalysisStore, CaseEntry, JsonDirStore,
    ManifestEntry, MemoryStore, ReportSummary, Roster,
};
pub use llm::{AnthropicClassifier, ClassifierConfig, ModelInfo, SignalClassifier};
pub use models::{
    AnalysisRecord, AnalysisReport, AnalysisResult, CaseSnapshot, CaseStatus, ChunkConfig, Claim,
    PriorityPolicy, PriorityRecommendation, RoleCategory, SignalType, SpeakerTurn,
    TranscriptChunk, TranscriptDocument,
};
pub use stages::{
    aggregate, analyze_batch, analyze_document, plan_chunks, summarize, AnalysisConfig,
    AnalysisError, PriorityRanker, SpeakerDiagnostics, SpeakerSegmenter,
};
