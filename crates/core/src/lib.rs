//! Pinocchio Core Library
//!
//! Acquires YouTube transcripts, formats them into titled documents, and
//! talks to the misinformation scoring service.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod messages;
pub mod page;
pub mod queues;
pub mod routes;
pub mod types;
pub mod workers;
pub mod youtube;

// Re-export commonly used items at crate root
pub use analysis::ScoringClient;
pub use cache::{AnalysisCache, get_root_cache_dir};
pub use config::Config;
pub use error::{FailureKind, PinocchioError, Result, TranscriptError};
pub use format::{
    format_analysis_readable, format_count, format_duration, format_selection_document,
    format_transcript_document,
};
pub use messages::{ContentFormat, ContentSource, ExtensionMessage};
pub use page::{NoPageState, PageStateReader, StaticPageState, video_id_from_url, wait_for_ready};
pub use types::{
    AnalysisRequest, AnalysisResult, CaptionTrack, ContentDocument, ContentType, PlayerState,
    TimedCaptionPayload, TranscriptDocument, VideoMetadata,
};
pub use youtube::{
    AcquisitionRequest, AcquisitionStage, HttpTranscriptFetcher, TranscriptAcquisition,
    TranscriptFetcher,
};
