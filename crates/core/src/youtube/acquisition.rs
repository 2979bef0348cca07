use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    error::{FailureKind, TranscriptError},
    events::EventBus,
    format::format_transcript_document,
    page::video_id_from_url,
    types::TranscriptDocument,
    workers::TranscriptExtracted,
    youtube::{fetcher::TranscriptFetcher, normalize::normalize, selector::select_track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStage {
    Idle,
    FetchingState,
    SelectingTrack,
    FetchingPayload,
    Normalizing,
    Formatting,
    Done,
    Failed(FailureKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    pub video_id: String,
    pub page_url: String,
}

impl AcquisitionRequest {
    pub fn new(video_id: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            page_url: page_url.into(),
        }
    }

    pub fn from_page_url(page_url: &str) -> Result<Self, TranscriptError> {
        let video_id = video_id_from_url(page_url).ok_or_else(|| {
            TranscriptError::parse(format!("could not find video id in {page_url}"))
        })?;
        Ok(Self::new(video_id, page_url))
    }
}

type StageObserver = Box<dyn Fn(AcquisitionStage) + Send + Sync>;

/// Drives one transcript extraction from player state to finished document.
///
/// Each call to [`acquire`](Self::acquire) starts again from `Idle`; nothing
/// is retried and a failure never yields a partial document.
pub struct TranscriptAcquisition<F> {
    fetcher: F,
    observer: Option<StageObserver>,
}

impl<F: TranscriptFetcher> TranscriptAcquisition<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            observer: None,
        }
    }

    pub fn with_stage_observer(
        mut self,
        observer: impl Fn(AcquisitionStage) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn enter(&self, stage: AcquisitionStage) {
        tracing::debug!(?stage, "acquisition stage");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    pub async fn acquire(
        &self,
        request: &AcquisitionRequest,
    ) -> Result<TranscriptDocument, TranscriptError> {
        self.enter(AcquisitionStage::Idle);

        match self.run_stages(request).await {
            Ok(document) => {
                tracing::info!(
                    video_id = %request.video_id,
                    chars = document.transcript.len(),
                    "transcript extracted"
                );
                self.enter(AcquisitionStage::Done);
                Ok(document)
            }
            Err(err) => {
                tracing::warn!(video_id = %request.video_id, error = %err, "transcript extraction failed");
                self.enter(AcquisitionStage::Failed(err.kind()));
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &AcquisitionRequest,
    ) -> Result<TranscriptDocument, TranscriptError> {
        self.enter(AcquisitionStage::FetchingState);
        let state = self.fetcher.player_state(&request.video_id).await?;

        self.enter(AcquisitionStage::SelectingTrack);
        let track =
            select_track(&state.caption_tracks).ok_or_else(|| TranscriptError::NoCaptions {
                video_id: request.video_id.clone(),
            })?;
        tracing::debug!(
            language = %track.language_code,
            auto_generated = track.is_auto_generated(),
            "selected caption track"
        );

        self.enter(AcquisitionStage::FetchingPayload);
        let payload = self.fetcher.caption_payload(&track).await?;

        self.enter(AcquisitionStage::Normalizing);
        let transcript = normalize(&payload);

        self.enter(AcquisitionStage::Formatting);
        let metadata = state.metadata();
        let text = format_transcript_document(&metadata, &request.page_url, &transcript);

        Ok(TranscriptDocument {
            text,
            transcript,
            url: request.page_url.clone(),
            metadata,
        })
    }

    /// Like [`acquire`](Self::acquire), abandoning the in-flight request as
    /// soon as `shutdown` fires. A closed shutdown channel never cancels.
    pub async fn acquire_until(
        &self,
        request: &AcquisitionRequest,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<TranscriptDocument, TranscriptError> {
        tokio::select! {
            biased;
            _ = cancelled(shutdown) => {
                tracing::info!(video_id = %request.video_id, "transcript extraction cancelled");
                self.enter(AcquisitionStage::Failed(FailureKind::Cancelled));
                Err(TranscriptError::Cancelled)
            }
            result = self.acquire(request) => result,
        }
    }

    /// Acquire and announce the document on `bus`, returning it with the
    /// number of subscribers it reached. Nothing is published on failure.
    pub async fn acquire_and_publish(
        &self,
        request: &AcquisitionRequest,
        bus: &EventBus,
    ) -> Result<(Arc<TranscriptDocument>, usize), TranscriptError> {
        let document = self.acquire(request).await?;
        Ok(publish_document(bus, request, document))
    }
}

/// Announce a finished document as [`TranscriptExtracted`].
///
/// The count is the number of subscriber queues the event reached; zero means
/// nothing will ever consume the document.
pub fn publish_document(
    bus: &EventBus,
    request: &AcquisitionRequest,
    document: TranscriptDocument,
) -> (Arc<TranscriptDocument>, usize) {
    let document = Arc::new(document);
    let delivered = bus.publish(Arc::new(TranscriptExtracted::new(
        request.video_id.clone(),
        Arc::clone(&document),
    )));
    (document, delivered)
}

async fn cancelled(shutdown: &mut broadcast::Receiver<()>) {
    if let Err(RecvError::Closed) = shutdown.recv().await {
        std::future::pending::<()>().await;
    }
}
