use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{
    config::Config,
    error::TranscriptError,
    page::PageStateReader,
    types::{CaptionTrack, PlayerState, TimedCaptionPayload},
    youtube::player::{ensure_captions, extract_player_state},
};

/// Structured caption format requested from the timed-text endpoint.
pub const CAPTION_FORMAT: &str = "json3";

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Player state for `video_id`, guaranteed to carry caption tracks.
    async fn player_state(&self, video_id: &str) -> Result<PlayerState, TranscriptError>;

    async fn caption_payload(
        &self,
        track: &CaptionTrack,
    ) -> Result<TimedCaptionPayload, TranscriptError>;
}

pub struct HttpTranscriptFetcher {
    client: reqwest::Client,
    page: Arc<dyn PageStateReader>,
    watch_base_url: String,
}

impl HttpTranscriptFetcher {
    pub fn new(config: &Config, page: Arc<dyn PageStateReader>) -> Result<Self, TranscriptError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TranscriptError::network(&config.watch_base_url, e))?;

        Ok(Self::with_client(client, &config.watch_base_url, page))
    }

    pub fn with_client(
        client: reqwest::Client,
        watch_base_url: &str,
        page: Arc<dyn PageStateReader>,
    ) -> Self {
        Self {
            client,
            page,
            watch_base_url: watch_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={}", self.watch_base_url, video_id)
    }

    async fn get_text(&self, url: &str) -> Result<String, TranscriptError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TranscriptError::network(url, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::network(
                url,
                format!("server responded with status {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptError::network(url, describe(&e)))
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    }
}

/// `base_url` with `fmt` set to the structured caption format.
pub fn caption_payload_url(base_url: &str) -> Result<Url, TranscriptError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| TranscriptError::parse(format!("invalid caption track URL {base_url}: {e}")))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("fmt", CAPTION_FORMAT);

    Ok(url)
}

#[async_trait]
impl TranscriptFetcher for HttpTranscriptFetcher {
    async fn player_state(&self, video_id: &str) -> Result<PlayerState, TranscriptError> {
        if let Some(state) = self.page.current_player_state() {
            if state.video_id == video_id {
                tracing::debug!(video_id, "using in-page player state");
                return ensure_captions(state);
            }
            tracing::debug!(
                video_id,
                stale = %state.video_id,
                "in-page player state belongs to another video"
            );
        }

        let body = self.get_text(&self.watch_url(video_id)).await?;
        let state = extract_player_state(&body)?;
        ensure_captions(state)
    }

    async fn caption_payload(
        &self,
        track: &CaptionTrack,
    ) -> Result<TimedCaptionPayload, TranscriptError> {
        let url = caption_payload_url(&track.base_url)?;
        let body = self.get_text(url.as_str()).await?;

        serde_json::from_str(&body)
            .map_err(|e| TranscriptError::parse(format!("invalid caption payload: {e}")))
    }
}
