use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::TranscriptError,
    types::{CaptionTrack, PlayerState},
};

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;\s*(?:var\s+(?:meta|head)|</script|\n)",
    )
    .expect("player response pattern is a valid regex")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayerResponse {
    video_details: Option<RawVideoDetails>,
    captions: Option<RawCaptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideoDetails {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    title: String,
    author: Option<String>,
    length_seconds: Option<Value>,
    view_count: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptions {
    player_captions_tracklist_renderer: Option<RawTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTracklist {
    caption_tracks: Option<Vec<RawCaptionTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    kind: Option<String>,
}

/// The player reports counts as decimal strings, occasionally as numbers.
fn lenient_u64(value: Option<Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl RawPlayerResponse {
    fn into_player_state(self) -> PlayerState {
        let details = self.video_details.unwrap_or_default();
        let caption_tracks = self
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default()
            .into_iter()
            .map(|t| CaptionTrack {
                language_code: t.language_code,
                kind: t.kind,
                base_url: t.base_url,
            })
            .collect();

        PlayerState {
            video_id: details.video_id,
            title: details.title,
            author: details.author.filter(|a| !a.is_empty()),
            duration_seconds: lenient_u64(details.length_seconds),
            view_count: lenient_u64(details.view_count),
            caption_tracks,
        }
    }
}

/// Parse a player response JSON object.
pub fn parse_player_response(json: &str) -> Result<PlayerState, TranscriptError> {
    let raw: RawPlayerResponse = serde_json::from_str(json)
        .map_err(|e| TranscriptError::parse(format!("invalid player response JSON: {e}")))?;
    Ok(raw.into_player_state())
}

/// Locate the embedded `ytInitialPlayerResponse` assignment in a watch-page
/// body and parse it.
pub fn extract_player_state(html: &str) -> Result<PlayerState, TranscriptError> {
    let json = PLAYER_RESPONSE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| TranscriptError::parse("player response not found in watch page"))?;

    parse_player_response(json.as_str())
}

/// Reject player states without caption tracks.
pub fn ensure_captions(state: PlayerState) -> Result<PlayerState, TranscriptError> {
    if state.caption_tracks.is_empty() {
        return Err(TranscriptError::NoCaptions {
            video_id: state.video_id,
        });
    }
    Ok(state)
}
