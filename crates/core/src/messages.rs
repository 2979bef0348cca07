//! Wire shapes exchanged over the extension message bus.

use serde::{Deserialize, Serialize};

use crate::types::{TranscriptDocument, VideoMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Youtube,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
    ProcessYouTubeTranscript {
        transcript: String,
        url: String,
        title: String,
        metadata: VideoMetadata,
    },
    ProcessContent {
        content: String,
        source: ContentSource,
        format: ContentFormat,
    },
}

impl ExtensionMessage {
    pub fn youtube_transcript(document: &TranscriptDocument) -> Self {
        ExtensionMessage::ProcessYouTubeTranscript {
            transcript: document.transcript.clone(),
            url: document.url.clone(),
            title: document.metadata.title.clone(),
            metadata: document.metadata.clone(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            ExtensionMessage::ProcessYouTubeTranscript { .. } => "processYouTubeTranscript",
            ExtensionMessage::ProcessContent { .. } => "processContent",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn transcript_message_matches_wire_shape() {
        let document = TranscriptDocument {
            text: "# T\n\n...".to_string(),
            transcript: "hello world".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            metadata: VideoMetadata {
                title: "T".to_string(),
                author: Some("A".to_string()),
                duration_seconds: Some(125),
                view_count: None,
            },
        };

        let value = serde_json::to_value(ExtensionMessage::youtube_transcript(&document))
            .expect("serializable");

        assert_eq!(
            value,
            json!({
                "action": "processYouTubeTranscript",
                "transcript": "hello world",
                "url": "https://www.youtube.com/watch?v=abc",
                "title": "T",
                "metadata": {"title": "T", "author": "A", "duration": 125}
            })
        );
    }

    #[test]
    fn content_message_round_trips_through_action_tag() {
        let raw = json!({
            "action": "processContent",
            "content": "# Selected Text",
            "source": "selection",
            "format": "text"
        });

        let message: ExtensionMessage = serde_json::from_value(raw).expect("known shape");

        assert_eq!(message.action(), "processContent");
        assert_eq!(
            message,
            ExtensionMessage::ProcessContent {
                content: "# Selected Text".to_string(),
                source: ContentSource::Selection,
                format: ContentFormat::Text,
            }
        );
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let raw = json!({"action": "openPopup"});

        assert!(serde_json::from_value::<ExtensionMessage>(raw).is_err());
    }
}
