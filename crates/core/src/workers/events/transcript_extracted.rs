use std::{any::Any, sync::Arc, time::SystemTime};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    events::{Event, EventHeader},
    messages::ExtensionMessage,
    types::TranscriptDocument,
};

/// Emitted once per successful acquisition.
#[derive(Clone, Debug, Serialize)]
pub struct TranscriptExtracted {
    pub header: EventHeader,
    pub video_id: String,
    pub document: Arc<TranscriptDocument>,
}

impl TranscriptExtracted {
    pub const EVENT_TYPE: &'static str = "youtube.transcript_extracted";

    pub fn new(video_id: String, document: Arc<TranscriptDocument>) -> Self {
        Self {
            header: EventHeader::new(Vec::new()),
            video_id,
            document,
        }
    }
}

impl Event for TranscriptExtracted {
    fn event_id(&self) -> Uuid {
        self.header.event_id
    }

    fn parent_ids(&self) -> &[Uuid] {
        &self.header.parent_ids
    }

    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn timestamp(&self) -> SystemTime {
        self.header.timestamp
    }

    fn message(&self) -> Option<ExtensionMessage> {
        Some(ExtensionMessage::youtube_transcript(&self.document))
    }

    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }
}
