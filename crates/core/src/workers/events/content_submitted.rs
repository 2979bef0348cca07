use std::{any::Any, sync::Arc, time::SystemTime};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    events::{Event, EventHeader},
    messages::{ContentFormat, ContentSource, ExtensionMessage},
    types::ContentDocument,
};

/// Formatted content handed on for presentation and scoring.
#[derive(Clone, Debug, Serialize)]
pub struct ContentSubmitted {
    pub header: EventHeader,
    pub source: ContentSource,
    pub format: ContentFormat,
    pub document: Arc<ContentDocument>,
}

impl ContentSubmitted {
    pub const EVENT_TYPE: &'static str = "content.submitted";

    /// `parent_ids` is empty for content submitted directly rather than
    /// derived from an earlier event.
    pub fn new(
        parent_ids: Vec<Uuid>,
        source: ContentSource,
        document: Arc<ContentDocument>,
    ) -> Self {
        Self {
            header: EventHeader::new(parent_ids),
            source,
            format: ContentFormat::Text,
            document,
        }
    }
}

impl Event for ContentSubmitted {
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
        Some(ExtensionMessage::ProcessContent {
            content: self.document.text.clone(),
            source: self.source,
            format: self.format,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }
}
