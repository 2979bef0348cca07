use std::{any::Any, time::SystemTime};

use pinocchio_core::events::{Event, EventHeader};
use serde::Serialize;
use uuid::Uuid;

use crate::presenter::Presented;

#[derive(Clone, Debug, Serialize)]
pub struct ContentPresented {
    pub header: EventHeader,
    pub url: Option<String>,
    pub presented: Presented,
}

impl ContentPresented {
    pub const EVENT_TYPE: &'static str = "content.presented";

    pub fn new(parent_event_id: Uuid, url: Option<String>, presented: Presented) -> Self {
        Self {
            header: EventHeader::new(vec![parent_event_id]),
            url,
            presented,
        }
    }
}

impl Event for ContentPresented {
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

    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }
}
