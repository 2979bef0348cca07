use std::sync::Arc;

use async_trait::async_trait;
use pinocchio_core::{
    ContentDocument, ContentSource,
    events::{EnrichedEvent, EventBus, expect},
    queues::QueueKind,
    workers::{ContentSubmitted, InputSpec, SubscriptionSpec, TranscriptExtracted, Worker},
};

/// Hands extracted transcripts on as submitted YouTube content.
pub struct ContentForwarderWorker;

#[async_trait]
impl Worker for ContentForwarderWorker {
    const SUBSCRIBER_ID: &'static str = "content.forwarder";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec {
                event_type: TranscriptExtracted::EVENT_TYPE,
                queue_kind: QueueKind::FifoDropOldest { capacity: 4 },
            }],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let extracted = expect::<TranscriptExtracted>(&event.event, TranscriptExtracted::EVENT_TYPE)?;
        tracing::debug!(video_id = %extracted.video_id, "forwarding transcript");

        bus.publish(Arc::new(ContentSubmitted::new(
            vec![event.event.event_id()],
            ContentSource::Youtube,
            Arc::new(ContentDocument::from_transcript(&extracted.document)),
        )));
        Ok(())
    }
}
