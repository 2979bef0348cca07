use std::sync::Arc;

use async_trait::async_trait;
use pinocchio_core::{
    events::{EnrichedEvent, EventBus, expect},
    queues::QueueKind,
    workers::{ContentSubmitted, InputSpec, SubscriptionSpec, Worker},
};

use crate::{presenter::Presenter, workers::events::ContentPresented};

pub struct PresentContentWorker {
    presenter: Arc<dyn Presenter>,
}

impl PresentContentWorker {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self { presenter }
    }
}

#[async_trait]
impl Worker for PresentContentWorker {
    const SUBSCRIBER_ID: &'static str = "present.content";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec {
                event_type: ContentSubmitted::EVENT_TYPE,
                queue_kind: QueueKind::Isolated { output_buffer: 4 },
            }],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let submitted = expect::<ContentSubmitted>(&event.event, ContentSubmitted::EVENT_TYPE)?;
        let document = &submitted.document;

        tracing::info!(
            presenter = self.presenter.name(),
            source = ?submitted.source,
            content_type = document.content_type.as_str(),
            url = document.url.as_deref().unwrap_or("-"),
            "presenting content"
        );
        let presented = self.presenter.present(document).await?;

        bus.publish(Arc::new(ContentPresented::new(
            event.event.event_id(),
            document.url.clone(),
            presented,
        )));
        Ok(())
    }
}
