use std::sync::Arc;

use async_trait::async_trait;
use pinocchio_core::{
    events::{EnrichedEvent, EventBus, downcast_ref},
    queues::QueueKind,
    workers::{InputSpec, PipelineFailed, SubscriptionSpec, Worker},
};
use tokio::sync::oneshot;

use crate::{presenter::Presented, workers::events::ContentPresented};

pub type Completion = Result<Presented, PipelineFailed>;

/// Resolves the CLI's wait with the first outcome the pipeline reports.
pub struct CliCompletionSinkWorker {
    done: Option<oneshot::Sender<Completion>>,
}

impl CliCompletionSinkWorker {
    pub fn new(done: oneshot::Sender<Completion>) -> Self {
        Self { done: Some(done) }
    }

    fn complete(&mut self, outcome: Completion) {
        match self.done.take() {
            Some(done) => {
                if done.send(outcome).is_err() {
                    tracing::debug!("completion receiver already gone");
                }
            }
            None => tracing::debug!("pipeline already completed, ignoring outcome"),
        }
    }
}

#[async_trait]
impl Worker for CliCompletionSinkWorker {
    const SUBSCRIBER_ID: &'static str = "cli.completion_sink";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![
                InputSpec {
                    event_type: ContentPresented::EVENT_TYPE,
                    queue_kind: QueueKind::Isolated { output_buffer: 4 },
                },
                InputSpec {
                    event_type: PipelineFailed::EVENT_TYPE,
                    queue_kind: QueueKind::FifoDropOldest { capacity: 4 },
                },
            ],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, _bus: &EventBus) -> anyhow::Result<()> {
        if let Some(presented) = downcast_ref::<ContentPresented>(&event.event) {
            self.complete(Ok(presented.presented.clone()));
        }

        if let Some(failed) = downcast_ref::<PipelineFailed>(&event.event) {
            self.complete(Err(failed.clone()));
        }
        Ok(())
    }
}
