use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    events::{EnrichedEvent, EventBus},
    workers::{PipelineFailed, SubscriptionSpec, WorkerInputs},
};

#[async_trait]
pub trait Worker: Send + Sized + 'static {
    const SUBSCRIBER_ID: &'static str;

    fn subscription() -> SubscriptionSpec;

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> Result<()>;

    /// Consume inputs until shutdown. A failing `handle` is reported on the
    /// bus as [`PipelineFailed`] and the worker keeps running.
    async fn run(
        mut self,
        mut inputs: WorkerInputs,
        bus: Arc<EventBus>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => return Ok(()),
                item = inputs.next() => {
                    let parent = Arc::clone(&item.event.event);
                    if let Err(e) = self.handle(item.event, &bus).await {
                        tracing::warn!(
                            worker = Self::SUBSCRIBER_ID,
                            event_type = item.event_type,
                            error = %e,
                            "worker failed"
                        );
                        bus.publish(Arc::new(PipelineFailed::new(
                            parent,
                            Self::SUBSCRIBER_ID,
                            format!("{e:#}"),
                        )));
                    }
                },
            }
        }
    }
}
