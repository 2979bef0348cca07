use std::sync::Arc;

use anyhow::Context as _;
use pinocchio_core::{
    events::{BusConfig, EventBus, EventBusBuilder},
    workers::Worker,
};
use tokio::sync::{broadcast, oneshot};

use crate::{
    presenter::Presenter,
    workers::{
        cli_completion_sink::{CliCompletionSinkWorker, Completion},
        content_forwarder::ContentForwarderWorker,
        present_content::PresentContentWorker,
    },
};

pub struct PipelineHandle {
    pub bus: Arc<EventBus>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub done_rx: oneshot::Receiver<Completion>,
}

impl PipelineHandle {
    /// Stop every worker. Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Wire the bus and spawn the workers that take an extracted transcript
/// through presentation to the completion sink.
pub fn start_pipeline(
    bus_config: BusConfig,
    presenter: Arc<dyn Presenter>,
) -> anyhow::Result<PipelineHandle> {
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (done_tx, done_rx) = oneshot::channel::<Completion>();

    let (bus, mut wiring, tasks) = EventBusBuilder::new(bus_config)
        .subscribe(ContentForwarderWorker::subscription())
        .subscribe(PresentContentWorker::subscription())
        .subscribe(CliCompletionSinkWorker::subscription())
        .build()
        .context("build event bus")?;
    let bus = Arc::new(bus);
    tracing::debug!(session_id = %bus.session_id(), "event bus ready");

    // drain tasks must run before anything is published
    for task in tasks.tokio {
        tokio::spawn(task);
    }

    let forwarder_inputs = wiring
        .take(ContentForwarderWorker::SUBSCRIBER_ID)
        .context("content forwarder inputs")?;
    let present_inputs = wiring
        .take(PresentContentWorker::SUBSCRIBER_ID)
        .context("presenter inputs")?;
    let sink_inputs = wiring
        .take(CliCompletionSinkWorker::SUBSCRIBER_ID)
        .context("completion sink inputs")?;

    tokio::spawn(ContentForwarderWorker.run(
        forwarder_inputs,
        Arc::clone(&bus),
        shutdown_tx.subscribe(),
    ));
    tokio::spawn(PresentContentWorker::new(presenter).run(
        present_inputs,
        Arc::clone(&bus),
        shutdown_tx.subscribe(),
    ));
    tokio::spawn(CliCompletionSinkWorker::new(done_tx).run(
        sink_inputs,
        Arc::clone(&bus),
        shutdown_tx.subscribe(),
    ));
    tracing::debug!("pipeline workers started");

    Ok(PipelineHandle {
        bus,
        shutdown_tx,
        done_rx,
    })
}
