use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    events::{BusConfig, BusMetrics, EnrichedEvent, Event},
    routes::Routes,
};

/// Fire-and-forget fan-out of events to their subscribers.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    session_id: Uuid,
    next_ingest_seq: AtomicU64,
    routes: Arc<Routes>,
    metrics: Arc<BusMetrics>,
    strict_routing: bool,
}

impl EventBus {
    pub fn new(cfg: BusConfig, routes: Routes, metrics: Arc<BusMetrics>) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                session_id: cfg.session_id,
                next_ingest_seq: AtomicU64::new(0),
                routes: Arc::new(routes),
                metrics,
                strict_routing: cfg.strict_routing,
            }),
        }
    }

    /// Deliver `event` to every subscriber of its type and return how many
    /// inboxes accepted it.
    pub fn publish(&self, event: Arc<dyn Event>) -> usize {
        let ingest_seq = self.inner.next_ingest_seq.fetch_add(1, Ordering::Relaxed);
        let event_type = event.event_type();

        if tracing::enabled!(tracing::Level::TRACE) {
            match serde_json::to_string(&*event) {
                Ok(body) => tracing::trace!(event_type, ingest_seq, %body, "publish"),
                Err(err) => tracing::trace!(event_type, ingest_seq, %err, "publish (unserializable)"),
            }
        }

        let enriched_event = Arc::new(EnrichedEvent {
            event,
            session_id: self.inner.session_id,
            ingest_seq,
            ingested_at: Instant::now(),
        });

        let Some(routes) = self.inner.routes.table.get(event_type) else {
            self.inner.metrics.record_unrouted(event_type);

            if self.inner.strict_routing {
                tracing::error!(event_type, "unrouted event type");
            } else {
                tracing::debug!(event_type, "no subscribers");
            }

            return 0;
        };

        let mut delivered = 0;
        for route in routes {
            if route.deliver(Arc::clone(&enriched_event)) {
                delivered += 1;
            } else {
                tracing::warn!(
                    event_type,
                    subscriber = route.subscriber_id,
                    "subscriber inbox full, event dropped"
                );
            }
        }

        delivered
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.inner.metrics
    }

    /// Events dropped so far on the route of `subscriber_id` for `event_type`.
    pub fn drops(&self, event_type: &str, subscriber_id: &str) -> u64 {
        self.inner
            .routes
            .table
            .get(event_type)
            .into_iter()
            .flatten()
            .filter(|route| route.subscriber_id == subscriber_id)
            .map(|route| route.drops_total.load(Ordering::Relaxed))
            .sum()
    }
}
