use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    events::EnrichedEvent,
    queues::{FifoDropOldestQueue, IsolatedForwarder},
};

pub struct Routes {
    pub table: HashMap<&'static str, Vec<Route>>,
}

pub struct Route {
    pub subscriber_id: &'static str,
    pub inbox: RouteInbox,
    pub drops_total: Arc<AtomicU64>,
}

pub enum RouteInbox {
    FifoDropOldest(Arc<FifoDropOldestQueue<Arc<EnrichedEvent>>>),
    Isolated(IsolatedForwarder<Arc<EnrichedEvent>>),
}

impl Route {
    /// Hand `event` to the subscriber's inbox. Returns whether the event was
    /// accepted; evictions and rejections both count as drops.
    pub fn deliver(&self, event: Arc<EnrichedEvent>) -> bool {
        let accepted = match &self.inbox {
            RouteInbox::FifoDropOldest(q) => {
                if q.push_overwrite(event).is_some() {
                    self.drops_total.fetch_add(1, Ordering::Relaxed);
                }
                true
            }
            RouteInbox::Isolated(fwd) => fwd.try_send(event).is_ok(),
        };

        if !accepted {
            self.drops_total.fetch_add(1, Ordering::Relaxed);
        }
        accepted
    }
}
