pub mod fifo_drop_oldest_queue;
pub mod isolated_forwarder;

pub use fifo_drop_oldest_queue::*;
pub use isolated_forwarder::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Bounded buffer; a full buffer evicts its oldest entry.
    FifoDropOldest { capacity: usize },
    /// Delivery through a forwarding task; a full inbox drops the new event.
    Isolated { output_buffer: usize },
}
