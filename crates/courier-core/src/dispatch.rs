use crate::error::CoreError;
use crate::queue::SerialQueue;
use log::error;

// handler errors land here instead of tearing down the receive loop
pub trait ErrorSink: Send + Sync {
    fn on_unexpected_error(&self, error: &CoreError, identifier: &str);
}

pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn on_unexpected_error(&self, error: &CoreError, identifier: &str) {
        error!("unexpected error in {}: {}", identifier, error);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    Message,
    Receipt,
    Notification,
    BadAck,
    Call,
    Other,
}

pub fn categorize(tag: &str) -> NodeCategory {
    match tag {
        "message" => NodeCategory::Message,
        "receipt" => NodeCategory::Receipt,
        "notification" => NodeCategory::Notification,
        "ack" => NodeCategory::BadAck,
        "call" => NodeCategory::Call,
        _ => NodeCategory::Other,
    }
}

// one lane per category; categories never block each other
pub struct Queues {
    pub upsert: SerialQueue,
    pub bad_ack: SerialQueue,
    pub notification: SerialQueue,
    pub receipt: SerialQueue,
    pub call: SerialQueue,
}

impl Queues {
    pub fn new() -> Self {
        Self {
            upsert: SerialQueue::new("upsert"),
            bad_ack: SerialQueue::new("bad-ack"),
            notification: SerialQueue::new("notification"),
            receipt: SerialQueue::new("receipt"),
            call: SerialQueue::new("call"),
        }
    }

    pub fn for_category(&self, category: NodeCategory) -> &SerialQueue {
        match category {
            NodeCategory::Message | NodeCategory::Other => &self.upsert,
            NodeCategory::BadAck => &self.bad_ack,
            NodeCategory::Notification => &self.notification,
            NodeCategory::Receipt => &self.receipt,
            NodeCategory::Call => &self.call,
        }
    }
}

impl Default for Queues {
    fn default() -> Self {
        Self::new()
    }
}
