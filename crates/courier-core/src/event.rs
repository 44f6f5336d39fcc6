use crate::call::CallEvent;
use crate::keys::CredsUpdate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CourierEvent {
    Call(Vec<CallEvent>),
    CredsUpdate(CredsUpdate),
}

pub type EventReceiver = broadcast::Receiver<CourierEvent>;

#[derive(Default)]
struct BufferState {
    depth: u32,
    pending: Vec<CourierEvent>,
}

// while a buffer() scope is open, emitted events are held back and
// published as a batch on the closing flush()
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CourierEvent>,
    buffered: Arc<Mutex<BufferState>>,
}

impl EventBus {
    pub fn new(size: usize) -> Self {
        let (tx, _) = broadcast::channel(size);
        Self {
            tx,
            buffered: Arc::new(Mutex::new(BufferState::default())),
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.tx.subscribe()
    }

    pub fn buffer(&self) {
        if let Ok(mut state) = self.buffered.lock() {
            state.depth += 1;
        }
    }

    pub fn emit(&self, event: CourierEvent) {
        if let Ok(mut state) = self.buffered.lock() {
            if state.depth > 0 {
                state.pending.push(event);
                return;
            }
        }
        let _ = self.tx.send(event);
    }

    pub fn flush(&self) {
        let drained = match self.buffered.lock() {
            Ok(mut state) => {
                state.depth = state.depth.saturating_sub(1);
                if state.depth == 0 {
                    std::mem::take(&mut state.pending)
                } else {
                    Vec::new()
                }
            }
            Err(_) => Vec::new(),
        };
        for event in drained {
            let _ = self.tx.send(event);
        }
    }
}
