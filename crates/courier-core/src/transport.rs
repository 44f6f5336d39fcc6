use crate::error::CoreError;
use async_trait::async_trait;
use courier_wire::BinaryNode;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_node(&self, node: BinaryNode) -> Result<(), CoreError>;
    // tears down and re-establishes the connection
    async fn force_reset(&self) -> Result<(), CoreError>;
}

#[derive(Clone, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<BinaryNode>>>,
    resets: Arc<Mutex<u32>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<BinaryNode> {
        self.sent.lock().await.clone()
    }

    pub async fn reset_count(&self) -> u32 {
        *self.resets.lock().await
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_node(&self, node: BinaryNode) -> Result<(), CoreError> {
        let mut guard = self.sent.lock().await;
        guard.push(node);
        Ok(())
    }

    async fn force_reset(&self) -> Result<(), CoreError> {
        let mut guard = self.resets.lock().await;
        *guard += 1;
        Ok(())
    }
}
