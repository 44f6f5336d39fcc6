
use crate::call::NeverReject;
use crate::config::ReceiveConfig;
use crate::dispatch::{ErrorSink, LogErrorSink};
use crate::error::CoreError;
use crate::keys::AuthCreds;
use crate::transport::{MockTransport, Transport};
use crate::ReceiveCore;
use async_trait::async_trait;
use courier_wire::BinaryNode;
use std::sync::{Arc, Mutex};

pub fn test_config() -> ReceiveConfig {
    ReceiveConfig {
        max_msg_retry_count: 5,
        msg_retry_ttl_secs: 60,
        call_offer_ttl_secs: 60,
        event_channel_size: 64,
    }
}

pub fn test_core(config: ReceiveConfig) -> (Arc<ReceiveCore>, MockTransport) {
    let transport = MockTransport::new();
    let core = ReceiveCore::new(
        config,
        AuthCreds::generate(4321),
        Arc::new(transport.clone()),
        Arc::new(NeverReject),
        Arc::new(LogErrorSink),
    );
    (core, transport)
}

pub fn message_node(id: &str, from: &str) -> BinaryNode {
    BinaryNode::with_attrs(
        "message",
        &[("id", id), ("from", from), ("t", "1700000000")],
    )
}

pub fn call_info(info_tag: &str, call_id: &str, creator: &str) -> BinaryNode {
    BinaryNode::with_attrs(info_tag, &[("call-id", call_id), ("call-creator", creator)])
}

pub fn call_node_with_info(info: BinaryNode, chat: &str) -> BinaryNode {
    let mut node = BinaryNode::with_attrs(
        "call",
        &[("id", "ACK1"), ("from", chat), ("t", "1700000000")],
    );
    node.push_child(info);
    node
}

pub fn call_node(info_tag: &str, call_id: &str, chat: &str, creator: &str) -> BinaryNode {
    call_node_with_info(call_info(info_tag, call_id, creator), chat)
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ErrorSink for RecordingSink {
    fn on_unexpected_error(&self, _error: &CoreError, identifier: &str) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(identifier.to_string());
        }
    }
}

#[derive(Clone)]
pub struct FailingTransport {
    inner: MockTransport,
    fail_sends: Arc<tokio::sync::Mutex<usize>>,
}

impl FailingTransport {
    pub fn new(fail_sends: usize) -> Self {
        Self {
            inner: MockTransport::new(),
            fail_sends: Arc::new(tokio::sync::Mutex::new(fail_sends)),
        }
    }

    pub async fn sent(&self) -> Vec<BinaryNode> {
        self.inner.sent().await
    }
}

#[async_trait]
impl Transport for FailingTransport {
    async fn send_node(&self, node: BinaryNode) -> Result<(), CoreError> {
        let mut guard = self.fail_sends.lock().await;
        if *guard > 0 {
            *guard -= 1;
            return Err(CoreError::Transport("send".to_string()));
        }
        drop(guard);
        self.inner.send_node(node).await
    }

    async fn force_reset(&self) -> Result<(), CoreError> {
        self.inner.force_reset().await
    }
}
