pub mod ack;
pub mod call;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod keys;
pub mod queue;
pub mod retry;
pub mod time;
pub mod transport;
pub mod ttl_cache;

#[cfg(test)]
mod tests;

use call::{CallEvent, CallHandler, CallPolicy};
use config::ReceiveConfig;
use dispatch::{categorize, ErrorSink, NodeCategory, Queues};
use error::CoreError;
use event::{EventBus, EventReceiver};
use keys::AuthCreds;
use log::{debug, warn};
use retry::RetryHandler;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use transport::Transport;
use ttl_cache::TtlCache;

use courier_wire::BinaryNode;

pub struct ReceiveCore {
    transport: Arc<dyn Transport>,
    events: EventBus,
    retry: RetryHandler,
    calls: CallHandler,
    queues: Queues,
    error_sink: Arc<dyn ErrorSink>,
    pub(crate) retry_counters: Arc<TtlCache<String, u32>>,
    pub(crate) call_offers: Arc<TtlCache<String, CallEvent>>,
}

impl ReceiveCore {
    pub fn new(
        config: ReceiveConfig,
        creds: AuthCreds,
        transport: Arc<dyn Transport>,
        call_policy: Arc<dyn CallPolicy>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Arc<Self> {
        let events = EventBus::new(config.event_channel_size);
        let retry_counters = Arc::new(TtlCache::new(Duration::from_secs(
            config.msg_retry_ttl_secs,
        )));
        let call_offers = Arc::new(TtlCache::new(Duration::from_secs(
            config.call_offer_ttl_secs,
        )));
        let creds = Arc::new(Mutex::new(creds));
        let retry = RetryHandler::new(
            &config,
            transport.clone(),
            creds,
            retry_counters.clone(),
            events.clone(),
        );
        let calls = CallHandler::new(
            transport.clone(),
            call_offers.clone(),
            events.clone(),
            call_policy,
        );
        Arc::new(Self {
            transport,
            events,
            retry,
            calls,
            queues: Queues::new(),
            error_sink,
            retry_counters,
            call_offers,
        })
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    pub fn call_offer_cached(&self, call_id: &str) -> bool {
        self.call_offers.contains(&call_id.to_string())
    }

    pub fn retry_count(&self, msg_id: &str) -> Option<u32> {
        self.retry_counters.get(&msg_id.to_string())
    }

    pub async fn send_message_ack(&self, node: &BinaryNode) -> Result<(), CoreError> {
        ack::send_message_ack(self.transport.as_ref(), node).await
    }

    pub async fn send_retry_request(
        &self,
        node: &BinaryNode,
        force_include_keys: bool,
    ) -> Result<(), CoreError> {
        self.retry.send_retry_request(node, force_include_keys).await
    }

    pub async fn handle_call(&self, node: &BinaryNode) -> Result<(), CoreError> {
        self.calls.handle_call(node).await
    }

    pub async fn reject_call(&self, call_id: &str, call_from: &str) -> Result<(), CoreError> {
        self.calls.reject_call(call_id, call_from).await
    }

    // the flush happens exactly once whether the handler succeeds or fails
    pub async fn process_node_with_buffer<F>(&self, identifier: &str, task: F)
    where
        F: Future<Output = Result<(), CoreError>>,
    {
        self.events.buffer();
        if let Err(err) = task.await {
            self.error_sink.on_unexpected_error(&err, identifier);
        }
        self.events.flush();
    }

    pub async fn dispatch(self: &Arc<Self>, node: BinaryNode) -> Result<(), CoreError> {
        let category = categorize(&node.tag);
        let queue = self.queues.for_category(category);
        let core = Arc::clone(self);
        match category {
            NodeCategory::Message | NodeCategory::Other => {
                queue
                    .run(async move {
                        core.process_node_with_buffer(
                            "handling message",
                            core.handle_message_node(&node),
                        )
                        .await;
                    })
                    .await
            }
            NodeCategory::Receipt => {
                queue
                    .run(async move {
                        core.process_node_with_buffer(
                            "handling receipt",
                            core.handle_receipt_node(&node),
                        )
                        .await;
                    })
                    .await
            }
            NodeCategory::Notification => {
                queue
                    .run(async move {
                        core.process_node_with_buffer(
                            "handling notification",
                            core.handle_notification_node(&node),
                        )
                        .await;
                    })
                    .await
            }
            NodeCategory::BadAck => {
                queue
                    .run(async move {
                        core.process_node_with_buffer(
                            "handling bad ack",
                            core.handle_bad_ack_node(&node),
                        )
                        .await;
                    })
                    .await
            }
            NodeCategory::Call => {
                queue
                    .run(async move {
                        core.process_node_with_buffer("handling call", core.calls.handle_call(&node))
                            .await;
                    })
                    .await
            }
        }
    }

    async fn handle_message_node(&self, node: &BinaryNode) -> Result<(), CoreError> {
        self.send_message_ack(node).await?;
        debug!("acked message {}", node.attr("id").unwrap_or_default());
        Ok(())
    }

    async fn handle_receipt_node(&self, node: &BinaryNode) -> Result<(), CoreError> {
        self.send_message_ack(node).await?;
        if node.attr("type") == Some("retry") {
            debug!(
                "peer requested retransmission of {}",
                node.attr("id").unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn handle_notification_node(&self, node: &BinaryNode) -> Result<(), CoreError> {
        self.send_message_ack(node).await?;
        debug!(
            "acked notification {} ({})",
            node.attr("id").unwrap_or_default(),
            node.attr("type").unwrap_or_default()
        );
        Ok(())
    }

    // an errored ack means the far end saw the stanza, so the pending retry
    // counter for that id is moot
    async fn handle_bad_ack_node(&self, node: &BinaryNode) -> Result<(), CoreError> {
        if let Some(error) = node.attr("error") {
            let id = node.attr("id").unwrap_or_default();
            warn!(
                "ack error {} for {} (class {})",
                error,
                id,
                node.attr("class").unwrap_or_default()
            );
            self.retry.clear_counter(id);
        }
        Ok(())
    }
}
