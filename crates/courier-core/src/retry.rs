use crate::config::ReceiveConfig;
use crate::error::CoreError;
use crate::event::{CourierEvent, EventBus};
use crate::keys::{prekey_node, signed_prekey_node, AuthCreds, KEY_BUNDLE_TYPE};
use crate::transport::Transport;
use crate::ttl_cache::TtlCache;
use courier_wire::{encode_big_endian, BinaryNode};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct RetryHandler {
    transport: Arc<dyn Transport>,
    creds: Arc<Mutex<AuthCreds>>,
    counters: Arc<TtlCache<String, u32>>,
    events: EventBus,
    max_retry_count: u32,
}

impl RetryHandler {
    pub fn new(
        config: &ReceiveConfig,
        transport: Arc<dyn Transport>,
        creds: Arc<Mutex<AuthCreds>>,
        counters: Arc<TtlCache<String, u32>>,
        events: EventBus,
    ) -> Self {
        Self {
            transport,
            creds,
            counters,
            events,
            max_retry_count: config.max_msg_retry_count,
        }
    }

    pub fn clear_counter(&self, msg_id: &str) {
        self.counters.delete(&msg_id.to_string());
    }

    pub async fn send_retry_request(
        &self,
        node: &BinaryNode,
        force_include_keys: bool,
    ) -> Result<(), CoreError> {
        let msg_id = node
            .attr("id")
            .ok_or_else(|| CoreError::Validation("retry node missing id".to_string()))?
            .to_string();

        let mut retry_count = self.counters.get(&msg_id).unwrap_or(0);
        if retry_count >= self.max_retry_count {
            debug!("reached retry limit for {}, clearing", msg_id);
            self.counters.delete(&msg_id);
            return Ok(());
        }
        // counted before the send, a failed send still burns an attempt
        retry_count += 1;
        self.counters.set(msg_id.clone(), retry_count);

        // Key-material transaction: the lock is held through the send so the
        // drawn prekey cannot race another consumer.
        let mut creds = self.creds.lock().await;

        let mut receipt = BinaryNode::new("receipt");
        receipt.set_attr("id", &msg_id);
        receipt.set_attr("type", "retry");
        if let Some(from) = node.attr("from") {
            receipt.set_attr("to", from);
        }
        if let Some(recipient) = node.attr("recipient") {
            receipt.set_attr("recipient", recipient);
        }
        if let Some(participant) = node.attr("participant") {
            receipt.set_attr("participant", participant);
        }

        let mut retry_el = BinaryNode::new("retry");
        retry_el.set_attr("count", &retry_count.to_string());
        retry_el.set_attr("id", &msg_id);
        if let Some(t) = node.attr("t") {
            retry_el.set_attr("t", t);
        }
        retry_el.set_attr("v", "1");
        receipt.push_child(retry_el);

        receipt.push_child(BinaryNode::with_bytes(
            "registration",
            encode_big_endian(creds.registration_id, 4),
        ));

        if retry_count > 1 || force_include_keys {
            let (prekey, update) = creds.take_next_prekey();
            let mut keys = BinaryNode::new("keys");
            keys.push_child(BinaryNode::with_bytes("type", KEY_BUNDLE_TYPE.to_vec()));
            keys.push_child(BinaryNode::with_bytes(
                "identity",
                creds.identity_public.to_vec(),
            ));
            keys.push_child(prekey_node(&prekey));
            keys.push_child(signed_prekey_node(&creds.signed_prekey));
            keys.push_child(BinaryNode::with_bytes(
                "device-identity",
                creds.device_identity.clone(),
            ));
            receipt.push_child(keys);
            self.events.emit(CourierEvent::CredsUpdate(update));
        }

        self.transport.send_node(receipt).await?;
        info!(
            "sent retry receipt for {} (attrs {:?}, count {})",
            msg_id, node.attrs, retry_count
        );
        Ok(())
    }
}
