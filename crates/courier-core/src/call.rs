use crate::ack::build_ack;
use crate::error::CoreError;
use crate::event::{CourierEvent, EventBus};
use crate::time::unix_timestamp_seconds;
use crate::transport::Transport;
use crate::ttl_cache::TtlCache;
use async_trait::async_trait;
use courier_wire::BinaryNode;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Offer,
    Accept,
    Reject,
    Timeout,
    Ringing,
    Terminate,
}

impl CallStatus {
    pub fn from_info_node(info: &BinaryNode) -> Self {
        match info.tag.as_str() {
            "offer" | "offer_notice" => CallStatus::Offer,
            "accept" => CallStatus::Accept,
            "reject" => CallStatus::Reject,
            "terminate" => {
                if info.attr("reason") == Some("timeout") {
                    CallStatus::Timeout
                } else {
                    CallStatus::Terminate
                }
            }
            _ => CallStatus::Ringing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Reject | CallStatus::Accept | CallStatus::Timeout
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Offer => "offer",
            CallStatus::Accept => "accept",
            CallStatus::Reject => "reject",
            CallStatus::Timeout => "timeout",
            CallStatus::Ringing => "ringing",
            CallStatus::Terminate => "terminate",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CallEvent {
    pub chat_id: String,
    pub from: String,
    pub call_id: String,
    pub timestamp: u64,
    pub offline: bool,
    pub status: CallStatus,
    pub is_video: bool,
    pub is_group: bool,
    pub group_jid: Option<String>,
}

#[async_trait]
pub trait CallPolicy: Send + Sync {
    async fn reject_call(&self, call_id: &str, call_from: &str) -> Result<(), CoreError>;
}

// leaves incoming calls ringing until they time out on their own
pub struct NeverReject;

#[async_trait]
impl CallPolicy for NeverReject {
    async fn reject_call(&self, call_id: &str, call_from: &str) -> Result<(), CoreError> {
        warn!("call {} from {} left to ring, rejection suppressed", call_id, call_from);
        Ok(())
    }
}

pub struct CallHandler {
    transport: Arc<dyn Transport>,
    offers: Arc<TtlCache<String, CallEvent>>,
    events: EventBus,
    policy: Arc<dyn CallPolicy>,
}

impl CallHandler {
    pub fn new(
        transport: Arc<dyn Transport>,
        offers: Arc<TtlCache<String, CallEvent>>,
        events: EventBus,
        policy: Arc<dyn CallPolicy>,
    ) -> Self {
        Self {
            transport,
            offers,
            events,
            policy,
        }
    }

    pub async fn handle_call(&self, node: &BinaryNode) -> Result<(), CoreError> {
        let info = node
            .children()
            .first()
            .ok_or_else(|| CoreError::Validation("call node without child".to_string()))?;
        let call_id = info.attr("call-id").unwrap_or_default().to_string();
        let from = info
            .attr("from")
            .or_else(|| info.attr("call-creator"))
            .unwrap_or_default()
            .to_string();
        let status = CallStatus::from_info_node(info);

        let mut ack = build_ack(node);
        ack.set_attr("class", "call");
        self.transport.send_node(ack).await?;

        let mut call = CallEvent {
            chat_id: node.attr("from").unwrap_or_default().to_string(),
            from,
            call_id: call_id.clone(),
            timestamp: node
                .attr("t")
                .and_then(|t| t.parse().ok())
                .unwrap_or_else(unix_timestamp_seconds),
            offline: node.attr("offline").is_some(),
            status,
            is_video: false,
            is_group: false,
            group_jid: None,
        };

        if status == CallStatus::Offer {
            call.is_video = info.child("video").is_some();
            call.is_group =
                info.attr("type") == Some("group") || info.attr("group-jid").is_some();
            call.group_jid = info.attr("group-jid").map(str::to_string);
            info!(
                "incoming call {} from {} (video {}, group {})",
                call.call_id, call.from, call.is_video, call.is_group
            );
            self.offers.set(call_id, call.clone());
            self.events.emit(CourierEvent::Call(vec![call]));
            return Ok(());
        }

        // Later signaling never repeats the media/group metadata; carry it
        // over from the cached offer.
        if let Some(existing) = self.offers.get(&call_id) {
            call.is_video = existing.is_video;
            call.is_group = existing.is_group;
        }

        if status.is_terminal() {
            self.offers.delete(&call_id);
            info!("call {} finished with {}", call_id, status.as_str());
        }

        self.events.emit(CourierEvent::Call(vec![call]));
        Ok(())
    }

    pub async fn reject_call(&self, call_id: &str, call_from: &str) -> Result<(), CoreError> {
        self.policy.reject_call(call_id, call_from).await
    }
}
