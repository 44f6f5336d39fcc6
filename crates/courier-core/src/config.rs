use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ReceiveConfig {
    pub max_msg_retry_count: u32,
    pub msg_retry_ttl_secs: u64,
    pub call_offer_ttl_secs: u64,
    pub event_channel_size: usize,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            max_msg_retry_count: 5,
            msg_retry_ttl_secs: 3600,
            call_offer_ttl_secs: 300,
            event_channel_size: 256,
        }
    }
}
