use crate::error::CoreError;
use crate::transport::Transport;
use courier_wire::BinaryNode;
use log::error;

pub fn build_ack(node: &BinaryNode) -> BinaryNode {
    let mut ack = BinaryNode::new("ack");
    if let Some(id) = node.attr("id") {
        ack.set_attr("id", id);
    }
    let to = node.attr("sender_lid").or_else(|| node.attr("from"));
    if let Some(to) = to {
        ack.set_attr("to", to);
    }
    ack.set_attr("class", &node.tag);
    if let Some(ty) = node.attr("type") {
        ack.set_attr("type", ty);
    }
    if let Some(participant) = node.attr("participant") {
        ack.set_attr("participant", participant);
    }
    ack
}

// well-formed message ids are uppercase hex; lowercase or a hyphen marks a
// legacy id
pub fn is_malformed_message_id(id: &str) -> bool {
    id.chars().any(|c| c.is_ascii_lowercase()) || id.contains('-')
}

pub async fn send_message_ack(
    transport: &dyn Transport,
    node: &BinaryNode,
) -> Result<(), CoreError> {
    transport.send_node(build_ack(node)).await?;

    if node.tag == "message" {
        if let Some(id) = node.attr("id") {
            if is_malformed_message_id(id) {
                error!(
                    "malformed message id {} (attrs {:?}), forcing connection reset",
                    id, node.attrs
                );
                transport.force_reset().await?;
            }
        }
    }
    Ok(())
}
