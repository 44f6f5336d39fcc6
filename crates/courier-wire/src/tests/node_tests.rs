use crate::codec::{from_json_str, to_json_string};
use crate::node::{encode_big_endian, BinaryNode, NodeContent};

#[test]
fn attr_lookup_and_set() {
    let mut node = BinaryNode::with_attrs("receipt", &[("id", "3EB0C4"), ("type", "retry")]);
    assert_eq!(node.attr("id"), Some("3EB0C4"));
    assert_eq!(node.attr("missing"), None);
    node.set_attr("to", "123@s.whatsapp.net");
    assert_eq!(node.attr("to"), Some("123@s.whatsapp.net"));
}

#[test]
fn push_child_replaces_non_children_content() {
    let mut node = BinaryNode::with_bytes("registration", vec![0, 0, 1, 2]);
    node.push_child(BinaryNode::new("retry"));
    assert!(node.bytes().is_none());
    assert_eq!(node.children().len(), 1);
}

#[test]
fn child_finds_first_match() {
    let mut node = BinaryNode::new("call");
    node.push_child(BinaryNode::with_attrs("offer", &[("call-id", "C1")]));
    node.push_child(BinaryNode::new("video"));
    let offer = node.child("offer").expect("offer child");
    assert_eq!(offer.attr("call-id"), Some("C1"));
    assert!(node.child("audio").is_none());
}

#[test]
fn big_endian_widths() {
    assert_eq!(encode_big_endian(1234, 4), vec![0, 0, 4, 210]);
    assert_eq!(encode_big_endian(1, 3), vec![0, 0, 1]);
    assert_eq!(encode_big_endian(0x0A0B0C0D, 2), vec![0x0C, 0x0D]);
    assert_eq!(encode_big_endian(7, 9), vec![0, 0, 0, 7]);
}

#[test]
fn node_json_roundtrip() {
    let mut receipt = BinaryNode::with_attrs("receipt", &[("id", "M1"), ("type", "retry")]);
    receipt.push_child(BinaryNode::with_attrs("retry", &[("count", "1"), ("v", "1")]));
    receipt.push_child(BinaryNode::with_bytes("registration", vec![0, 0, 4, 210]));
    let json = to_json_string(&receipt).expect("json");
    let parsed: BinaryNode = from_json_str(&json).expect("parsed");
    assert_eq!(receipt, parsed);
}

#[test]
fn validate_rejects_empty_tag() {
    let node = BinaryNode::new("");
    assert!(node.validate().is_err());
}

#[test]
fn validate_recurses_into_children() {
    let mut node = BinaryNode::new("message");
    node.content = NodeContent::Children(vec![BinaryNode::new("")]);
    assert!(node.validate().is_err());
}
