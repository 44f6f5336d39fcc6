use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, WireError};

/// A tagged, attributed, nestable protocol stanza. Children and raw byte
/// payloads are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum NodeContent {
    #[default]
    None,
    Children(Vec<BinaryNode>),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BinaryNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub content: NodeContent,
}

impl BinaryNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: HashMap::new(),
            content: NodeContent::None,
        }
    }

    pub fn with_attrs(tag: &str, pairs: &[(&str, &str)]) -> Self {
        let mut node = Self::new(tag);
        for (name, value) in pairs {
            node.set_attr(name, value);
        }
        node
    }

    pub fn with_bytes(tag: &str, bytes: Vec<u8>) -> Self {
        let mut node = Self::new(tag);
        node.content = NodeContent::Bytes(bytes);
        node
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    pub fn push_child(&mut self, child: BinaryNode) {
        match &mut self.content {
            NodeContent::Children(children) => children.push(child),
            _ => self.content = NodeContent::Children(vec![child]),
        }
    }

    pub fn children(&self) -> &[BinaryNode] {
        match &self.content {
            NodeContent::Children(children) => children,
            _ => &[],
        }
    }

    pub fn child(&self, tag: &str) -> Option<&BinaryNode> {
        self.children().iter().find(|c| c.tag == tag)
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag.is_empty() || self.tag.len() > 64 {
            return Err(WireError::InvalidField("tag"));
        }
        for (name, value) in &self.attrs {
            if name.is_empty() || name.len() > 64 {
                return Err(WireError::InvalidField("attr name"));
            }
            if value.len() > 1024 {
                return Err(WireError::InvalidField("attr value"));
            }
        }
        if let NodeContent::Children(children) = &self.content {
            for child in children {
                child.validate()?;
            }
        }
        Ok(())
    }
}

/// Big-endian encoding of the low `width` bytes of `value`.
pub fn encode_big_endian(value: u32, width: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    let start = full.len().saturating_sub(width.min(full.len()));
    full[start..].to_vec()
}
