mod codec;
mod error;
mod node;

pub use crate::codec::{from_json_str, to_json_string};
pub use crate::error::{Result, WireError};
pub use crate::node::{encode_big_endian, BinaryNode, NodeContent};

#[cfg(test)]
mod tests;
