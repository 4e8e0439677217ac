//! RESP Module
//!
//! Redis serialization protocol: value model, streaming decoder, encoder and
//! the [`Protocol`](crate::protocol::Protocol) adapter used by the registry.

mod codec;
mod decoder;
mod encoder;
mod value;

use crate::protocol::ProtocolName;

pub use codec::RespProtocol;
pub use decoder::{decode, decode_from_bytes, decode_multi_bulk_from_bytes, Decoder};
pub use encoder::{encode, encode_to_buffer, encode_to_bytes, Encoder};
pub use value::{RespType, RespValue};

/// Registry name of the RESP protocol
pub const RESP: ProtocolName = ProtocolName::new("redis");
