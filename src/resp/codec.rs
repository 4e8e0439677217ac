//! RESP protocol adapter
//!
//! Lets the connection loop drive RESP through the generic
//! [`Protocol`] capability set. Decoding runs the streaming decoder over the
//! accumulated bytes; running out of input means the value is incomplete.
//!
//! Before decoding, a framing scan checks that a whole value is buffered. The
//! scan reads only headers and skips bulk payloads by their declared length,
//! so a large value arriving in many chunks is copied out once, not once per
//! chunk.

use std::any::Any;

use bytes::{Buf, BytesMut};

use crate::config::Config;
use crate::error::{CodecError, Result};
use crate::protocol::{Frame, Protocol, ProtocolName};

use super::decoder::{parse_int_line, Decoder};
use super::encoder::encode_to_buffer;
use super::value::{RespType, RespValue};
use super::RESP;

impl Frame for RespValue {
    fn protocol(&self) -> ProtocolName {
        RESP
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// RESP codec for the protocol registry
#[derive(Debug, Clone, Default)]
pub struct RespProtocol {
    config: Config,
}

impl RespProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl Protocol for RespProtocol {
    fn name(&self) -> ProtocolName {
        RESP
    }

    fn encode(&self, frame: &dyn Frame) -> Result<BytesMut> {
        match frame.downcast_ref::<RespValue>() {
            Some(value) => encode_to_buffer(value),
            None => {
                tracing::error!(frame = ?frame, "RESP codec cannot encode a {} frame", frame.protocol());
                Err(CodecError::UnknownModel { protocol: RESP })
            }
        }
    }

    fn decode(&self, data: &mut BytesMut) -> Result<Option<Box<dyn Frame>>> {
        if !is_complete(data, &self.config) {
            tracing::trace!(buffered = data.len(), "RESP value incomplete");
            return Ok(None);
        }

        let (value, consumed) = {
            let mut decoder = Decoder::with_config(&data[..], &self.config);
            match decoder.decode() {
                Ok(value) => {
                    // Whatever the reader neither pulled nor left unread belongs to this value
                    let reader = decoder.reader();
                    (value, data.len() - reader.get_ref().len() - reader.buffered())
                }
                Err(CodecError::EndOfStream) => {
                    tracing::trace!(buffered = data.len(), "RESP value incomplete");
                    return Ok(None);
                }
                Err(e) => {
                    tracing::debug!("RESP decode failed: {}", e);
                    return Err(e);
                }
            }
        };
        data.advance(consumed);

        tracing::trace!(consumed, "Decoded RESP {:?}", value.kind());
        Ok(Some(Box::new(value)))
    }

    fn reply(&self, _request_id: u64) -> Option<Box<dyn Frame>> {
        Some(Box::new(RespValue::simple_string("OK")))
    }

    fn hijack(&self, status: u32) -> Option<Box<dyn Frame>> {
        Some(Box::new(RespValue::error(format!(
            "ERR proxy local reply, status {}",
            status
        ))))
    }
}

/// Whether `data` starts with a whole value
///
/// Malformed or over-limit framing counts as whole so the decoder gets to
/// report it.
fn is_complete(data: &[u8], config: &Config) -> bool {
    let mut pos = 0usize;
    let mut pending = 1usize;

    while pending > 0 {
        pending -= 1;
        let tag = match data.get(pos) {
            Some(&tag) => tag,
            None => return false,
        };
        let kind = RespType::from_tag(tag);
        // Inline commands are only legal at the top level
        if kind.is_none() && pos > 0 {
            return true;
        }
        let line_end = match memchr::memchr(b'\n', &data[pos..]) {
            Some(i) => pos + i + 1,
            None => return false,
        };

        pos = match kind {
            Some(RespType::BulkString) | Some(RespType::Array) => {
                let n = match parse_int_line(&data[pos + 1..line_end]) {
                    Ok(-1) => {
                        pos = line_end;
                        continue;
                    }
                    Ok(n) => match usize::try_from(n) {
                        Ok(n) => n,
                        Err(_) => return true,
                    },
                    Err(_) => return true,
                };
                if kind == Some(RespType::BulkString) {
                    if n > config.max_bulk_len {
                        return true;
                    }
                    line_end.saturating_add(n).saturating_add(2)
                } else {
                    if n > config.max_array_len {
                        return true;
                    }
                    pending = pending.saturating_add(n);
                    line_end
                }
            }
            _ => line_end,
        };
    }
    pos <= data.len()
}
