//! Dubbo protocol
//!
//! Binary RPC framing: a fixed 16-byte header followed by an opaque payload.
//! Only the header is interpreted; payload serialization belongs to the
//! business layer.

mod frame;

use bytes::{Bytes, BytesMut};

use crate::config::Config;
use crate::error::{CodecError, ProtocolError, Result};
use crate::protocol::{status, Frame, Protocol, ProtocolName};

pub use frame::*;

/// Registry name of the Dubbo protocol
pub const DUBBO: ProtocolName = ProtocolName::new("dubbo");

/// Hessian2 encoding of null, the body of a heartbeat
const HEARTBEAT_NULL: u8 = 0x4E;

/// Dubbo codec for the protocol registry
#[derive(Debug, Clone)]
pub struct DubboProtocol {
    max_payload: u32,
}

impl Default for DubboProtocol {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl DubboProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            max_payload: config.max_frame_payload,
        }
    }

    /// Largest payload a frame may declare
    pub fn max_payload(&self) -> u32 {
        self.max_payload
    }
}

impl Protocol for DubboProtocol {
    fn name(&self) -> ProtocolName {
        DUBBO
    }

    fn encode(&self, frame: &dyn Frame) -> Result<BytesMut> {
        match frame.downcast_ref::<DubboFrame>() {
            Some(frame) => Ok(frame.encode()),
            None => {
                tracing::error!(frame = ?frame, "Dubbo codec cannot encode a {} frame", frame.protocol());
                Err(CodecError::UnknownModel { protocol: DUBBO })
            }
        }
    }

    fn decode(&self, data: &mut BytesMut) -> Result<Option<Box<dyn Frame>>> {
        let header = match Header::decode(&data[..]) {
            Some(header) => header,
            None => return Ok(None),
        };

        if header.magic != MAGIC {
            tracing::warn!(magic = ?header.magic, "Dubbo frame with bad magic");
            return Err(ProtocolError::BadMagic(header.magic).into());
        }
        if header.data_len > self.max_payload {
            tracing::warn!(
                len = header.data_len,
                max = self.max_payload,
                "Dubbo payload too large"
            );
            return Err(ProtocolError::PayloadTooLarge {
                len: header.data_len,
                max: self.max_payload,
            }
            .into());
        }

        let frame_len = HEADER_LEN + header.data_len as usize;
        if data.len() < frame_len {
            tracing::trace!(buffered = data.len(), frame_len, "Dubbo frame incomplete");
            return Ok(None);
        }

        let mut raw = data.split_to(frame_len);
        let payload = raw.split_off(HEADER_LEN).freeze();
        tracing::trace!(id = header.id, flag = header.flag, "Decoded Dubbo frame");
        Ok(Some(Box::new(DubboFrame { header, payload })))
    }

    fn trigger(&self, request_id: u64) -> Option<Box<dyn Frame>> {
        Some(Box::new(DubboFrame::new(
            FLAG_REQUEST | FLAG_TWO_WAY | FLAG_EVENT | SERIALIZATION_HESSIAN2,
            0,
            request_id,
            vec![HEARTBEAT_NULL],
        )))
    }

    fn reply(&self, request_id: u64) -> Option<Box<dyn Frame>> {
        Some(Box::new(DubboFrame::new(
            FLAG_EVENT | SERIALIZATION_HESSIAN2,
            STATUS_OK,
            request_id,
            vec![HEARTBEAT_NULL, HEARTBEAT_NULL],
        )))
    }

    fn hijack(&self, status: u32) -> Option<Box<dyn Frame>> {
        let native = self.mapping(status).unwrap_or(STATUS_SERVER_ERROR as u32);
        Some(Box::new(DubboFrame::new(
            SERIALIZATION_HESSIAN2,
            native as u8,
            0,
            Bytes::new(),
        )))
    }

    fn mapping(&self, status: u32) -> Option<u32> {
        let native = match status {
            status::SUCCESS => STATUS_OK,
            status::TIMEOUT_EXCEPTION => STATUS_SERVER_TIMEOUT,
            status::ROUTER_UNAVAILABLE => STATUS_SERVICE_NOT_FOUND,
            status::INTERNAL_ERROR | status::NO_HEALTHY_UPSTREAM => STATUS_SERVER_ERROR,
            status::UPSTREAM_OVERFLOW => STATUS_THREADPOOL_EXHAUSTED,
            _ => return None,
        };
        Some(native as u32)
    }
}
