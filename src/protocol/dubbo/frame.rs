//! Dubbo frame
//!
//! ## Header Layout (16 bytes, big-endian)
//! ```text
//! ┌───────────┬──────────┬────────────┬─────────────────┬──────────────┐
//! │ Magic (2) │ Flag (1) │ Status (1) │ Request ID (8)  │ Data Len (4) │
//! └───────────┴──────────┴────────────┴─────────────────┴──────────────┘
//! ```
//!
//! ### Flag Byte
//! ```text
//!   7     6     5     4..0
//! ┌─────┬─────┬─────┬───────────────┐
//! │ req │ 2way│event│ serialization │
//! └─────┴─────┴─────┴───────────────┘
//! ```

use std::any::Any;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::protocol::{Frame, ProtocolName};

use super::DUBBO;

/// Magic number opening every frame
pub const MAGIC: [u8; 2] = [0xDA, 0xBB];

/// Fixed header length in bytes
pub const HEADER_LEN: usize = 16;

// =============================================================================
// Flag Bits
// =============================================================================

/// Set on requests, clear on responses
pub const FLAG_REQUEST: u8 = 0x80;

/// Caller expects a response
pub const FLAG_TWO_WAY: u8 = 0x40;

/// Event frame (heartbeat)
pub const FLAG_EVENT: u8 = 0x20;

/// Serialization id bits
pub const SERIALIZATION_MASK: u8 = 0x1F;

/// Hessian2, the default serialization
pub const SERIALIZATION_HESSIAN2: u8 = 0x02;

// =============================================================================
// Response Status
// =============================================================================

pub const STATUS_OK: u8 = 20;
pub const STATUS_CLIENT_TIMEOUT: u8 = 30;
pub const STATUS_SERVER_TIMEOUT: u8 = 31;
pub const STATUS_BAD_REQUEST: u8 = 40;
pub const STATUS_BAD_RESPONSE: u8 = 50;
pub const STATUS_SERVICE_NOT_FOUND: u8 = 60;
pub const STATUS_SERVICE_ERROR: u8 = 70;
pub const STATUS_SERVER_ERROR: u8 = 80;
pub const STATUS_CLIENT_ERROR: u8 = 90;
pub const STATUS_THREADPOOL_EXHAUSTED: u8 = 100;

/// Fixed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 2],
    pub flag: u8,
    pub status: u8,
    pub id: u64,
    pub data_len: u32,
}

impl Header {
    pub fn new(flag: u8, status: u8, id: u64, data_len: u32) -> Self {
        Self {
            magic: MAGIC,
            flag,
            status,
            id,
            data_len,
        }
    }

    /// Parse a header from the first [`HEADER_LEN`] bytes of `buf`
    ///
    /// Returns `None` if `buf` is too short. The magic is not checked here.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let mut cur = &buf[..HEADER_LEN];
        Some(Self {
            magic: [cur.get_u8(), cur.get_u8()],
            flag: cur.get_u8(),
            status: cur.get_u8(),
            id: cur.get_u64(),
            data_len: cur.get_u32(),
        })
    }

    /// Append the header to `buf`
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.magic);
        buf.put_u8(self.flag);
        buf.put_u8(self.status);
        buf.put_u64(self.id);
        buf.put_u32(self.data_len);
    }

    #[inline]
    pub fn is_request(&self) -> bool {
        self.flag & FLAG_REQUEST != 0
    }

    #[inline]
    pub fn is_two_way(&self) -> bool {
        self.flag & FLAG_TWO_WAY != 0
    }

    #[inline]
    pub fn is_event(&self) -> bool {
        self.flag & FLAG_EVENT != 0
    }

    #[inline]
    pub fn serialization_id(&self) -> u8 {
        self.flag & SERIALIZATION_MASK
    }
}

/// Header plus opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DubboFrame {
    pub header: Header,
    pub payload: Bytes,
}

impl DubboFrame {
    /// Build a frame; `data_len` is taken from the payload
    pub fn new(flag: u8, status: u8, id: u64, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            header: Header::new(flag, status, id, payload.len() as u32),
            payload,
        }
    }

    /// Total encoded size
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Serialize the frame, recomputing the length field from the payload
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        let header = Header {
            data_len: self.payload.len() as u32,
            ..self.header
        };
        header.encode_into(&mut buf);
        buf.put_slice(&self.payload);
        buf
    }
}

impl Frame for DubboFrame {
    fn protocol(&self) -> ProtocolName {
        DUBBO
    }

    fn request_id(&self) -> Option<u64> {
        Some(self.header.id)
    }

    fn is_heartbeat(&self) -> bool {
        self.header.is_event()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
