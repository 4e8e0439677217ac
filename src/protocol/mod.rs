//! Protocol Module
//!
//! Pluggable wire protocols behind one capability set, so the connection
//! loop never needs to know which format it is carrying.
//!
//! ## Capability Set
//! ```text
//! ┌──────────┬──────────────────────────────────────────────────────┐
//! │ name     │ registry key and log tag                             │
//! │ encode   │ frame → bytes, UnknownModel for foreign frames       │
//! │ decode   │ bytes → frame, Ok(None) while the frame is partial   │
//! │ trigger  │ heartbeat request, None if unsupported               │
//! │ reply    │ canned success response, None if unsupported         │
//! │ hijack   │ local response carrying a generic status             │
//! │ mapping  │ generic status → native status, None if no match     │
//! └──────────┴──────────────────────────────────────────────────────┘
//! ```

pub mod dubbo;
pub mod status;

mod registry;
mod stream;

use std::any::Any;
use std::fmt;

use bytes::BytesMut;

use crate::error::Result;

pub use registry::ProtocolRegistry;
pub use stream::FrameReader;

/// Stable protocol identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolName(&'static str);

impl ProtocolName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProtocolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One complete protocol-specific unit of request or response data
pub trait Frame: Any + fmt::Debug + Send + Sync {
    /// Protocol that produced this frame
    fn protocol(&self) -> ProtocolName;

    /// Correlation id, for protocols that carry one
    fn request_id(&self) -> Option<u64> {
        None
    }

    /// True for keepalive frames
    fn is_heartbeat(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Frame {
    /// Borrow the concrete frame type
    pub fn downcast_ref<T: Frame>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Frame>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Capability set every wire protocol implements
///
/// Optional capabilities default to "unsupported".
pub trait Protocol: Send + Sync {
    /// Registry key
    fn name(&self) -> ProtocolName;

    /// Serialize a frame of this protocol
    fn encode(&self, frame: &dyn Frame) -> Result<BytesMut>;

    /// Parse one frame from the front of `data`
    ///
    /// Returns `Ok(None)` while `data` holds only a prefix of a frame and
    /// leaves it untouched; on success the frame's bytes are consumed.
    fn decode(&self, data: &mut BytesMut) -> Result<Option<Box<dyn Frame>>>;

    /// Heartbeat request correlated to `request_id`
    fn trigger(&self, _request_id: u64) -> Option<Box<dyn Frame>> {
        None
    }

    /// Canned success response correlated to `request_id`
    fn reply(&self, _request_id: u64) -> Option<Box<dyn Frame>> {
        None
    }

    /// Local response carrying a generic status code
    fn hijack(&self, _status: u32) -> Option<Box<dyn Frame>> {
        None
    }

    /// Translate a generic status code into the native one
    fn mapping(&self, _status: u32) -> Option<u32> {
        None
    }
}
