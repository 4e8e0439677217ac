//! Protocol-agnostic status codes
//!
//! The proxy speaks this status space internally; each protocol maps it onto
//! its native representation through [`Protocol::mapping`](super::Protocol::mapping).

pub const CODEC_EXCEPTION: u32 = 0;
pub const UNKNOWN: u32 = 2;
pub const DESERIALIZE_EXCEPTION: u32 = 3;
pub const SUCCESS: u32 = 200;
pub const PERMISSION_DENIED: u32 = 403;
pub const ROUTER_UNAVAILABLE: u32 = 404;
pub const INTERNAL_ERROR: u32 = 500;
pub const NO_HEALTHY_UPSTREAM: u32 = 502;
pub const UPSTREAM_OVERFLOW: u32 = 503;
pub const TIMEOUT_EXCEPTION: u32 = 504;
pub const LIMIT_EXCEEDED: u32 = 509;
