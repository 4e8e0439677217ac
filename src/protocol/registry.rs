//! Protocol Registry
//!
//! Maps protocol names to codec instances. Built once at startup and handed
//! to the connection layer; lookups afterwards are read-only.
//!
//! ## Concurrency:
//! - `protocols`: Protected by RwLock (many concurrent readers, writes only
//!   during startup registration)
//! - All methods use `&self`, so the registry can sit in an `Arc`

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{CodecError, Result};
use crate::resp::RespProtocol;

use super::dubbo::DubboProtocol;
use super::{Protocol, ProtocolName};

/// Name → codec lookup table
#[derive(Default)]
pub struct ProtocolRegistry {
    protocols: RwLock<HashMap<&'static str, Arc<dyn Protocol>>>,
}

impl ProtocolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            protocols: RwLock::new(HashMap::new()),
        }
    }

    /// Registry holding every built-in protocol, configured from `config`
    pub fn with_defaults(config: &Config) -> Self {
        let registry = Self::new();
        let builtins: [Arc<dyn Protocol>; 2] = [
            Arc::new(RespProtocol::with_config(config)),
            Arc::new(DubboProtocol::with_config(config)),
        ];
        for protocol in builtins {
            if let Err(e) = registry.register(protocol) {
                tracing::warn!("Skipping built-in protocol: {}", e);
            }
        }
        registry
    }

    /// Add a protocol under its own name
    pub fn register(&self, protocol: Arc<dyn Protocol>) -> Result<()> {
        let name = protocol.name();
        let mut protocols = self.protocols.write();
        if protocols.contains_key(name.as_str()) {
            return Err(CodecError::DuplicateProtocol(name));
        }
        protocols.insert(name.as_str(), protocol);
        tracing::debug!(protocol = %name, "Registered protocol");
        Ok(())
    }

    /// Look up a protocol by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Protocol>> {
        self.protocols.read().get(name).map(Arc::clone)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.protocols.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<ProtocolName> {
        let mut names: Vec<ProtocolName> = self
            .protocols
            .read()
            .values()
            .map(|protocol| protocol.name())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.protocols.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.read().is_empty()
    }
}
