//! # Runtime Configuration Module
//!
//! Environment variable-based configuration of the coroutine runtime and the
//! listening address.
//!
//! ## Environment Variables
//!
//! ### `DOCROUTE_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts decimal (`32768`) or hexadecimal
//! (`0x8000`). Default: `0x8000` (32 KB). Schema validation recurses through
//! nested declarations, so very deep schemas may need more.
//!
//! ### `DOCROUTE_ADDR`
//!
//! Address `docroute serve` binds to. Default: `127.0.0.1:5000`.
//!
//! ```rust
//! use docroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x8000;
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Listening address
    pub addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("DOCROUTE_STACK_SIZE")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let addr = lookup("DOCROUTE_ADDR")
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        RuntimeConfig { stack_size, addr }
    }

    /// Configure the `may` runtime. Call before the server starts.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
