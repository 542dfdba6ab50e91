//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Default maximum size of a serialized collation body: 2^20 bytes.
pub const MAX_COLLATION_BODY_SIZE: usize = 1 << 20;

/// Configuration for the blob codec.
///
/// Deployments can load this from JSON or TOML; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest body, in bytes, that encoding may produce.
    pub max_body_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_body_size: MAX_COLLATION_BODY_SIZE,
        }
    }
}

impl CodecConfig {
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Check a body size against the configured limit.
    pub fn check_body_size(&self, size: usize) -> CodecResult<()> {
        if size > self.max_body_size {
            return Err(CodecError::SizeLimitExceeded {
                size,
                limit: self.max_body_size,
            });
        }
        Ok(())
    }
}
