//! Emulator configuration.

use crate::storage::Distribution;
use crate::DEFAULT_DIST_DIR;
use std::path::PathBuf;

/// Settings shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Root of the distribution directory tree
    pub dist_root: PathBuf,
    /// Whether `CFSINIT` must precede every other command
    pub require_init: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            dist_root: PathBuf::from(DEFAULT_DIST_DIR),
            require_init: true,
        }
    }
}

impl EmulatorConfig {
    /// Creates a config serving `dist_root` with the session guard enabled.
    pub fn new(dist_root: impl Into<PathBuf>) -> Self {
        Self {
            dist_root: dist_root.into(),
            ..Default::default()
        }
    }

    /// Enables or disables the session guard.
    pub fn with_require_init(mut self, require_init: bool) -> Self {
        self.require_init = require_init;
        self
    }

    /// The directory layout under `dist_root`.
    pub fn distribution(&self) -> Distribution {
        Distribution::new(&self.dist_root)
    }
}
