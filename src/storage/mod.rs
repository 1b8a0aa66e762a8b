//! Storage Module
//!
//! This module maps the modem's storage areas onto a local directory tree and
//! provides read-only, non-blocking access to the files inside it.
//!
//! ## Architecture
//!
//! ```text
//! (dirIndex, fileName)
//!         │
//!         ▼
//! ┌─────────────────┐
//! │  Distribution   │  index → <root>/<area>/<fileName>
//! └────────┬────────┘
//!          │ PathBuf
//!          ▼
//! ┌─────────────────┐
//! │   FileAccess    │  size() / read()  (tokio::fs)
//! └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use cfsemu::storage::{Directory, Distribution};
//! use std::path::PathBuf;
//!
//! let dist = Distribution::new("/srv/files");
//! let dir = Directory::from_index(1).unwrap();
//! let path = dist.resolve(dir, "update.bin").unwrap();
//! assert_eq!(path, PathBuf::from("/srv/files/fota/update.bin"));
//! ```

pub mod distribution;
pub mod files;

// Re-export commonly used types
pub use distribution::{Directory, Distribution};
pub use files::{FileAccess, LocalFiles};
