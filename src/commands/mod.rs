//! Command Handler Module
//!
//! This module implements the command processing layer of the emulator.
//! It receives AT lines, checks them against the session lifecycle and the
//! per-command parameter schemas, executes them against the distribution
//! files, and returns the response to write back.
//!
//! ## Architecture
//!
//! ```text
//! Input line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   AT Parser     │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Guard        │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   FileAccess    │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `CFSINIT`, `CFSTERM` - session lifecycle
//! - `CFSGFIS` - file size
//! - `CFSRFILE` - chunked file read

pub mod command;
pub mod error;
pub mod handler;
pub mod session;

// Re-export the main command types
pub use command::{Command, MAX_FILE_NAME_LEN, MAX_READ_BUFFER};
pub use error::CommandError;
pub use handler::{read_chunk, CommandHandler, ReadMode};
pub use session::{Session, SessionState};
