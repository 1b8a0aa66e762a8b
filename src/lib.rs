//! # cfsemu - AT Command File Storage Emulator
//!
//! cfsemu emulates the file-access AT commands of a cellular modem over a
//! serial line. Point a host application at it instead of real hardware and
//! it serves files from a local directory tree, answering byte for byte the
//! way the modem does.
//!
//! ## Features
//!
//! - **Modem-Compatible**: Echo, informational lines and `OK`/`ERROR` framing
//!   match the device
//! - **Session Guard**: `CFSINIT` must precede file access (can be disabled to
//!   model lenient firmware)
//! - **Ordered Responses**: Lines are queued and answered strictly in order,
//!   even while file reads are in flight
//! - **Async I/O**: Built on Tokio, with non-blocking file access
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               cfsemu                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ Serial Port │───>│ Connection  │───>│  Command    │                  │
//! │  │ (or TCP)    │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   AT        │    │              Distribution                    │   │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │             │    │  │custapp │ │ fota   │ │ datatx │ │customer│ │   │
//! │  └─────────────┘    │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use cfsemu::commands::CommandHandler;
//! use cfsemu::connection::{handle_connection, ConnectionStats};
//! use cfsemu::storage::LocalFiles;
//! use cfsemu::EmulatorConfig;
//! use std::sync::Arc;
//! use tokio_serial::SerialPortBuilderExt;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = EmulatorConfig::new("files");
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let port = tokio_serial::new("/dev/ttyUSB0", 115200)
//!         .open_native_async()
//!         .unwrap();
//!
//!     let handler = CommandHandler::new(&config, LocalFiles);
//!     handle_connection(port, "/dev/ttyUSB0", handler, stats).await;
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `AT+CFSINIT` - open the file system session
//! - `AT+CFSTERM` - close it
//! - `AT+CFSGFIS=<dirIndex>,<fileName>` - file size
//! - `AT+CFSRFILE=<dirIndex>,<fileName>,<mode>,<bufferSize>,<offset>` - read
//!
//! Other AT lines get no response at all, as on the device.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line framing, AT parsing, parameters, response framing
//! - [`commands`]: Command table, session lifecycle and handlers
//! - [`storage`]: Directory layout and file access
//! - [`connection`]: Session loop over a byte-stream transport
//! - [`config`]: Emulator settings

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{Command, CommandError, CommandHandler};
pub use config::EmulatorConfig;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_line, AtCommand, LineSplitter, Response, ValidationError};
pub use storage::{Distribution, FileAccess, LocalFiles};

/// The serial baud rate used when none is given
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// The distribution directory used when none is given
pub const DEFAULT_DIST_DIR: &str = "files";

/// Version of cfsemu
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
