//! Connection Handler Module
//!
//! This module serves one AT session over a byte-stream transport. The
//! emulator normally runs a single session on a serial port; in TCP mode it
//! serves one client at a time, each with a fresh session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Serial port  /  TCP listener  (main.rs)            │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ transport
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Split lines │───>│ FIFO queue  │     │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                     ┌─────────────┐    ┌─────────────┐     │
//! │                     │ Send resp   │<───│ Execute cmd │     │
//! │                     └─────────────┘    └─────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: Generic over any Tokio `AsyncRead + AsyncWrite`
//! - **Ordering**: Exactly one complete write per answered line, in line order
//! - **Statistics**: Tracks session and command counters
//!
//! ## Example
//!
//! ```ignore
//! use cfsemu::commands::CommandHandler;
//! use cfsemu::connection::{handle_connection, ConnectionStats};
//! use cfsemu::storage::LocalFiles;
//! use cfsemu::EmulatorConfig;
//! use std::sync::Arc;
//!
//! let config = EmulatorConfig::new("files");
//! let stats = Arc::new(ConnectionStats::new());
//! let handler = CommandHandler::new(&config, LocalFiles);
//!
//! handle_connection(serial_port, "/dev/ttyUSB0", handler, stats).await;
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
