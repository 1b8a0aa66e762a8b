//! AT Protocol Implementation
//!
//! This module implements the text protocol spoken between the host and the
//! emulated modem.
//!
//! ## Overview
//!
//! The host sends one command per line, terminated by `\r`:
//!
//! ```text
//! AT+CFSRFILE=0,"app.bin",1,512,1024\r
//! ```
//!
//! The emulator echoes the line back, then appends informational segments and
//! a terminal `OK` or `ERROR`.
//!
//! ## Modules
//!
//! - `frame`: Splits the byte stream into lines
//! - `parser`: Recognizes `AT+<COMMAND>=<value>` lines
//! - `params`: Quote-aware tokenizer and schema validation
//! - `response`: Response framing
//!
//! ## Example
//!
//! ```
//! use cfsemu::protocol::{parse_line, Info, Response};
//!
//! let at = parse_line("AT+CFSGFIS=0,\"a.txt\"").unwrap();
//! assert_eq!(at.command, "CFSGFIS");
//!
//! let response = Response::success(at.original, vec![Info::value("CFSGFIS", 42)]);
//! assert_eq!(
//!     &response.serialize()[..],
//!     b"AT+CFSGFIS=0,\"a.txt\"\r\r\n+CFSGFIS: 42\r\n\r\nOK\r\n"
//! );
//! ```

pub mod frame;
pub mod params;
pub mod parser;
pub mod response;

// Re-export commonly used types for convenience
pub use frame::LineSplitter;
pub use params::{tokenize, unescape, CommandSpec, FieldKind, FieldSpec, Params, ValidationError, Value};
pub use parser::{parse_line, AtCommand};
pub use response::{Info, Response};
