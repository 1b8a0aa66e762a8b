//! Response Framing
//!
//! Every recognized command gets exactly one response, built here and written
//! to the transport in a single call.
//!
//! ## Wire Format
//!
//! Success:
//!
//! ```text
//! <echo>\r                      the input line, echoed back
//! \r\n+<COMMAND>: <value>\r\n   zero or more informational segments
//! \r\nOK\r\n
//! ```
//!
//! A payload segment carries the payload length as its value, then the raw
//! payload bytes and their own `\r\n`.
//!
//! Error:
//!
//! ```text
//! <echo>\r
//! \r\nERROR\r\n
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// The CRLF sequence used inside responses
pub const CRLF: &[u8] = b"\r\n";

/// Terminal status of a successful command
pub const OK_TERMINATOR: &[u8] = b"\r\nOK\r\n";

/// Terminal status of a failed command
pub const ERROR_TERMINATOR: &[u8] = b"\r\nERROR\r\n";

/// An informational segment of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Info {
    /// `\r\n+<COMMAND>: <value>\r\n`
    Value { command: String, value: String },

    /// `\r\n+<COMMAND>: <len>\r\n<data>\r\n`
    Payload { command: String, data: Bytes },
}

impl Info {
    /// Creates a segment carrying a plain value.
    pub fn value(command: impl Into<String>, value: impl fmt::Display) -> Self {
        Info::Value {
            command: command.into(),
            value: value.to_string(),
        }
    }

    /// Creates a segment carrying a binary payload.
    pub fn payload(command: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Info::Payload {
            command: command.into(),
            data: data.into(),
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Info::Value { command, value } => 2 + 1 + command.len() + 2 + value.len() + 2,
            // Length digits are bounded by 20 for a u64
            Info::Payload { command, data } => 2 + 1 + command.len() + 2 + 20 + 2 + data.len() + 2,
        }
    }

    fn serialize_into(&self, buf: &mut BytesMut) {
        match self {
            Info::Value { command, value } => {
                write_header(buf, command, value);
            }
            Info::Payload { command, data } => {
                write_header(buf, command, &data.len().to_string());
                buf.put_slice(data);
                buf.put_slice(CRLF);
            }
        }
    }
}

fn write_header(buf: &mut BytesMut, command: &str, value: &str) {
    buf.put_slice(CRLF);
    buf.put_u8(b'+');
    buf.put_slice(command.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(CRLF);
}

/// A complete response to one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The command succeeded
    Success { echo: String, info: Vec<Info> },

    /// The command failed; no informational output is ever attached
    Error { echo: String },
}

impl Response {
    /// A successful response with the given informational segments.
    pub fn success(echo: impl Into<String>, info: Vec<Info>) -> Self {
        Response::Success {
            echo: echo.into(),
            info,
        }
    }

    /// A successful response with no informational segments.
    pub fn ok(echo: impl Into<String>) -> Self {
        Self::success(echo, Vec::new())
    }

    /// An error response.
    pub fn error(echo: impl Into<String>) -> Self {
        Response::Error { echo: echo.into() }
    }

    /// Returns true for a success response.
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// The echoed input line.
    pub fn echo(&self) -> &str {
        match self {
            Response::Success { echo, .. } | Response::Error { echo } => echo,
        }
    }

    /// Serializes the whole response into one contiguous buffer.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.serialize_into(&mut buf);
        buf.freeze()
    }

    /// Serializes the response into an existing buffer.
    pub fn serialize_into(&self, buf: &mut BytesMut) {
        buf.put_slice(self.echo().as_bytes());
        buf.put_u8(b'\r');
        match self {
            Response::Success { info, .. } => {
                for segment in info {
                    segment.serialize_into(buf);
                }
                buf.put_slice(OK_TERMINATOR);
            }
            Response::Error { .. } => buf.put_slice(ERROR_TERMINATOR),
        }
    }

    fn encoded_len(&self) -> usize {
        let body = match self {
            Response::Success { info, .. } => {
                info.iter().map(Info::encoded_len).sum::<usize>() + OK_TERMINATOR.len()
            }
            Response::Error { .. } => ERROR_TERMINATOR.len(),
        };
        self.echo().len() + 1 + body
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success { info, .. } => {
                for segment in info {
                    match segment {
                        Info::Value { command, value } => write!(f, "+{}: {} ", command, value)?,
                        Info::Payload { command, data } => {
                            write!(f, "+{}: ({} bytes) ", command, data.len())?
                        }
                    }
                }
                write!(f, "OK")
            }
            Response::Error { .. } => write!(f, "ERROR"),
        }
    }
}
