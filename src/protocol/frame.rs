//! Line Framing
//!
//! Clients terminate AT commands with a carriage return. Some terminate with
//! `\r\n`, so the `\n` of one line shows up at the start of the next. The
//! splitter hands lines on exactly as received, remnant included, because
//! the modem echoes it back; only the parser looks past leading whitespace.
//!
//! ## How the Splitter Works
//!
//! The connection appends whatever it reads into a `BytesMut`, then calls
//! [`LineSplitter::next_line`] until it returns `None`:
//!
//! - `Some(line)` - a complete, non-empty line was removed from the buffer
//! - `None` - no `\r` left in the buffer, wait for more data
//!
//! Lines holding nothing but whitespace are consumed and skipped.

use bytes::{Buf, BytesMut};

/// The line terminator sent by AT clients.
pub const LINE_TERMINATOR: u8 = b'\r';

/// Splits an incoming byte stream into command lines.
#[derive(Debug, Default)]
pub struct LineSplitter {
    /// How far into the buffer we have already searched for a terminator
    scanned: usize,
}

impl LineSplitter {
    /// Creates a new splitter.
    pub fn new() -> Self {
        Self { scanned: 0 }
    }

    /// Removes the next complete line from `buf`.
    ///
    /// The terminator is consumed and not part of the returned line. Invalid
    /// UTF-8 is replaced rather than rejected; such a line will simply fail to
    /// parse as an AT command later on.
    pub fn next_line(&mut self, buf: &mut BytesMut) -> Option<String> {
        loop {
            let pos = buf[self.scanned..]
                .iter()
                .position(|&b| b == LINE_TERMINATOR)
                .map(|p| self.scanned + p);

            let pos = match pos {
                Some(pos) => pos,
                None => {
                    self.scanned = buf.len();
                    return None;
                }
            };

            let raw = buf.split_to(pos);
            buf.advance(1);
            self.scanned = 0;

            let line = String::from_utf8_lossy(&raw);
            if !line.trim_start().is_empty() {
                return Some(line.into_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_all(input: &[u8]) -> (Vec<String>, BytesMut) {
        let mut splitter = LineSplitter::new();
        let mut buf = BytesMut::from(input);
        let mut lines = Vec::new();
        while let Some(line) = splitter.next_line(&mut buf) {
            lines.push(line);
        }
        (lines, buf)
    }

    #[test]
    fn test_single_line() {
        let (lines, rest) = split_all(b"AT+CFSINIT\r");
        assert_eq!(lines, vec!["AT+CFSINIT"]);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_crlf_remnant_is_kept() {
        let (lines, rest) = split_all(b"AT+CFSINIT\r\nAT+CFSTERM\r\n");
        assert_eq!(lines, vec!["AT+CFSINIT", "\nAT+CFSTERM"]);
        // The final '\n' waits for the next line
        assert_eq!(&rest[..], b"\n");
    }

    #[test]
    fn test_leading_spaces_are_kept() {
        let (lines, _) = split_all(b"  \t AT+CFSINIT\r");
        assert_eq!(lines, vec!["  \t AT+CFSINIT"]);
    }

    #[test]
    fn test_trailing_spaces_are_kept() {
        let (lines, _) = split_all(b"AT+CFSINIT  \r");
        assert_eq!(lines, vec!["AT+CFSINIT  "]);
    }

    #[test]
    fn test_empty_lines_are_swallowed() {
        let (lines, _) = split_all(b"\r\r\n\r  \r\nAT+CFSTERM\r");
        assert_eq!(lines, vec!["\nAT+CFSTERM"]);
    }

    #[test]
    fn test_incomplete_line_stays_buffered() {
        let mut splitter = LineSplitter::new();
        let mut buf = BytesMut::from(&b"AT+CFSG"[..]);
        assert!(splitter.next_line(&mut buf).is_none());
        assert_eq!(&buf[..], b"AT+CFSG");

        buf.extend_from_slice(b"FIS=0,\"a.txt\"\r");
        assert_eq!(
            splitter.next_line(&mut buf).as_deref(),
            Some("AT+CFSGFIS=0,\"a.txt\"")
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_long_line_has_no_limit() {
        let mut input = b"AT+CFSGFIS=0,".to_vec();
        input.extend(std::iter::repeat(b'x').take(100_000));
        input.push(b'\r');
        let (lines, _) = split_all(&input);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 13 + 100_000);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let (lines, _) = split_all(b"AT+\xff\r");
        assert_eq!(lines, vec!["AT+\u{fffd}"]);
    }
}
