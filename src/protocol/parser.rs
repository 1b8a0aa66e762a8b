//! AT Command Line Parser
//!
//! Recognizes lines of the form `AT+<COMMAND>=<value>`:
//!
//! - optional leading whitespace, such as the `\n` of a `\r\n` terminator
//! - the literal prefix `AT+`
//! - a command name made of ASCII letters, digits and `_` (possibly empty)
//! - an optional `=`
//! - everything else is the raw value, handed to the parameter tokenizer
//!
//! Anything else is not AT syntax and yields `None`. The emulated hardware
//! stays silent on such lines, so this is not an error.

/// The prefix every extended AT command starts with.
pub const AT_PREFIX: &str = "AT+";

/// A line that matched the AT command grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommand {
    /// The command name, e.g. `CFSGFIS`
    pub command: String,
    /// Everything after the optional `=`, possibly empty
    pub raw_args: String,
    /// The line exactly as received, leading whitespace included, echoed
    /// back in the response
    pub original: String,
}

impl AtCommand {
    /// Returns true if the command carried any argument text.
    pub fn has_args(&self) -> bool {
        !self.raw_args.is_empty()
    }
}

/// Parses one line into an [`AtCommand`].
///
/// Returns `None` when the line is not AT syntax.
pub fn parse_line(line: &str) -> Option<AtCommand> {
    let rest = line.trim_start().strip_prefix(AT_PREFIX)?;

    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let (command, rest) = rest.split_at(name_len);
    let raw_args = rest.strip_prefix('=').unwrap_or(rest);

    // The value runs to the end of the line and never spans a line break
    if raw_args.contains(|c: char| c == '\n' || c == '\r') {
        return None;
    }

    Some(AtCommand {
        command: command.to_string(),
        raw_args: raw_args.to_string(),
        original: line.to_string(),
    })
}
