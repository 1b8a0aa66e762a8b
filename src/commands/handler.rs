//! Command Handler
//!
//! Turns one input line into at most one [`Response`].
//!
//! ## Supported Commands
//!
//! - `AT+CFSINIT` - open the file system session
//! - `AT+CFSTERM` - close the session
//! - `AT+CFSGFIS=<dirIndex>,<fileName>` - file size
//! - `AT+CFSRFILE=<dirIndex>,<fileName>,<mode>,<bufferSize>,<offset>` - read a chunk
//!
//! ## Per-line Flow
//!
//! ```text
//! line ──parse──> AtCommand ──lookup──> Command ──guard──> validate ──> execute
//!   │                 │                                                  │
//!   └── not AT ───────┴── unknown name ──> (no response)          Ok / Err
//!                                                                        │
//!                                                      Response::success / error
//! ```

use crate::commands::{Command, CommandError, Session};
use crate::config::EmulatorConfig;
use crate::protocol::{parse_line, AtCommand, Info, Params, Response};
use crate::storage::{Directory, Distribution, FileAccess};
use bytes::Bytes;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Where a `CFSRFILE` starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// `0`: from the start of the file, the offset is ignored
    FromStart,
    /// `1`: from the given offset
    FromOffset,
}

impl ReadMode {
    /// Maps the wire value; anything non-zero reads from the offset.
    pub fn from_wire(mode: i64) -> Self {
        if mode == 0 {
            ReadMode::FromStart
        } else {
            ReadMode::FromOffset
        }
    }
}

/// Cuts the requested chunk out of a file's contents.
///
/// The chunk is clamped to the end of the file. Reading from an offset at or
/// past the end fails.
pub fn read_chunk(
    contents: &Bytes,
    mode: ReadMode,
    buffer_size: usize,
    offset: u64,
) -> Result<Bytes, CommandError> {
    let size = contents.len();
    let start = match mode {
        ReadMode::FromStart => 0,
        ReadMode::FromOffset => match usize::try_from(offset) {
            Ok(start) if start < size => start,
            _ => {
                return Err(CommandError::Range {
                    offset,
                    size: size as u64,
                })
            }
        },
    };
    let end = start.saturating_add(buffer_size).min(size);
    Ok(contents.slice(start..end))
}

/// Executes AT commands for one connection.
///
/// Owns the connection's [`Session`], so a fresh handler starts uninitialized.
#[derive(Debug)]
pub struct CommandHandler<F> {
    /// File access collaborator
    files: F,
    /// Storage area layout
    distribution: Distribution,
    /// Lifecycle state of this connection
    session: Session,
}

impl<F: FileAccess> CommandHandler<F> {
    /// Creates a handler with a fresh session.
    pub fn new(config: &EmulatorConfig, files: F) -> Self {
        Self {
            files,
            distribution: config.distribution(),
            session: Session::new(config.require_init),
        }
    }

    /// The session state of this connection.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one line.
    ///
    /// Returns `None` when the line is not an AT command or names a command
    /// the emulator does not implement; such lines get no response at all.
    pub async fn handle_line(&mut self, line: &str) -> Option<Response> {
        let Some(at) = parse_line(line) else {
            trace!(line = %line, "Not an AT command, ignoring");
            return None;
        };
        let Some(command) = Command::from_name(&at.command) else {
            trace!(command = %at.command, "Unsupported command, ignoring");
            return None;
        };

        match self.execute(command, &at).await {
            Ok(info) => Some(Response::success(at.original, info)),
            Err(e) => {
                debug!(
                    command = command.name(),
                    kind = e.kind(),
                    error = %e,
                    "Command failed"
                );
                Some(Response::error(at.original))
            }
        }
    }

    /// Executes a recognized command.
    ///
    /// On error the session is left untouched and no output is produced.
    pub async fn execute(
        &mut self,
        command: Command,
        at: &AtCommand,
    ) -> Result<Vec<Info>, CommandError> {
        self.session.guard(command)?;

        match command {
            Command::Init => self.cmd_init(at),
            Command::Terminate => self.cmd_terminate(at),
            Command::GetFileSize => self.cmd_get_file_size(at).await,
            Command::ReadFile => self.cmd_read_file(at).await,
        }
    }

    // ========================================================================
    // Session Commands
    // ========================================================================

    /// CFSINIT
    fn cmd_init(&mut self, at: &AtCommand) -> Result<Vec<Info>, CommandError> {
        self.session.check_init()?;
        ensure_no_params(Command::Init, at)?;
        self.session.initialize();
        Ok(Vec::new())
    }

    /// CFSTERM
    fn cmd_terminate(&mut self, at: &AtCommand) -> Result<Vec<Info>, CommandError> {
        ensure_no_params(Command::Terminate, at)?;
        self.session.terminate();
        Ok(Vec::new())
    }

    // ========================================================================
    // File Commands
    // ========================================================================

    /// CFSGFIS dirIndex,fileName
    async fn cmd_get_file_size(&self, at: &AtCommand) -> Result<Vec<Info>, CommandError> {
        let params = Command::GetFileSize.spec().validate(&at.raw_args)?;
        let path = self.resolve(&params)?;

        debug!(path = %path.display(), "Getting file size");
        let size = self
            .files
            .size(&path)
            .await
            .map_err(|e| CommandError::io(&path, e))?;

        Ok(vec![Info::value(Command::GetFileSize.name(), size)])
    }

    /// CFSRFILE dirIndex,fileName,mode,bufferSize,offset
    async fn cmd_read_file(&self, at: &AtCommand) -> Result<Vec<Info>, CommandError> {
        let params = Command::ReadFile.spec().validate(&at.raw_args)?;
        let path = self.resolve(&params)?;
        let mode = ReadMode::from_wire(params.integer("mode")?);
        // Both are validated as non-negative
        let buffer_size = params.integer("bufferSize")? as usize;
        let offset = params.integer("offset")? as u64;

        debug!(
            path = %path.display(),
            ?mode,
            buffer_size,
            offset,
            "Reading file"
        );
        let contents = self
            .files
            .read(&path)
            .await
            .map_err(|e| CommandError::io(&path, e))?;
        let chunk = read_chunk(&contents, mode, buffer_size, offset)?;

        Ok(vec![Info::payload(Command::ReadFile.name(), chunk)])
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Resolves the `dirIndex` and `fileName` parameters to a path.
    fn resolve(&self, params: &Params) -> Result<PathBuf, CommandError> {
        let dir = Directory::for_index(params.integer("dirIndex")?)?;
        Ok(self.distribution.resolve(dir, params.text("fileName")?)?)
    }
}

fn ensure_no_params(command: Command, at: &AtCommand) -> Result<(), CommandError> {
    if at.has_args() {
        return Err(CommandError::UnexpectedParameters {
            command: command.name(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFiles;
    use tempfile::TempDir;

    /// Builds a distribution tree with a few known files.
    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for area in Directory::ALL {
            std::fs::create_dir(dir.path().join(area.name())).unwrap();
        }
        std::fs::write(dir.path().join("custapp/app.bin"), b"0123456789").unwrap();
        std::fs::write(dir.path().join("fota/a,b.txt"), b"quoted").unwrap();
        std::fs::write(dir.path().join("customer/empty.bin"), b"").unwrap();
        dir
    }

    fn handler(dir: &TempDir, require_init: bool) -> CommandHandler<LocalFiles> {
        let config = EmulatorConfig::new(dir.path()).with_require_init(require_init);
        CommandHandler::new(&config, LocalFiles)
    }

    async fn run(handler: &mut CommandHandler<LocalFiles>, line: &str) -> Option<Vec<u8>> {
        handler
            .handle_line(line)
            .await
            .map(|r| r.serialize().to_vec())
    }

    fn ok(echo: &str, body: &[u8]) -> Option<Vec<u8>> {
        let mut out = format!("{}\r", echo).into_bytes();
        out.extend_from_slice(body);
        out.extend_from_slice(b"\r\nOK\r\n");
        Some(out)
    }

    fn error(echo: &str) -> Option<Vec<u8>> {
        Some(format!("{}\r\r\nERROR\r\n", echo).into_bytes())
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_non_at_lines_are_ignored() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        assert_eq!(run(&mut h, "hello").await, None);
        assert_eq!(run(&mut h, "ATZ").await, None);
        assert_eq!(run(&mut h, "at+cfsinit").await, None);
    }

    #[tokio::test]
    async fn test_unknown_commands_are_ignored() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        assert_eq!(run(&mut h, "AT+CGMI").await, None);
        assert_eq!(run(&mut h, "AT+CFSWFILE=0,\"a\",0,1,0").await, None);
        assert_eq!(run(&mut h, "AT+CfsInit").await, None);
        // Nothing changed
        assert!(!h.session().is_initialized());
    }

    // ------------------------------------------------------------------------
    // Session Commands
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_init_and_terminate() {
        let dir = fixture();
        let mut h = handler(&dir, true);

        assert_eq!(run(&mut h, "AT+CFSINIT").await, ok("AT+CFSINIT", b""));
        assert!(h.session().is_initialized());

        assert_eq!(run(&mut h, "AT+CFSTERM").await, ok("AT+CFSTERM", b""));
        assert!(!h.session().is_initialized());
    }

    #[tokio::test]
    async fn test_echo_keeps_leading_whitespace() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        assert_eq!(run(&mut h, "\nAT+CFSINIT").await, ok("\nAT+CFSINIT", b""));

        let line = "\nAT+CFSGFIS=0,\"app.bin\"";
        assert_eq!(run(&mut h, line).await, ok(line, b"\r\n+CFSGFIS: 10\r\n"));

        let line = "  AT+CFSGFIS=0,\"missing.bin\"";
        assert_eq!(run(&mut h, line).await, error(line));
    }

    #[tokio::test]
    async fn test_double_init_strict() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        assert_eq!(run(&mut h, "AT+CFSINIT").await, ok("AT+CFSINIT", b""));
        assert_eq!(run(&mut h, "AT+CFSINIT").await, error("AT+CFSINIT"));
        assert!(h.session().is_initialized());
    }

    #[tokio::test]
    async fn test_double_init_lenient() {
        let dir = fixture();
        let mut h = handler(&dir, false);
        assert_eq!(run(&mut h, "AT+CFSINIT").await, ok("AT+CFSINIT", b""));
        assert_eq!(run(&mut h, "AT+CFSINIT").await, ok("AT+CFSINIT", b""));
    }

    #[tokio::test]
    async fn test_session_commands_reject_parameters() {
        let dir = fixture();
        let mut h = handler(&dir, true);

        assert_eq!(run(&mut h, "AT+CFSINIT=1").await, error("AT+CFSINIT=1"));
        assert!(!h.session().is_initialized());

        assert_eq!(run(&mut h, "AT+CFSINIT").await, ok("AT+CFSINIT", b""));
        assert_eq!(run(&mut h, "AT+CFSTERM?").await, error("AT+CFSTERM?"));
        assert!(h.session().is_initialized());
    }

    #[tokio::test]
    async fn test_empty_value_counts_as_no_parameters() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        assert_eq!(run(&mut h, "AT+CFSINIT=").await, ok("AT+CFSINIT=", b""));
    }

    #[tokio::test]
    async fn test_terminate_requires_session() {
        let dir = fixture();
        let mut strict = handler(&dir, true);
        assert_eq!(run(&mut strict, "AT+CFSTERM").await, error("AT+CFSTERM"));

        let mut lenient = handler(&dir, false);
        assert_eq!(run(&mut lenient, "AT+CFSTERM").await, ok("AT+CFSTERM", b""));
    }

    #[tokio::test]
    async fn test_guard_blocks_file_commands() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        let line = "AT+CFSGFIS=0,\"app.bin\"";
        assert_eq!(run(&mut h, line).await, error(line));
        let line = "AT+CFSRFILE=0,\"app.bin\",0,4,0";
        assert_eq!(run(&mut h, line).await, error(line));
        assert!(!h.session().is_initialized());
    }

    #[tokio::test]
    async fn test_guard_disabled_allows_file_commands() {
        let dir = fixture();
        let mut h = handler(&dir, false);
        let line = "AT+CFSGFIS=0,\"app.bin\"";
        assert_eq!(run(&mut h, line).await, ok(line, b"\r\n+CFSGFIS: 10\r\n"));
    }

    #[tokio::test]
    async fn test_guard_after_terminate() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;
        run(&mut h, "AT+CFSTERM").await;
        let line = "AT+CFSGFIS=0,\"app.bin\"";
        assert_eq!(run(&mut h, line).await, error(line));
    }

    // ------------------------------------------------------------------------
    // CFSGFIS
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_file_size() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        let line = "AT+CFSGFIS=0,\"app.bin\"";
        assert_eq!(run(&mut h, line).await, ok(line, b"\r\n+CFSGFIS: 10\r\n"));

        let line = "AT+CFSGFIS=3,empty.bin";
        assert_eq!(run(&mut h, line).await, ok(line, b"\r\n+CFSGFIS: 0\r\n"));
    }

    #[tokio::test]
    async fn test_get_file_size_quoted_comma() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        let line = "AT+CFSGFIS=1,\"a,b.txt\"";
        assert_eq!(run(&mut h, line).await, ok(line, b"\r\n+CFSGFIS: 6\r\n"));
    }

    #[tokio::test]
    async fn test_get_file_size_failures() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        for line in [
            "AT+CFSGFIS=0,\"missing.bin\"",
            "AT+CFSGFIS=1,\"app.bin\"",
            "AT+CFSGFIS=4,\"app.bin\"",
            "AT+CFSGFIS=0",
            "AT+CFSGFIS=",
            "AT+CFSGFIS",
            "AT+CFSGFIS=0,\"../fota/a,b.txt\"",
        ] {
            assert_eq!(run(&mut h, line).await, error(line), "line: {}", line);
        }
        // Failures do not end the session
        assert!(h.session().is_initialized());
    }

    // ------------------------------------------------------------------------
    // CFSRFILE
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_read_from_start() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        let line = "AT+CFSRFILE=0,\"app.bin\",0,4,0";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 4\r\n0123\r\n")
        );

        // Offset is ignored in mode 0
        let line = "AT+CFSRFILE=0,\"app.bin\",0,4,100";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 4\r\n0123\r\n")
        );

        // Clamped to the file size
        let line = "AT+CFSRFILE=0,\"app.bin\",0,10240,0";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 10\r\n0123456789\r\n")
        );
    }

    #[tokio::test]
    async fn test_read_from_offset() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        let line = "AT+CFSRFILE=0,\"app.bin\",1,4,3";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 4\r\n3456\r\n")
        );

        let line = "AT+CFSRFILE=0,\"app.bin\",1,100,8";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 2\r\n89\r\n")
        );

        let line = "AT+CFSRFILE=0,\"app.bin\",1,1,9";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 1\r\n9\r\n")
        );
    }

    #[tokio::test]
    async fn test_read_offset_out_of_range() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        for line in [
            "AT+CFSRFILE=0,\"app.bin\",1,4,10",
            "AT+CFSRFILE=0,\"app.bin\",1,4,11",
            "AT+CFSRFILE=3,\"empty.bin\",1,4,0",
        ] {
            assert_eq!(run(&mut h, line).await, error(line), "line: {}", line);
        }
    }

    #[tokio::test]
    async fn test_read_zero_length() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        let line = "AT+CFSRFILE=0,\"app.bin\",0,0,0";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 0\r\n\r\n")
        );

        let line = "AT+CFSRFILE=3,\"empty.bin\",0,16,0";
        assert_eq!(
            run(&mut h, line).await,
            ok(line, b"\r\n+CFSRFILE: 0\r\n\r\n")
        );
    }

    #[tokio::test]
    async fn test_read_validation_failures() {
        let dir = fixture();
        let mut h = handler(&dir, true);
        run(&mut h, "AT+CFSINIT").await;

        for line in [
            "AT+CFSRFILE=0,\"app.bin\",2,4,0",
            "AT+CFSRFILE=0,\"app.bin\",0,10241,0",
            "AT+CFSRFILE=0,\"app.bin\",0,4",
            "AT+CFSRFILE=0,\"app.bin\",0,4,-1",
            "AT+CFSRFILE=0,\"app.bin\",x,4,0",
            "AT+CFSRFILE=0,\"missing\",0,4,0",
        ] {
            assert_eq!(run(&mut h, line).await, error(line), "line: {}", line);
        }
    }

    #[test]
    fn test_read_chunk() {
        let data = Bytes::from_static(b"abcdef");
        assert_eq!(
            read_chunk(&data, ReadMode::FromStart, 3, 5).unwrap(),
            Bytes::from_static(b"abc")
        );
        assert_eq!(
            read_chunk(&data, ReadMode::FromOffset, 3, 2).unwrap(),
            Bytes::from_static(b"cde")
        );
        assert_eq!(
            read_chunk(&data, ReadMode::FromOffset, usize::MAX, 4).unwrap(),
            Bytes::from_static(b"ef")
        );
        assert!(matches!(
            read_chunk(&data, ReadMode::FromOffset, 1, 6),
            Err(CommandError::Range { offset: 6, size: 6 })
        ));
        assert!(read_chunk(&data, ReadMode::FromOffset, 1, u64::MAX).is_err());
    }

    #[test]
    fn test_read_mode_from_wire() {
        assert_eq!(ReadMode::from_wire(0), ReadMode::FromStart);
        assert_eq!(ReadMode::from_wire(1), ReadMode::FromOffset);
    }
}
