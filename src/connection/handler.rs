//! Connection Handler Module
//!
//! This module drives one serial (or TCP) session. Reading and command
//! processing run side by side, joined by a FIFO queue of lines.
//!
//! ## Session Lifecycle
//!
//! ```text
//!  transport (read half)                       transport (write half)
//!        │                                              ▲
//!        ▼                                              │
//! ┌──────────────┐   lines   ┌───────┐   line   ┌───────┴────────┐
//! │ read_lines   │──────────>│ FIFO  │─────────>│ process_lines  │
//! │ LineSplitter │           │ queue │          │ CommandHandler │
//! └──────────────┘           └───────┘          └────────────────┘
//! ```
//!
//! The reader keeps accepting input while a command waits on file I/O. The
//! processor takes one line at a time and writes its complete response
//! before looking at the next line, so responses never interleave on the
//! wire and always come back in line order.
//!
//! When the reader stops, at end of input or on a read error, it drops its
//! end of the queue. The processor still answers every line queued before
//! that, so no response is ever cut short.
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut` until a `\r` completes a line.
//! There is no line length limit.

use crate::commands::CommandHandler;
use crate::protocol::LineSplitter;
use crate::storage::FileAccess;
use bytes::BytesMut;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Lines that may wait for processing before the reader pauses
const QUEUE_CAPACITY: usize = 64;

/// Statistics for session handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of sessions started
    pub sessions_started: AtomicU64,
    /// Currently active sessions
    pub active_sessions: AtomicU64,
    /// Non-empty lines received
    pub lines_received: AtomicU64,
    /// Commands answered (OK or ERROR)
    pub commands_processed: AtomicU64,
    /// Commands answered with ERROR
    pub commands_failed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_ended(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn line_received(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self, ok: bool) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.commands_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single session on a byte-stream transport.
pub struct ConnectionHandler<T, F> {
    /// Serial port, TCP stream, or anything else that reads and writes bytes
    transport: T,

    /// Peer name (for logging)
    peer: String,

    /// The command handler, owning this session's state
    command_handler: CommandHandler<F>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<T, F> ConnectionHandler<T, F>
where
    T: AsyncRead + AsyncWrite + Unpin,
    F: FileAccess,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `transport` - The byte stream to serve
    /// * `peer` - A name for the other end, used in log output
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        transport: T,
        peer: impl Into<String>,
        command_handler: CommandHandler<F>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self {
            transport,
            peer: peer.into(),
            command_handler,
            stats,
        }
    }

    /// Runs the session until the transport closes or fails.
    ///
    /// Lines still queued when the input ends or fails are processed and
    /// answered before this returns. A read error takes precedence over a
    /// write error in the result.
    pub async fn run(self) -> Result<(), ConnectionError> {
        let ConnectionHandler {
            transport,
            peer,
            mut command_handler,
            stats,
        } = self;

        info!(peer = %peer, "Session started");
        stats.session_started();

        let (reader, writer) = tokio::io::split(transport);
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);

        let (read_result, process_result) = tokio::join!(
            read_lines(reader, queue_tx, &stats, &peer),
            process_lines(writer, queue_rx, &mut command_handler, &stats, &peer),
        );
        let result = read_result.and(process_result);

        match &result {
            Ok(()) => info!(peer = %peer, "Session ended"),
            Err(e) => warn!(peer = %peer, error = %e, "Session error"),
        }

        stats.session_ended();
        result
    }
}

/// Reads from the transport and queues complete lines in arrival order.
async fn read_lines<R>(
    mut reader: R,
    queue: mpsc::Sender<String>,
    stats: &ConnectionStats,
    peer: &str,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(INITIAL_BUFFER_SIZE);
    let mut splitter = LineSplitter::new();

    loop {
        // Ensure we have some capacity
        if buffer.capacity() - buffer.len() < 1024 {
            buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = reader.read_buf(&mut buffer).await?;
        if n == 0 {
            if !buffer.is_empty() {
                debug!(
                    peer = %peer,
                    discarded = buffer.len(),
                    "Input ended inside a line"
                );
            }
            return Ok(());
        }

        stats.bytes_read(n);
        trace!(peer = %peer, bytes = n, buffered = buffer.len(), "Read data");

        while let Some(line) = splitter.next_line(&mut buffer) {
            stats.line_received();
            if queue.send(line).await.is_err() {
                // Processor is gone; its error is reported by the caller
                return Ok(());
            }
        }
    }
}

/// Executes queued lines one at a time, writing each response in full.
async fn process_lines<W, F>(
    mut writer: W,
    mut queue: mpsc::Receiver<String>,
    command_handler: &mut CommandHandler<F>,
    stats: &ConnectionStats,
    peer: &str,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Unpin,
    F: FileAccess,
{
    while let Some(line) = queue.recv().await {
        debug!(peer = %peer, "<< {}", line);

        let Some(response) = command_handler.handle_line(&line).await else {
            continue;
        };

        let bytes = response.serialize();
        writer.write_all(&bytes).await?;
        writer.flush().await?;

        stats.command_processed(response.is_ok());
        stats.bytes_written(bytes.len());
        debug!(peer = %peer, ">> {}", response);
    }

    Ok(())
}

/// Errors that can occur while serving a session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error on the transport
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Serves a session.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion, logging any transport failure.
///
/// # Arguments
///
/// * `transport` - The byte stream to serve
/// * `peer` - A name for the other end, used in log output
/// * `command_handler` - The command handler for executing commands
/// * `stats` - Shared connection statistics
pub async fn handle_connection<T, F>(
    transport: T,
    peer: impl Into<String>,
    command_handler: CommandHandler<F>,
    stats: Arc<ConnectionStats>,
) where
    T: AsyncRead + AsyncWrite + Unpin,
    F: FileAccess,
{
    let peer = peer.into();
    let handler = ConnectionHandler::new(transport, peer.clone(), command_handler, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(peer = %peer, error = %e, "Session ended with error");
            }
        }
    }
}
