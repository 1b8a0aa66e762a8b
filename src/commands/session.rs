//! Session Lifecycle
//!
//! ```text
//!                  CFSINIT
//!  ┌───────────────┐ ───> ┌─────────────┐
//!  │ Uninitialized │      │ Initialized │
//!  └───────────────┘ <─── └─────────────┘
//!                  CFSTERM
//! ```
//!
//! With the guard enabled, every command except `CFSINIT` requires the
//! `Initialized` state, and a second `CFSINIT` is rejected. With the guard
//! disabled, both checks are skipped.
//!
//! One `Session` belongs to one connection and is owned by its command
//! handler.

use crate::commands::{Command, CommandError};

/// The two lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
}

/// Lifecycle state plus the guard setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
    enforce: bool,
}

impl Session {
    /// Creates an uninitialized session.
    pub fn new(enforce: bool) -> Self {
        Self {
            state: SessionState::Uninitialized,
            enforce,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == SessionState::Initialized
    }

    /// Whether the guard is enforced.
    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// Fails if `command` needs an open session and there is none.
    pub fn guard(&self, command: Command) -> Result<(), CommandError> {
        if self.enforce && command.requires_session() && !self.is_initialized() {
            return Err(CommandError::NotInitialized {
                command: command.name(),
            });
        }
        Ok(())
    }

    /// Fails if `CFSINIT` is not allowed right now.
    pub fn check_init(&self) -> Result<(), CommandError> {
        if self.enforce && self.is_initialized() {
            return Err(CommandError::AlreadyInitialized);
        }
        Ok(())
    }

    pub fn initialize(&mut self) {
        self.state = SessionState::Initialized;
    }

    pub fn terminate(&mut self) {
        self.state = SessionState::Uninitialized;
    }
}
