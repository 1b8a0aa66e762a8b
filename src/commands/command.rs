//! Supported commands and their parameter schemas.

use crate::protocol::{CommandSpec, FieldSpec};
use crate::storage::Directory;

/// Longest file name the modem accepts
pub const MAX_FILE_NAME_LEN: usize = 230;

/// Largest chunk a single `CFSRFILE` may return
pub const MAX_READ_BUFFER: i64 = 10240;

const DIR_INDEX: FieldSpec = FieldSpec::integer("dirIndex", 0, Some(Directory::MAX_INDEX));
const FILE_NAME: FieldSpec = FieldSpec::text("fileName", 1, MAX_FILE_NAME_LEN);

static INIT: CommandSpec = CommandSpec {
    name: "CFSINIT",
    fields: &[],
};

static TERMINATE: CommandSpec = CommandSpec {
    name: "CFSTERM",
    fields: &[],
};

static GET_FILE_SIZE: CommandSpec = CommandSpec {
    name: "CFSGFIS",
    fields: &[DIR_INDEX, FILE_NAME],
};

static READ_FILE: CommandSpec = CommandSpec {
    name: "CFSRFILE",
    fields: &[
        DIR_INDEX,
        FILE_NAME,
        FieldSpec::integer("mode", 0, Some(1)),
        FieldSpec::integer("bufferSize", 0, Some(MAX_READ_BUFFER)),
        FieldSpec::integer("offset", 0, None),
    ],
};

/// A command the emulator answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `CFSINIT` - open a file system session
    Init,
    /// `CFSTERM` - close the session
    Terminate,
    /// `CFSGFIS` - query a file's size
    GetFileSize,
    /// `CFSRFILE` - read a chunk of a file
    ReadFile,
}

impl Command {
    /// All supported commands.
    pub const ALL: [Command; 4] = [
        Command::Init,
        Command::Terminate,
        Command::GetFileSize,
        Command::ReadFile,
    ];

    /// Looks up a command by its exact (case-sensitive) wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// The wire name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// The parameter schema.
    pub fn spec(self) -> &'static CommandSpec {
        match self {
            Command::Init => &INIT,
            Command::Terminate => &TERMINATE,
            Command::GetFileSize => &GET_FILE_SIZE,
            Command::ReadFile => &READ_FILE,
        }
    }

    /// Whether the session guard applies to this command.
    pub fn requires_session(self) -> bool {
        !matches!(self, Command::Init)
    }
}
