//! Distribution Directory Layout
//!
//! The emulated modem exposes four storage areas, selected by a directory
//! index in the AT commands. Each maps to a subdirectory of the distribution
//! root:
//!
//! ```text
//! <root>/
//! ├── custapp/    index 0
//! ├── fota/       index 1
//! ├── datatx/     index 2
//! └── customer/   index 3
//! ```

use crate::protocol::ValidationError;
use std::path::{Component, Path, PathBuf};

/// One of the four fixed storage areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directory {
    CustApp,
    Fota,
    DataTx,
    Customer,
}

impl Directory {
    /// All directories, in index order.
    pub const ALL: [Directory; 4] = [
        Directory::CustApp,
        Directory::Fota,
        Directory::DataTx,
        Directory::Customer,
    ];

    /// Highest valid wire index.
    pub const MAX_INDEX: i64 = Self::ALL.len() as i64 - 1;

    /// Returns the directory for a wire index.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Like [`Directory::from_index`], but reports a bad index the same way
    /// the `dirIndex` schema bound does.
    pub fn for_index(index: i64) -> Result<Self, ValidationError> {
        Self::from_index(index).ok_or_else(|| {
            if index < 0 {
                ValidationError::BelowMinimum {
                    field: "dirIndex",
                    value: index,
                    min: 0,
                }
            } else {
                ValidationError::AboveMaximum {
                    field: "dirIndex",
                    value: index,
                    max: Self::MAX_INDEX,
                }
            }
        })
    }

    /// The subdirectory name under the distribution root.
    pub fn name(self) -> &'static str {
        match self {
            Directory::CustApp => "custapp",
            Directory::Fota => "fota",
            Directory::DataTx => "datatx",
            Directory::Customer => "customer",
        }
    }
}

/// Resolves `(directory, file name)` pairs under a distribution root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    root: PathBuf,
}

impl Distribution {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The distribution root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path of one storage area.
    pub fn directory(&self, dir: Directory) -> PathBuf {
        self.root.join(dir.name())
    }

    /// Resolves a file name inside a storage area.
    ///
    /// Names may contain subdirectories but must stay inside the area:
    /// absolute paths and `..` components are rejected.
    pub fn resolve(&self, dir: Directory, file_name: &str) -> Result<PathBuf, ValidationError> {
        let name = Path::new(file_name);
        let confined = name
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(ValidationError::UnsafePath {
                field: "fileName",
                value: file_name.to_string(),
            });
        }
        Ok(self.directory(dir).join(name))
    }
}
