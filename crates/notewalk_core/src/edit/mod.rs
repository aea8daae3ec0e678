//! Edit round-trip: scratch file -> external editor -> optional commit.
//!
//! # Invariants
//! - The editor runs synchronously; the session blocks until it exits.
//! - A failed editor launch never touches the store.
//! - Read-only sessions never write, even when the body changed.
//! - A failed store write leaves both the store and the caller's note as
//!   they were.

mod controller;
mod editor;

pub use controller::{EditController, EditOutcome};
pub use editor::{Editor, ExternalEditor};

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug)]
pub enum EditError {
    /// Editor could not be launched or exited unsuccessfully.
    EditorUnavailable { command: String, message: String },
    /// The store rejected the new body.
    StoreWriteFailed(StoreError),
    /// Scratch file could not be created or read back.
    Io(io::Error),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditorUnavailable { command, message } => {
                write!(f, "editor `{command}` unavailable: {message}")
            }
            Self::StoreWriteFailed(err) => write!(f, "failed to save note: {err}"),
            Self::Io(err) => write!(f, "scratch file error: {err}"),
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EditorUnavailable { .. } => None,
            Self::StoreWriteFailed(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for EditError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
