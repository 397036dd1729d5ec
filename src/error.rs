// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Error taxonomy shared by both collectors.
//!
//! Only a failed topology query aborts a whole CPU fetch. Everything else is
//! scoped to a single process, directory or file and is logged by the caller
//! before it moves on to the next entity.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// An external tool could not be spawned.
    #[error("failed to run `{command}`: {io}")]
    ToolInvocation { command: String, io: io::Error },

    /// An external tool ran but reported failure.
    #[error("`{command}` exited with {status}: {stderr}")]
    ToolFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// A `/proc` or cgroup pseudo-file (or directory) is missing or unreadable.
    #[error("failed to read {}: {io}", path.display())]
    FileAccess { path: PathBuf, io: io::Error },

    /// Malformed content in a pseudo-file or tool output.
    #[error("invalid {what}: {input:?}")]
    Parse { what: &'static str, input: String },

    /// A numeric user id has no passwd entry (or the lookup itself failed).
    #[error("cannot resolve uid {uid}: {reason}")]
    Lookup { uid: u32, reason: String },

    #[error("invalid configuration file {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub fn parse(what: &'static str, input: impl Into<String>) -> Self {
        Error::Parse {
            what,
            input: input.into(),
        }
    }
}

/// Read a whole pseudo-file, tagging failures with the path.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|io| Error::FileAccess {
        path: path.to_path_buf(),
        io,
    })
}

/// Read a pseudo-file whose text may carry arbitrary bytes (process names,
/// command lines). Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_file_lossy(path: &Path) -> Result<String> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|io| Error::FileAccess {
            path: path.to_path_buf(),
            io,
        })
}

/// List a directory, tagging failures with the path.
pub(crate) fn read_dir(path: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(path).map_err(|io| Error::FileAccess {
        path: path.to_path_buf(),
        io,
    })
}
