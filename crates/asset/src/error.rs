//! Errors produced while loading OBJ models.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Why a path was rejected before parsing started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreconditionFailure {
    MissingExtension,
    NotFound,
    NotAFile,
}

impl fmt::Display for PreconditionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingExtension => "expected a .obj extension",
            Self::NotFound => "file does not exist",
            Self::NotAFile => "not a regular file",
        })
    }
}

/// Which table an out-of-range index pointed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Position,
    TexCoord,
    Normal,
    /// One of the three vertex slots of a triangular face.
    FaceVertex,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::TexCoord => "texture coordinate",
            Self::Normal => "normal",
            Self::FaceVertex => "face vertex",
        })
    }
}

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("cannot load {}: {reason}", path.display())]
    Precondition {
        path: PathBuf,
        reason: PreconditionFailure,
    },

    #[error("line {line}: invalid {what} '{token}'")]
    Format {
        line: usize,
        what: &'static str,
        token: String,
    },

    /// `index` is the value as written in the file (1-based).
    #[error("line {line}: {kind} index {index} out of range (have {len})")]
    IndexOutOfRange {
        line: usize,
        kind: IndexKind,
        index: i64,
        len: usize,
    },

    #[error("failed to read OBJ data")]
    Io(#[from] io::Error),
}

impl ObjError {
    pub(crate) fn precondition(path: impl Into<PathBuf>, reason: PreconditionFailure) -> Self {
        Self::Precondition {
            path: path.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_line_and_kind() {
        let err = ObjError::IndexOutOfRange {
            line: 7,
            kind: IndexKind::Normal,
            index: 4,
            len: 3,
        };
        assert_eq!(err.to_string(), "line 7: normal index 4 out of range (have 3)");

        let err = ObjError::precondition("mesh.txt", PreconditionFailure::MissingExtension);
        assert_eq!(err.to_string(), "cannot load mesh.txt: expected a .obj extension");
    }
}
