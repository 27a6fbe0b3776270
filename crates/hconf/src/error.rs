//! error type shared by decoding, accessors and editing
use crate::position::Position;
use std::path::{Path, PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The destination struct does not describe a usable schema
    #[error("invalid schema: {0}")]
    Schema(String),

    /// The document is not valid HCL
    #[error("{}{source}", located_file(.filename))]
    Parse {
        filename: Option<PathBuf>,
        source: hcl_edit::parser::Error,
    },

    /// The document is valid HCL but not shaped like a configuration document
    #[error("{pos}: {message}")]
    Syntax { pos: Position, message: String },

    #[error("{pos}: {name}{}: expected {expected}, found {found}", indexed(.index))]
    TypeMismatch {
        pos: Position,
        name: String,
        /// index of the offending list element
        index: Option<usize>,
        expected: &'static str,
        found: String,
    },

    #[error("{}unknown section: {name}", located(.pos))]
    UnknownSection { pos: Option<Position>, name: String },

    #[error("{}unknown key: {}", located(.pos), qualified(.section, .key))]
    UnknownKey {
        pos: Option<Position>,
        section: Option<String>,
        key: String,
    },

    #[error("cannot assign {value} to {section}.{key} ({target})")]
    UnsupportedAssignment {
        section: String,
        key: String,
        /// kind of the destination
        target: &'static str,
        value: String,
    },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Position the error points at, if any
    pub fn position(&self) -> Option<&Position> {
        match self {
            Error::Syntax { pos, .. } | Error::TypeMismatch { pos, .. } => Some(pos),
            Error::UnknownSection { pos, .. } | Error::UnknownKey { pos, .. } => pos.as_ref(),
            _ => None,
        }
    }

    /// Attach `filename` to position-tagged errors that do not name a file yet
    pub fn with_filename(mut self, filename: &Path) -> Self {
        match &mut self {
            Error::Syntax { pos, .. } | Error::TypeMismatch { pos, .. } => pos.fill_filename(filename),
            Error::UnknownSection { pos: Some(pos), .. } | Error::UnknownKey { pos: Some(pos), .. } => {
                pos.fill_filename(filename)
            }
            Error::Parse { filename: current, .. } if current.is_none() => {
                *current = Some(filename.to_path_buf())
            }
            _ => {}
        }

        self
    }
}

fn located(pos: &Option<Position>) -> String {
    pos.as_ref().map(|pos| format!("{pos}: ")).unwrap_or_default()
}

fn located_file(filename: &Option<PathBuf>) -> String {
    filename
        .as_ref()
        .map(|filename| format!("{}: ", filename.display()))
        .unwrap_or_default()
}

fn indexed(index: &Option<usize>) -> String {
    index.map(|index| format!("[{index}]")).unwrap_or_default()
}

fn qualified(section: &Option<String>, key: &str) -> String {
    match section {
        Some(section) => format!("{section}.{key}"),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn with_filename_fills_missing_only() {
        let err = Error::UnknownKey {
            pos: Some(Position {
                line: 3,
                column: 5,
                ..Default::default()
            }),
            section: Some("foo".into()),
            key: "colour".into(),
        };

        let err = err.with_filename(Path::new("app.conf"));
        assert_eq!(err.to_string(), "app.conf:3:5: unknown key: foo.colour");

        let err = err.with_filename(Path::new("other.conf"));
        assert_eq!(err.to_string(), "app.conf:3:5: unknown key: foo.colour");
    }

    #[test]
    fn unpositioned_errors_stay_unpositioned() {
        let err = Error::UnknownSection {
            pos: None,
            name: "baz".into(),
        }
        .with_filename(Path::new("app.conf"));

        assert!(err.position().is_none());
        assert_eq!(err.to_string(), "unknown section: baz");
    }

    #[test]
    fn type_mismatch_names_index() {
        let err = Error::TypeMismatch {
            pos: Position {
                line: 2,
                column: 11,
                ..Default::default()
            },
            name: "friends".into(),
            index: Some(1),
            expected: "string",
            found: "number".into(),
        };

        assert_eq!(
            err.to_string(),
            "2:11: friends[1]: expected string, found number"
        );
    }
}
