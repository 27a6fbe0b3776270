//! source positions
//!
//! The parser reports byte spans. [LineIndex] turns those into the `line:column` pairs used in error messages and
//! recorded on every [crate::Holder] that received a value from a document.
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Position of a node inside a document
///
/// Lines and columns start at 1. The default value (line 0) marks "no position", e.g. a holder that was assigned
/// through [crate::set] instead of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub filename: Option<PathBuf>,
    /// byte offset into the document
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }

    /// Attach `filename` unless the position already names a file
    pub fn fill_filename(&mut self, filename: &Path) {
        if self.filename.is_none() {
            self.filename = Some(filename.to_path_buf());
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filename = self.filename.as_deref().map(Path::display);

        match (filename, self.is_valid()) {
            (Some(filename), true) => write!(f, "{filename}:{}:{}", self.line, self.column),
            (Some(filename), false) => write!(f, "{filename}"),
            (None, true) => write!(f, "{}:{}", self.line, self.column),
            (None, false) => f.write_str("-"),
        }
    }
}

/// Byte offset of the first character of every line
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();

        Self { starts }
    }

    pub fn position(&self, offset: usize, filename: Option<&Path>) -> Position {
        // number of line starts at or before `offset`, which is the 1-based line number
        let line = self.starts.partition_point(|start| *start <= offset);
        let line_start = self.starts[line - 1];

        Position {
            filename: filename.map(Path::to_path_buf),
            offset,
            line,
            column: offset - line_start + 1,
        }
    }

    /// Position of the start of `span`, or the default position when the parser did not report one
    pub fn span_position(&self, span: Option<Range<usize>>, filename: Option<&Path>) -> Position {
        match span {
            Some(span) => self.position(span.start, filename),
            None => Position {
                filename: filename.map(Path::to_path_buf),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_and_column() {
        let index = LineIndex::new("a = 1\nbb = 2\n\nc = 3");

        let first = index.position(0, None);
        assert_eq!((first.line, first.column), (1, 1));

        let second = index.position(9, None);
        assert_eq!((second.line, second.column), (2, 4));

        let last = index.position(14, None);
        assert_eq!((last.line, last.column), (4, 1));
    }

    #[test]
    fn display() {
        let mut position = LineIndex::new("x\ny = 2").position(2, None);
        assert_eq!(position.to_string(), "2:1");

        position.fill_filename(Path::new("app.conf"));
        assert_eq!(position.to_string(), "app.conf:2:1");

        position.fill_filename(Path::new("other.conf"));
        assert_eq!(position.to_string(), "app.conf:2:1");

        assert_eq!(Position::default().to_string(), "-");
    }
}
