//! in-place editing
//!
//! Edits touch exactly one `key = literal` pair. Everything else in the document (comments, blank lines, ordering,
//! other sections) is printed back as it was read.
//!
//! Only the first section with a matching name is considered. Decoding applies every occurrence, so a key that is
//! repeated in a later section keeps overriding the edited one.
use crate::access::Assignment;
use crate::document::{Assigned, Document};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Set `section`.`key` in `source` and return the new document text
pub fn edit_document(
    source: &str,
    section: &str,
    key: &str,
    value: impl Into<Assignment>,
) -> Result<String> {
    let document = Document::parse(source, None)?;
    let (document, _) = edit_parsed(document, section, key, &value.into())?;
    Ok(document.to_string())
}

/// Set `section`.`key` in the file at `path`
///
/// A missing file is treated as an empty document. Missing parent directories are created with mode `0755`, a new
/// file with mode `0600`. The file is overwritten without locking.
pub fn edit_and_save(
    path: impl AsRef<Path>,
    section: &str,
    key: &str,
    value: impl Into<Assignment>,
) -> Result<()> {
    let path = path.as_ref();

    let source = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(io_error(path)(err)),
    };

    let document = Document::from_bytes(&source, Some(path))?;
    let (document, assigned) = edit_parsed(document, section, key, &value.into())?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir(parent).map_err(io_error(parent))?;
    }

    let mut file = open_for_write(path).map_err(io_error(path))?;
    file.write_all(document.to_string().as_bytes())
        .map_err(io_error(path))?;

    tracing::info!(path=%path.display(), section, key, ?assigned, "saved");
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::Io { path, source }
}

fn edit_parsed(
    mut document: Document,
    section: &str,
    key: &str,
    value: &Assignment,
) -> Result<(Document, Assigned)> {
    let literal = value
        .to_literal()
        .ok_or_else(|| Error::UnsupportedAssignment {
            section: section.to_string(),
            key: key.to_string(),
            target: "document",
            value: format!("{} {value}", value.kind()),
        })?;

    let assigned = document.assign(section, key, &literal)?;
    tracing::debug!(section, key, ?assigned, "edited document");

    Ok((document, assigned))
}

#[cfg(unix)]
fn create_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[cfg(unix)]
fn open_for_write(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
