//! decoding documents into schemas
//!
//! Items are handled in document order. The first failure aborts decoding, whatever was assigned before it stays
//! assigned.
//!
//! A section that appears more than once is decoded every time: keys of the later occurrence overwrite the earlier
//! ones.
use crate::document::{Document, ItemKind, Items, Node, SECTION, WHEN};
use crate::error::{Error, Result};
use crate::schema::{HolderMut, Schema, Slot};
use crate::Literal;
use std::path::Path;

/// Read the file at `path` and decode it into `out`
pub fn decode_file<T: Schema + ?Sized>(out: &mut T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tracing::info!(path=%path.display(), "loading file");

    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode(out, path, &data)
}

/// Decode `data` into `out`
///
/// `filename` only shows up in error positions, pass an empty path for anonymous input.
pub fn decode<T: Schema + ?Sized>(
    out: &mut T,
    filename: impl AsRef<Path>,
    data: &[u8],
) -> Result<()> {
    let filename = Some(filename.as_ref()).filter(|name| !name.as_os_str().is_empty());

    let document = Document::from_bytes(data, filename)?;
    decode_document(out, &document).map_err(|err| match filename {
        Some(filename) => err.with_filename(filename),
        None => err,
    })
}

pub(crate) fn decode_document<T: Schema + ?Sized>(out: &mut T, document: &Document) -> Result<()> {
    let mut bindings = out.bindings_mut()?;

    for item in document.items() {
        match item.kind() {
            ItemKind::Assignment { key, value } => {
                tracing::trace!(key, "decode value");
                let slot = bindings.value_mut(key).ok_or_else(|| Error::UnknownKey {
                    pos: Some(item.position()),
                    section: None,
                    key: key.to_string(),
                })?;
                decode_into(key, &value, slot)?;
            }
            ItemKind::Block {
                keyword: SECTION,
                name,
                name_pos,
                items,
            } => {
                tracing::trace!(name, "decode section");
                let section = bindings
                    .section_mut(name)
                    .ok_or_else(|| Error::UnknownSection {
                        pos: Some(name_pos),
                        name: name.to_string(),
                    })?;
                decode_section(&mut **section, name, items)?;
            }
            ItemKind::Block {
                keyword: WHEN, name, ..
            } => {
                tracing::trace!(condition = name, "when block is not evaluated");
            }
            ItemKind::Block { keyword, .. } => {
                return Err(Error::Syntax {
                    pos: item.position(),
                    message: format!("unknown block type `{keyword}`, expected `{SECTION}` or `{WHEN}`"),
                })
            }
            ItemKind::Malformed(message) => {
                return Err(Error::Syntax {
                    pos: item.position(),
                    message,
                })
            }
        }
    }

    Ok(())
}

fn decode_section(schema: &mut dyn Schema, section: &str, items: Items<'_>) -> Result<()> {
    let mut bindings = schema.bindings_mut()?;

    for item in items {
        let ItemKind::Assignment { key, value } = item.kind() else {
            return Err(Error::Syntax {
                pos: item.position(),
                message: format!("expected `key = value` inside section {section}"),
            });
        };

        let slot = bindings.value_mut(key).ok_or_else(|| Error::UnknownKey {
            pos: Some(item.position()),
            section: Some(section.to_string()),
            key: key.to_string(),
        })?;
        decode_into(key, &value, slot)?;
    }

    Ok(())
}

/// Decode a single literal into a bound field
pub(crate) fn decode_into(name: &str, node: &Node<'_>, slot: &mut Slot<'_>) -> Result<()> {
    match slot {
        Slot::Bool(out) => **out = decode_bool(name, node)?,
        Slot::Int(out) => **out = decode_int(name, node)?,
        Slot::Float(out) => **out = decode_float(name, node)?,
        Slot::String(out) => **out = decode_string(name, node)?,
        Slot::StringList(out) => **out = decode_string_list(name, node)?,
        Slot::Optional(optional) => {
            optional.fill(&mut |inner: &mut Slot<'_>| decode_into(name, node, inner))?
        }
        Slot::Holder(holder) => {
            match holder {
                HolderMut::String(out) => out.set(decode_string(name, node)?),
                HolderMut::Bool(out) => out.set(decode_bool(name, node)?),
                HolderMut::Int64(out) => out.set(decode_int(name, node)?),
                HolderMut::StringSlice(out) => out.set(decode_string_list(name, node)?),
            }
            holder.set_source(node.position().clone());
        }
    }

    Ok(())
}

fn mismatch(name: &str, node: &Node<'_>, expected: &'static str) -> Error {
    Error::TypeMismatch {
        pos: node.position().clone(),
        name: name.to_string(),
        index: None,
        expected,
        found: node.literal().describe().to_string(),
    }
}

fn decode_bool(name: &str, node: &Node<'_>) -> Result<bool> {
    match node.literal() {
        Literal::Bool(value) => Ok(*value),
        Literal::String(text) | Literal::Heredoc(text) => {
            parse_bool(text).ok_or_else(|| mismatch(name, node, "bool"))
        }
        _ => Err(mismatch(name, node, "bool")),
    }
}

fn decode_int(name: &str, node: &Node<'_>) -> Result<i64> {
    match node.literal() {
        Literal::Int(value) => Ok(*value),
        Literal::String(text) | Literal::Heredoc(text) => {
            parse_int(text).ok_or_else(|| mismatch(name, node, "integer"))
        }
        _ => Err(mismatch(name, node, "integer")),
    }
}

fn decode_float(name: &str, node: &Node<'_>) -> Result<f64> {
    match node.literal() {
        Literal::Float(value) => Ok(*value),
        _ => Err(mismatch(name, node, "float")),
    }
}

fn decode_string(name: &str, node: &Node<'_>) -> Result<String> {
    match node.literal() {
        Literal::String(text) | Literal::Heredoc(text) => Ok(text.clone()),
        // numbers keep the spelling they have in the document
        Literal::Int(_) | Literal::Float(_) if !node.text().is_empty() => Ok(node.text().to_string()),
        Literal::Int(value) => Ok(value.to_string()),
        Literal::Float(value) => Ok(value.to_string()),
        _ => Err(mismatch(name, node, "string")),
    }
}

fn decode_string_list(name: &str, node: &Node<'_>) -> Result<Vec<String>> {
    let Literal::List(elements) = node.literal() else {
        return Err(mismatch(name, node, "list of strings"));
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| match element {
            Literal::String(text) | Literal::Heredoc(text) => Ok(text.clone()),
            other => Err(Error::TypeMismatch {
                pos: node.position().clone(),
                name: name.to_string(),
                index: Some(index),
                expected: "string",
                found: other.describe().to_string(),
            }),
        })
        .collect()
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Integer with optional sign and base prefix (`0x`, `0o`, `0b`, or a leading `0` for octal)
///
/// `_` separators are only accepted after a base prefix.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits, prefixed) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..], true),
        Some("0o" | "0O") => (8, &unsigned[2..], true),
        Some("0b" | "0B") => (2, &unsigned[2..], true),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (8, &unsigned[1..], true),
        _ => (10, unsigned, false),
    };

    if digits.contains('_') && (!prefixed || digits.ends_with('_') || digits.contains("__")) {
        return None;
    }

    let digits = digits.replace('_', "");
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(&digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}
