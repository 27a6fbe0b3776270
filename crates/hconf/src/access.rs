//! section/key accessors
//!
//! [set] and [get] address a single field of a decoded struct by section and key. They work on memory only, use
//! [crate::edit_and_save] to change a file.
use crate::document::Literal;
use crate::error::{Error, Result};
use crate::position::Position;
use crate::schema::{FieldRef, HolderMut, Schema, Slot};
use std::fmt;

/// A value to store through [set] or [crate::edit_and_save]
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    String(String),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    StringList(Vec<String>),
    /// never accepted, neither by holders nor by documents
    Float(f64),
}

impl Assignment {
    /// The literal written to a document
    pub(crate) fn to_literal(&self) -> Option<Literal> {
        match self {
            Assignment::String(text) => Some(Literal::String(text.clone())),
            Assignment::Int32(value) => Some(Literal::Int(i64::from(*value))),
            Assignment::Int64(value) => Some(Literal::Int(*value)),
            Assignment::Bool(value) => Some(Literal::Bool(*value)),
            Assignment::StringList(values) => Some(Literal::List(
                values.iter().cloned().map(Literal::String).collect(),
            )),
            Assignment::Float(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Assignment::String(_) => "string",
            Assignment::Int32(_) => "i32",
            Assignment::Int64(_) => "i64",
            Assignment::Bool(_) => "bool",
            Assignment::StringList(_) => "list of strings",
            Assignment::Float(_) => "f64",
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::String(text) => write!(f, "{text:?}"),
            Assignment::Int32(value) => write!(f, "{value}"),
            Assignment::Int64(value) => write!(f, "{value}"),
            Assignment::Bool(value) => write!(f, "{value}"),
            Assignment::StringList(values) => write!(f, "{values:?}"),
            Assignment::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Assignment {
    fn from(value: &str) -> Self {
        Assignment::String(value.to_string())
    }
}

impl From<String> for Assignment {
    fn from(value: String) -> Self {
        Assignment::String(value)
    }
}

impl From<i32> for Assignment {
    fn from(value: i32) -> Self {
        Assignment::Int32(value)
    }
}

impl From<i64> for Assignment {
    fn from(value: i64) -> Self {
        Assignment::Int64(value)
    }
}

impl From<bool> for Assignment {
    fn from(value: bool) -> Self {
        Assignment::Bool(value)
    }
}

impl From<f64> for Assignment {
    fn from(value: f64) -> Self {
        Assignment::Float(value)
    }
}

impl From<Vec<String>> for Assignment {
    fn from(value: Vec<String>) -> Self {
        Assignment::StringList(value)
    }
}

impl From<&[&str]> for Assignment {
    fn from(value: &[&str]) -> Self {
        Assignment::StringList(value.iter().map(|item| item.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Assignment {
    fn from(value: [&str; N]) -> Self {
        value.as_slice().into()
    }
}

/// Store `value` in the holder bound to `section`.`key`
///
/// | holder | accepts |
/// |---|---|
/// | [crate::StringValue] | string |
/// | [crate::BoolValue] | bool, the strings `"true"` and `"false"` |
/// | [crate::Int64Value] | i32, i64 |
/// | [crate::StringSliceValue] | list of strings, a string holding a bracketed list (`["a", "b"]`) |
///
/// Plain fields and every other combination fail with [Error::UnsupportedAssignment]. The recorded source position
/// is left as is.
pub fn set<T: Schema + ?Sized>(
    target: &mut T,
    section: &str,
    key: &str,
    value: impl Into<Assignment>,
) -> Result<()> {
    let value = value.into();

    let mut sections = target.bindings_mut()?;
    let schema = sections
        .section_mut(section)
        .ok_or_else(|| unknown_section(section))?;

    let mut values = schema.bindings_mut()?;
    let slot = values
        .value_mut(key)
        .ok_or_else(|| unknown_key(section, key))?;

    let unsupported = |target: &'static str| Error::UnsupportedAssignment {
        section: section.to_string(),
        key: key.to_string(),
        target,
        value: format!("{} {value}", value.kind()),
    };

    match (slot, &value) {
        (Slot::Holder(HolderMut::String(holder)), Assignment::String(text)) => {
            holder.set(text.clone())
        }
        (Slot::Holder(HolderMut::Bool(holder)), Assignment::String(text))
            if text == "true" || text == "false" =>
        {
            holder.set(text == "true")
        }
        (Slot::Holder(HolderMut::Bool(holder)), Assignment::Bool(flag)) => holder.set(*flag),
        (Slot::Holder(HolderMut::Int64(holder)), Assignment::Int32(int)) => {
            holder.set(i64::from(*int))
        }
        (Slot::Holder(HolderMut::Int64(holder)), Assignment::Int64(int)) => holder.set(*int),
        (Slot::Holder(HolderMut::StringSlice(holder)), Assignment::StringList(items)) => {
            holder.set(items.clone())
        }
        (Slot::Holder(HolderMut::StringSlice(holder)), Assignment::String(text)) => {
            let items = serde_json::from_str::<Vec<String>>(text.trim())
                .map_err(|_| unsupported("StringSliceValue"))?;
            holder.set(items)
        }
        (slot, _) => return Err(unsupported(slot.kind())),
    }

    Ok(())
}

/// Borrow the field bound to `section`.`key`
///
/// The returned position is where the value was decoded from, or the default position for fields that do not track
/// one or were never decoded.
pub fn get<'a, T: Schema + ?Sized>(
    target: &'a T,
    section: &str,
    key: &str,
) -> Result<(FieldRef<'a>, Position)> {
    let sections = target.bindings()?;
    let schema = *sections
        .section(section)
        .ok_or_else(|| unknown_section(section))?;

    let field = schema
        .bindings()?
        .into_value(key)
        .ok_or_else(|| unknown_key(section, key))?;
    let position = field.source().cloned().unwrap_or_default();

    Ok((field, position))
}

fn unknown_section(section: &str) -> Error {
    Error::UnknownSection {
        pos: None,
        name: section.to_string(),
    }
}

fn unknown_key(section: &str, key: &str) -> Error {
    Error::UnknownKey {
        pos: None,
        section: Some(section.to_string()),
        key: key.to_string(),
    }
}
