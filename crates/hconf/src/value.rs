//! value representation
//!
//! A document rendered as plain data, for printing it as yaml or json. The data model:
//! - boolean (true/false)
//! - integer (i64)
//! - decimal (f64)
//! - string (utf-8, heredocs included)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! A document becomes an object holding its top level keys, plus one object per block keyword:
//!
//! ```hcl
//! version = "1"
//! section "foo" { screensize = "large" }
//! ```
//!
//! ```yaml
//! version: "1"
//! section:
//!   foo:
//!     screensize: large
//! ```
//!
//! Repeated sections are merged the way decoding applies them: later keys win.
use crate::document::{Document, ItemKind, Items, Literal, Node, SECTION, WHEN};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn from_document(document: &Document) -> Result<Self> {
        let mut root = IndexMap::new();

        for item in document.items() {
            match item.kind() {
                ItemKind::Assignment { key, value } => {
                    root.insert(key.to_string(), Value::from_node(key, &value)?);
                }
                ItemKind::Block {
                    keyword: keyword @ (SECTION | WHEN),
                    name,
                    items,
                    ..
                } => {
                    let blocks = root
                        .entry(keyword.to_string())
                        .or_insert_with(|| Value::Object(IndexMap::new()));
                    let Value::Object(blocks) = blocks else {
                        return Err(Error::Syntax {
                            pos: item.position(),
                            message: format!("`{keyword}` is used as a key and as a block"),
                        });
                    };

                    let block = blocks
                        .entry(name.to_string())
                        .or_insert_with(|| Value::Object(IndexMap::new()));
                    if let Value::Object(block) = block {
                        Self::merge_block(block, keyword, items)?;
                    }
                }
                ItemKind::Block { keyword, .. } => {
                    return Err(Error::Syntax {
                        pos: item.position(),
                        message: format!("unknown block type `{keyword}`"),
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

        Ok(Value::Object(root))
    }

    fn merge_block(block: &mut IndexMap<String, Value>, keyword: &str, items: Items<'_>) -> Result<()> {
        for item in items {
            let ItemKind::Assignment { key, value } = item.kind() else {
                return Err(Error::Syntax {
                    pos: item.position(),
                    message: format!("expected `key = value` inside {keyword} block"),
                });
            };

            block.insert(key.to_string(), Value::from_node(key, &value)?);
        }

        Ok(())
    }

    fn from_node(name: &str, node: &Node<'_>) -> Result<Self> {
        Value::try_from(node.literal()).map_err(|found| Error::TypeMismatch {
            pos: node.position().clone(),
            name: name.to_string(),
            index: None,
            expected: "literal",
            found: found.to_string(),
        })
    }

    /// Member of an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&Literal> for Value {
    /// description of the literal that has no value representation
    type Error = &'static str;

    fn try_from(value: &Literal) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            Literal::Bool(bool) => Value::Boolean(*bool),
            Literal::Int(int) => Value::Integer(*int),
            Literal::Float(float) => Value::Decimal(*float),
            Literal::String(text) | Literal::Heredoc(text) => text.as_str().into(),
            Literal::List(elements) => Value::Array(
                elements
                    .iter()
                    .map(Value::try_from)
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Literal::Other(kind) => return Err(*kind),
        })
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}
