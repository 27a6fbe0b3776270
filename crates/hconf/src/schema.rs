//! schema resolution
//!
//! A destination struct describes which of its fields are bound to a document. Fields are either
//! - a **value**: a [Bind]able field addressed by a key (`key = literal`)
//! - a **section**: a nested [Schema] addressed by a section name (`section "name" { ... }`)
//!
//! [Schema] implementations hand out [Bindings]: one tag table for sections and one for values. Bindings borrow the
//! struct and are built fresh on every call, so there is nothing to invalidate.
//!
//! Implementations are usually generated with [crate::schema!]:
//!
//! ```
//! #[derive(Default)]
//! struct Foo {
//!     screensize: hconf::StringValue,
//!     likes_cats: hconf::BoolValue,
//! }
//!
//! #[derive(Default)]
//! struct Conf {
//!     version: String,
//!     foo: Foo,
//! }
//!
//! hconf::schema! {
//!     Foo {
//!         values { "screensize" => screensize, "likes_cats" => likes_cats }
//!     }
//! }
//!
//! hconf::schema! {
//!     Conf {
//!         values { "version" => version }
//!         sections { "foo" => foo }
//!     }
//! }
//! ```
use crate::error::{Error, Result};
use crate::holder::{BoolValue, Int64Value, StringSliceValue, StringValue};
use crate::position::Position;
use indexmap::IndexMap;

/// A struct whose fields can be bound to a document
pub trait Schema {
    fn bindings_mut(&mut self) -> Result<BindingsMut<'_>>;
    fn bindings(&self) -> Result<BindingsRef<'_>>;
}

/// Tag tables of one struct instance
#[derive(Debug)]
pub struct Bindings<S, V> {
    sections: IndexMap<&'static str, S>,
    values: IndexMap<&'static str, V>,
}

pub type BindingsMut<'a> = Bindings<&'a mut dyn Schema, Slot<'a>>;
pub type BindingsRef<'a> = Bindings<&'a dyn Schema, FieldRef<'a>>;

impl<S, V> Default for Bindings<S, V> {
    fn default() -> Self {
        Self {
            sections: Default::default(),
            values: Default::default(),
        }
    }
}

impl<S, V> Bindings<S, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, tag: &'static str, section: S) -> Result<Self> {
        self.check_tag(tag)?;
        self.sections.insert(tag, section);
        Ok(self)
    }

    pub fn with_value(mut self, tag: &'static str, value: V) -> Result<Self> {
        self.check_tag(tag)?;
        self.values.insert(tag, value);
        Ok(self)
    }

    fn check_tag(&self, tag: &str) -> Result<()> {
        if tag.is_empty() {
            return Err(Error::Schema("empty tag".into()));
        }

        if self.sections.contains_key(tag) || self.values.contains_key(tag) {
            return Err(Error::Schema(format!("duplicate tag: {tag}")));
        }

        Ok(())
    }

    pub fn section(&self, tag: &str) -> Option<&S> {
        self.sections.get(tag)
    }

    pub fn section_mut(&mut self, tag: &str) -> Option<&mut S> {
        self.sections.get_mut(tag)
    }

    pub fn value(&self, tag: &str) -> Option<&V> {
        self.values.get(tag)
    }

    pub fn value_mut(&mut self, tag: &str) -> Option<&mut V> {
        self.values.get_mut(tag)
    }

    /// Take ownership of a single value binding, dropping the rest
    pub fn into_value(mut self, tag: &str) -> Option<V> {
        self.values.swap_remove(tag)
    }

    pub fn section_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections.keys().copied()
    }

    pub fn value_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

/// A field that can receive a decoded literal
pub trait Bind {
    fn slot(&mut self) -> Slot<'_>;
    fn field(&self) -> FieldRef<'_>;
}

/// Mutable access to a bound field, tagged by destination kind
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Float(&'a mut f64),
    String(&'a mut String),
    StringList(&'a mut Vec<String>),
    Optional(&'a mut dyn OptionalSlot),
    Holder(HolderMut<'a>),
}

pub enum HolderMut<'a> {
    String(&'a mut StringValue),
    Bool(&'a mut BoolValue),
    Int64(&'a mut Int64Value),
    StringSlice(&'a mut StringSliceValue),
}

/// Shared access to a bound field, tagged by destination kind
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef<'a> {
    Bool(&'a bool),
    Int(&'a i64),
    Float(&'a f64),
    String(&'a String),
    StringList(&'a [String]),
    Optional(Option<Box<FieldRef<'a>>>),
    Holder(HolderRef<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HolderRef<'a> {
    String(&'a StringValue),
    Bool(&'a BoolValue),
    Int64(&'a Int64Value),
    StringSlice(&'a StringSliceValue),
}

/// An `Option<T>` field
///
/// Decoding fills a fresh `T` and only stores it once that succeeded.
pub trait OptionalSlot {
    fn fill(&mut self, decode: &mut dyn FnMut(&mut Slot<'_>) -> Result<()>) -> Result<()>;
    fn kind(&self) -> &'static str;
}

impl<T: Bind + Default> OptionalSlot for Option<T> {
    fn fill(&mut self, decode: &mut dyn FnMut(&mut Slot<'_>) -> Result<()>) -> Result<()> {
        let mut value = T::default();
        decode(&mut value.slot())?;
        *self = Some(value);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "Option"
    }
}

impl Slot<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::Int(_) => "i64",
            Slot::Float(_) => "f64",
            Slot::String(_) => "String",
            Slot::StringList(_) => "Vec<String>",
            Slot::Optional(optional) => optional.kind(),
            Slot::Holder(holder) => holder.kind(),
        }
    }
}

impl HolderMut<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            HolderMut::String(_) => "StringValue",
            HolderMut::Bool(_) => "BoolValue",
            HolderMut::Int64(_) => "Int64Value",
            HolderMut::StringSlice(_) => "StringSliceValue",
        }
    }

    pub fn set_source(&mut self, source: Position) {
        match self {
            HolderMut::String(holder) => holder.set_source(source),
            HolderMut::Bool(holder) => holder.set_source(source),
            HolderMut::Int64(holder) => holder.set_source(source),
            HolderMut::StringSlice(holder) => holder.set_source(source),
        }
    }
}

impl<'a> FieldRef<'a> {
    /// Recorded source position; `None` for fields that do not track one
    pub fn source(&self) -> Option<&'a Position> {
        match self {
            FieldRef::Holder(holder) => Some(holder.source()),
            FieldRef::Optional(Some(inner)) => inner.source(),
            _ => None,
        }
    }
}

impl<'a> HolderRef<'a> {
    pub fn source(&self) -> &'a Position {
        match *self {
            HolderRef::String(holder) => holder.source(),
            HolderRef::Bool(holder) => holder.source(),
            HolderRef::Int64(holder) => holder.source(),
            HolderRef::StringSlice(holder) => holder.source(),
        }
    }

    pub fn is_set(&self) -> bool {
        match *self {
            HolderRef::String(holder) => holder.is_set(),
            HolderRef::Bool(holder) => holder.is_set(),
            HolderRef::Int64(holder) => holder.is_set(),
            HolderRef::StringSlice(holder) => holder.is_set(),
        }
    }
}

macro_rules! bind_primitive {
    ($ty:ty => $variant:ident) => {
        impl Bind for $ty {
            fn slot(&mut self) -> Slot<'_> {
                Slot::$variant(self)
            }

            fn field(&self) -> FieldRef<'_> {
                FieldRef::$variant(self)
            }
        }
    };
}

bind_primitive!(bool => Bool);
bind_primitive!(i64 => Int);
bind_primitive!(f64 => Float);
bind_primitive!(String => String);
bind_primitive!(Vec<String> => StringList);

macro_rules! bind_holder {
    ($ty:ty => $variant:ident) => {
        impl Bind for $ty {
            fn slot(&mut self) -> Slot<'_> {
                Slot::Holder(HolderMut::$variant(self))
            }

            fn field(&self) -> FieldRef<'_> {
                FieldRef::Holder(HolderRef::$variant(self))
            }
        }
    };
}

bind_holder!(StringValue => String);
bind_holder!(BoolValue => Bool);
bind_holder!(Int64Value => Int64);
bind_holder!(StringSliceValue => StringSlice);

impl<T: Bind + Default> Bind for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Optional(self)
    }

    fn field(&self) -> FieldRef<'_> {
        FieldRef::Optional(self.as_ref().map(|value| Box::new(value.field())))
    }
}

/// Implement [Schema] for a struct by listing its tagged fields
///
/// ```
/// # #[derive(Default)] struct Service { name: hconf::StringValue, port: hconf::Int64Value }
/// # #[derive(Default)] struct Conf { version: String, web: Service, db: Service }
/// hconf::schema! {
///     Service {
///         values { "name" => name, "port" => port }
///     }
/// }
///
/// hconf::schema! {
///     Conf {
///         values { "version" => version }
///         sections { "web" => web, "db" => db }
///     }
/// }
/// ```
#[macro_export]
macro_rules! schema {
    {
        $ty:ty {
            $(values { $($value_tag:literal => $value_field:ident),* $(,)? })?
            $(sections { $($section_tag:literal => $section_field:ident),* $(,)? })?
        }
    } => {
        impl $crate::Schema for $ty {
            #[allow(unused_mut)]
            fn bindings_mut(&mut self) -> $crate::Result<$crate::BindingsMut<'_>> {
                let mut bindings = $crate::BindingsMut::new();
                $($(
                    bindings = bindings.with_value($value_tag, $crate::Bind::slot(&mut self.$value_field))?;
                )*)?
                $($(
                    bindings = bindings.with_section($section_tag, &mut self.$section_field)?;
                )*)?
                Ok(bindings)
            }

            #[allow(unused_mut)]
            fn bindings(&self) -> $crate::Result<$crate::BindingsRef<'_>> {
                let mut bindings = $crate::BindingsRef::new();
                $($(
                    bindings = bindings.with_value($value_tag, $crate::Bind::field(&self.$value_field))?;
                )*)?
                $($(
                    bindings = bindings.with_section($section_tag, &self.$section_field)?;
                )*)?
                Ok(bindings)
            }
        }
    };
}
