//! # hconf - typed sections for hcl configuration files
//!
//! Bind configuration files to typed structs, read and write single values at runtime and patch one value of a file
//! without reformatting the rest of it.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hconf` works internally.
//!
//! ### Documents
//!
//! A configuration document is a restricted HCL body (see [document] for the exact shape):
//!
//! ```hcl
//! version = "1"
//!
//! section "foo" {
//!   screensize = "hello world"
//!   likes_cats = true
//!   friends    = ["alice", "bob"]
//! }
//!
//! when "os == linux" {
//!   screensize = "small"
//! }
//! ```
//!
//! Parsing and printing is done by [hcl_edit], which keeps every comment and whitespace of the source. The rest of the
//! crate sees a document through [Document], [Item], [ItemKind], [Node] and [Literal] only.
//!
//! ### Schemas
//!
//! A struct takes part in decoding by implementing [Schema], usually through [schema!]. The implementation lists
//! which fields are **values** (bound to `key = literal`) and which are **sections** (nested structs bound to
//! `section "name" { ... }`). Fields not listed are invisible.
//!
//! ```
//! use hconf::{BoolValue, StringSliceValue, StringValue};
//!
//! #[derive(Default)]
//! struct Foo {
//!     screensize: StringValue,
//!     likes_cats: BoolValue,
//!     friends: StringSliceValue,
//! }
//!
//! #[derive(Default)]
//! struct Conf {
//!     version: String,
//!     foo: Foo,
//!     bar: Foo,
//! }
//!
//! hconf::schema! {
//!     Foo {
//!         values { "screensize" => screensize, "likes_cats" => likes_cats, "friends" => friends }
//!     }
//! }
//!
//! hconf::schema! {
//!     Conf {
//!         values { "version" => version }
//!         sections { "foo" => foo, "bar" => bar }
//!     }
//! }
//!
//! let mut conf = Conf::default();
//! hconf::decode(&mut conf, "app.conf", br#"
//! section "foo" {
//!   likes_cats = true
//! }
//! "#)?;
//!
//! assert!(conf.foo.likes_cats.get());
//! assert_eq!(conf.foo.likes_cats.source().to_string(), "app.conf:3:16");
//! assert!(!conf.foo.screensize.is_set());
//! assert!(!conf.bar.likes_cats.is_set());
//! # Ok::<(), hconf::Error>(())
//! ```
//!
//! ### Holders
//!
//! Plain fields (`bool`, `i64`, `f64`, `String`, `Vec<String>`, `Option<_>`) only receive a value. The [Holder] types
//! ([StringValue], [BoolValue], [Int64Value], [StringSliceValue]) also remember whether a value was assigned at all
//! and where it came from. Only holders can be changed through [set].
//!
//! ### Decoding
//!
//! see [decode()]
//!
//! Items are processed in document order and every literal is converted according to the kind of field it is bound to
//! (strings that spell a bool or an integer are accepted for those kinds, numbers are accepted as strings). Decoding
//! stops at the first error. Errors carry `file:line:column` positions.
//!
//! `when` blocks are accepted and skipped. [predicate] holds the expression machinery that can evaluate their
//! conditions.
//!
//! ### Editing
//!
//! see [edit_and_save]
//!
//! An edit parses the file, replaces (or appends) exactly one `key = literal` pair inside the first matching section
//! and prints the document again. Untouched text stays byte for byte the same.
//!
//! ### Output
//!
//! [value::Value] renders a document as plain data which in turn gets serialized via [serde]. The `hconf` binary uses
//! it to print documents as yaml or json.
//!
pub mod access;
pub mod decode;
pub mod document;
pub mod edit;
pub mod error;
mod fixtures;
pub mod holder;
pub mod position;
pub mod predicate;
pub mod schema;
pub mod value;

pub use access::{get, set, Assignment};
pub use decode::{decode, decode_file};
pub use document::{Document, Item, ItemKind, Items, Literal, Node};
pub use edit::{edit_and_save, edit_document};
pub use error::{Error, Result};
pub use holder::{BoolValue, Holder, Int64Value, StringSliceValue, StringValue};
pub use position::Position;
pub use predicate::{parse_expression, Functions, Predicate, PredicateError};
pub use schema::{Bind, BindingsMut, BindingsRef, FieldRef, HolderMut, HolderRef, Schema, Slot};
