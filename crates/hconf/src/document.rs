//! document model
//!
//! A configuration document is HCL restricted to three kinds of items:
//!
//! ```hcl
//! version = "1"           # a top level key: one label
//!
//! section "foo" {         # a section: the `section` keyword plus a quoted name
//!   screensize = "large"  # ...containing only `key = literal` items
//! }
//!
//! when "os == linux" {    # a conditional block: parsed, never evaluated
//!   screensize = "small"
//! }
//! ```
//!
//! [Document] wraps the [hcl_edit] body and exposes it as [Item]s, [Node]s and [Literal]s. Decoding and editing only
//! ever look at those, [hcl_edit] types do not leave this module.
//!
//! Because [hcl_edit] keeps whitespace and comments around every node, printing a [Document] after
//! [Document::assign] reproduces all untouched text verbatim.
use crate::error::{Error, Result};
use crate::position::{LineIndex, Position};
use hcl_edit::expr::{Array, Expression};
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body, Structure};
use hcl_edit::{Decorate, Decorated, Formatted, Ident, Span};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Keyword of a section block
pub const SECTION: &str = "section";
/// Keyword of a conditional block
pub const WHEN: &str = "when";

#[derive(Debug, Clone)]
pub struct Document {
    body: Body,
    source: String,
    lines: LineIndex,
    filename: Option<PathBuf>,
}

impl Document {
    pub fn parse(source: &str, filename: Option<&Path>) -> Result<Self> {
        let body = hcl_edit::parser::parse_body(source).map_err(|source| Error::Parse {
            filename: filename.map(Path::to_path_buf),
            source,
        })?;

        Ok(Self {
            body,
            source: source.to_string(),
            lines: LineIndex::new(source),
            filename: filename.map(Path::to_path_buf),
        })
    }

    pub fn from_bytes(data: &[u8], filename: Option<&Path>) -> Result<Self> {
        match std::str::from_utf8(data) {
            Ok(source) => Self::parse(source, filename),
            Err(err) => {
                let valid = std::str::from_utf8(&data[..err.valid_up_to()]).unwrap_or_default();
                Err(Error::Syntax {
                    pos: LineIndex::new(valid).position(err.valid_up_to(), filename),
                    message: "document is not valid utf-8".into(),
                })
            }
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Top level items in document order
    pub fn items(&self) -> Items<'_> {
        Items::new(self, &self.body)
    }

    fn position(&self, span: Option<Range<usize>>) -> Position {
        self.lines.span_position(span, self.filename.as_deref())
    }

    /// Set `key` inside the first section named `section`
    ///
    /// - an existing key keeps its place and surrounding whitespace, only the value is replaced
    /// - a missing key is appended to the section
    /// - a missing section is appended to the document
    ///
    /// Later sections with the same name are never looked at.
    pub fn assign(&mut self, section: &str, key: &str, literal: &Literal) -> Result<Assigned> {
        let lines = &self.lines;
        let filename = self.filename.as_deref();
        let position = |span: Option<Range<usize>>| lines.span_position(span, filename);

        let ident = Ident::try_new(key).map_err(|_| Error::Syntax {
            pos: position(None),
            message: format!("`{key}` is not a valid key"),
        })?;
        let value = literal.to_expression().ok_or_else(|| Error::Syntax {
            pos: position(None),
            message: format!("{} cannot be written to a document", literal.describe()),
        })?;

        for mut structure in self.body.iter_mut() {
            let Some(block) = structure.as_block_mut() else {
                continue;
            };

            if block.ident.value().as_str() != SECTION {
                continue;
            }

            let name = match block.labels.as_slice() {
                [BlockLabel::String(name)] => name.value().as_str(),
                [BlockLabel::Ident(_)] => {
                    return Err(Error::Syntax {
                        pos: position(block.span()),
                        message: "section name must be a quoted string".into(),
                    })
                }
                _ => continue,
            };

            if name != section {
                continue;
            }

            for mut nested in block.body.iter_mut() {
                if let Some(nested) = nested.as_block() {
                    return Err(Error::Syntax {
                        pos: position(nested.span()),
                        message: format!("expected flat keys under section {section}"),
                    });
                }

                let Some(mut attribute) = nested.as_attribute_mut() else {
                    continue;
                };

                if attribute.has_key(key) {
                    let decor = attribute.value.decor().clone();
                    *attribute.value_mut() = value;
                    *attribute.value_mut().decor_mut() = decor;
                    return Ok(Assigned::Replaced);
                }
            }

            if block.body.prefer_oneline() {
                expand_oneline(&mut block.body);
            }

            let mut attribute = Attribute::new(Decorated::new(ident), value);
            attribute.decor_mut().set_prefix(indentation(&block.body));
            block.body.push(attribute);
            return Ok(Assigned::Appended);
        }

        let mut attribute = Attribute::new(Decorated::new(ident), value);
        attribute.decor_mut().set_prefix(INDENT);

        let mut block = Block::new(Decorated::new(Ident::new(SECTION)));
        block
            .labels
            .push(BlockLabel::String(Decorated::new(section.to_string())));
        block.body.push(attribute);
        if !self.body.is_empty() {
            block.decor_mut().set_prefix("\n");
        }
        self.body.push(block);

        Ok(Assigned::Created)
    }
}

const INDENT: &str = "  ";

/// Leading whitespace of the last key in `body`
fn indentation(body: &Body) -> String {
    body.iter()
        .filter_map(Structure::as_attribute)
        .last()
        .and_then(|attribute| attribute.decor().prefix())
        .and_then(|prefix| prefix.rsplit('\n').next())
        .filter(|indent| indent.chars().all(|c| c == ' ' || c == '\t'))
        .unwrap_or(INDENT)
        .to_string()
}

/// Turn `{ a = 1 }` into one key per line so more keys can follow
fn expand_oneline(body: &mut Body) {
    body.set_prefer_oneline(false);
    body.decor_mut().set_suffix("");

    for mut structure in body.iter_mut() {
        let decor = structure.decor_mut();
        decor.set_prefix(INDENT);
        decor.set_suffix("");
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.body)
    }
}

/// What [Document::assign] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assigned {
    /// replaced the value of an existing key
    Replaced,
    /// appended the key to an existing section
    Appended,
    /// appended a new section holding the key
    Created,
}

/// Iterator over the items of a document or block body
#[derive(Debug)]
pub struct Items<'a> {
    inner: std::vec::IntoIter<Item<'a>>,
}

impl<'a> Items<'a> {
    fn new(document: &'a Document, body: &'a Body) -> Self {
        let items: Vec<_> = body
            .iter()
            .map(|structure| Item::new(document, structure))
            .collect();

        Self {
            inner: items.into_iter(),
        }
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[derive(derive_new::new, Debug, Clone, Copy)]
pub struct Item<'a> {
    document: &'a Document,
    structure: &'a Structure,
}

/// An item, classified by its labels
#[derive(Debug)]
pub enum ItemKind<'a> {
    /// `key = literal`
    Assignment { key: &'a str, value: Node<'a> },
    /// `keyword "name" { ... }`
    Block {
        keyword: &'a str,
        name: &'a str,
        /// where the quoted name starts
        name_pos: Position,
        items: Items<'a>,
    },
    /// a block without exactly one quoted label
    Malformed(String),
}

impl<'a> Item<'a> {
    pub fn position(&self) -> Position {
        let span = match self.structure {
            Structure::Attribute(attribute) => attribute.span(),
            Structure::Block(block) => block.span(),
        };

        self.document.position(span)
    }

    pub fn kind(&self) -> ItemKind<'a> {
        let block = match self.structure {
            Structure::Attribute(attribute) => {
                return ItemKind::Assignment {
                    key: attribute.key.value().as_str(),
                    value: Node::new(self.document, &attribute.value),
                }
            }
            Structure::Block(block) => block,
        };

        let keyword = block.ident.value().as_str();
        match block.labels.as_slice() {
            [BlockLabel::String(name)] => ItemKind::Block {
                keyword,
                name: name.value().as_str(),
                name_pos: self.document.position(name.span()),
                items: Items::new(self.document, &block.body),
            },
            [BlockLabel::Ident(name)] => ItemKind::Malformed(format!(
                "{keyword} name `{}` must be a quoted string",
                name.value().as_str()
            )),
            [] => ItemKind::Malformed(format!(
                "expected `{keyword} = <value>` or `{keyword} \"<name>\" {{ ... }}`"
            )),
            labels => ItemKind::Malformed(format!(
                "{keyword} block has {} labels, expected one",
                labels.len()
            )),
        }
    }
}

/// The value side of an assignment
#[derive(Debug, Clone)]
pub struct Node<'a> {
    literal: Literal,
    position: Position,
    text: &'a str,
}

impl<'a> Node<'a> {
    fn new(document: &'a Document, expression: &'a Expression) -> Self {
        let span = expression.span();
        let text = span
            .clone()
            .and_then(|span| document.source.get(span))
            .map(str::trim)
            .unwrap_or_default();

        Self {
            literal: hcl::Expression::from(expression.clone()).into(),
            position: document.position(span),
            text,
        }
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The value exactly as written in the document (empty when unknown)
    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// A configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Heredoc(String),
    List(Vec<Literal>),
    /// anything else HCL allows on the right hand side (objects, function calls, ...)
    Other(&'static str),
}

impl Literal {
    /// Short description for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "integer",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::Heredoc(_) => "heredoc",
            Literal::List(_) => "list",
            Literal::Other(kind) => *kind,
        }
    }

    fn to_expression(&self) -> Option<Expression> {
        let expression = match self {
            Literal::Bool(value) => Expression::Bool(Decorated::new(*value)),
            Literal::Int(value) => Expression::Number(Formatted::new(hcl_edit::Number::from(*value))),
            Literal::Float(value) => {
                Expression::Number(Formatted::new(hcl_edit::Number::from_f64(*value)?))
            }
            Literal::String(value) | Literal::Heredoc(value) => {
                Expression::String(Decorated::new(value.clone()))
            }
            Literal::List(values) => {
                let mut array = Array::new();
                for value in values {
                    array.push(value.to_expression()?);
                }
                Expression::Array(array)
            }
            Literal::Other(_) => return None,
        };

        Some(expression)
    }
}

impl From<hcl::Expression> for Literal {
    fn from(value: hcl::Expression) -> Self {
        use hcl::Expression;

        match value {
            Expression::Bool(value) => Literal::Bool(value),
            Expression::Number(number) => number.into(),
            Expression::String(value) => Literal::String(value),
            Expression::TemplateExpr(template) => match *template {
                hcl::TemplateExpr::QuotedString(value) => Literal::String(value),
                hcl::TemplateExpr::Heredoc(heredoc) => Literal::Heredoc(heredoc.template),
            },
            Expression::Array(values) => {
                Literal::List(values.into_iter().map(Literal::from).collect())
            }
            Expression::Operation(operation) => {
                negated(*operation).unwrap_or(Literal::Other("expression"))
            }
            Expression::Null => Literal::Other("null"),
            Expression::Object(_) => Literal::Other("object"),
            _ => Literal::Other("expression"),
        }
    }
}

impl From<hcl::Number> for Literal {
    fn from(number: hcl::Number) -> Self {
        if !number.is_f64() {
            if let Some(int) = number.as_i64() {
                return Literal::Int(int);
            }
        }

        Literal::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

/// `-<number>`, which HCL parses as an operation
fn negated(operation: hcl::Operation) -> Option<Literal> {
    let hcl::Operation::Unary(unary) = operation else {
        return None;
    };

    if unary.operator != hcl::expr::UnaryOperator::Neg {
        return None;
    }

    let hcl::Expression::Number(number) = unary.expr else {
        return None;
    };

    match Literal::from(number) {
        Literal::Int(int) => int.checked_neg().map(Literal::Int),
        Literal::Float(float) => Some(Literal::Float(-float)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(source: &str) -> Document {
        Document::parse(source, None).expect("document must parse")
    }

    #[test]
    fn item_kinds() {
        let doc = document(
            r#"
version = "1"
section "foo" {
  a = 1
}
when "x == 1" {}
section bare {}
section {}
"#,
        );

        let kinds: Vec<_> = doc.items().map(|item| item.kind()).collect();
        assert_eq!(kinds.len(), 5);

        assert!(matches!(&kinds[0], ItemKind::Assignment { key: "version", .. }));
        assert!(matches!(&kinds[1], ItemKind::Block { keyword: "section", name: "foo", .. }));
        assert!(matches!(&kinds[2], ItemKind::Block { keyword: "when", name: "x == 1", .. }));
        assert!(matches!(&kinds[3], ItemKind::Malformed(message) if message.contains("quoted")));
        assert!(matches!(&kinds[4], ItemKind::Malformed(_)));
    }

    #[test]
    fn item_positions() {
        let doc = document("a = 1\n\nsection \"foo\" {\n  b = [\"x\"]\n}\n");
        let items: Vec<_> = doc.items().collect();

        assert_eq!(items[0].position().line, 1);
        assert_eq!(items[1].position().line, 3);

        let ItemKind::Block { mut items, name_pos, .. } = items[1].kind() else {
            panic!("expected a block");
        };
        assert_eq!((name_pos.line, name_pos.column), (3, 9));
        let nested = items.next().expect("one nested item");
        assert_eq!(nested.position().line, 4);

        let ItemKind::Assignment { value, .. } = nested.kind() else {
            panic!("expected an assignment");
        };
        assert_eq!(value.position().line, 4);
        assert_eq!(value.text(), r#"["x"]"#);
    }

    #[test]
    fn literals() {
        let doc = document(
            r#"
s = "text"
i = 42
f = 1.5
n = -3
b = false
l = ["a", "b"]
o = { a = 1 }
"#,
        );

        let literals: Vec<_> = doc
            .items()
            .map(|item| match item.kind() {
                ItemKind::Assignment { value, .. } => value.literal().clone(),
                other => panic!("unexpected item {other:?}"),
            })
            .collect();

        assert_eq!(
            literals,
            vec![
                Literal::String("text".into()),
                Literal::Int(42),
                Literal::Float(1.5),
                Literal::Int(-3),
                Literal::Bool(false),
                Literal::List(vec![Literal::String("a".into()), Literal::String("b".into())]),
                Literal::Other("object"),
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_a_syntax_error() {
        let err = Document::from_bytes(b"a = \"\xff\"", Some(Path::new("bad.conf"))).expect_err("must error");
        assert!(matches!(err, Error::Syntax { .. }));
        assert_eq!(err.position().map(|pos| pos.column), Some(6));
    }

    #[test]
    fn replace_keeps_everything_else() {
        let mut doc = document(
            r#"# settings
section "foo" {
  screensize = "hello world" # big
  likes_cats = true
}
"#,
        );

        let assigned = doc
            .assign("foo", "screensize", &Literal::String("giant".into()))
            .unwrap();
        assert_eq!(assigned, Assigned::Replaced);

        insta::assert_snapshot!(doc.to_string(), @r#"
        # settings
        section "foo" {
          screensize = "giant" # big
          likes_cats = true
        }
        "#);
    }

    #[test]
    fn append_to_first_matching_section_only() {
        let mut doc = document("section \"foo\" {\n  a = 1\n}\nsection \"foo\" {\n  b = 2\n}\n");

        let assigned = doc.assign("foo", "c", &Literal::Int(3)).unwrap();
        assert_eq!(assigned, Assigned::Appended);

        let reparsed = document(&doc.to_string());
        let counts: Vec<_> = reparsed
            .items()
            .map(|item| match item.kind() {
                ItemKind::Block { items, .. } => items.count(),
                other => panic!("unexpected item {other:?}"),
            })
            .collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn create_missing_section() {
        let mut doc = document("version = \"1\"\n");

        let list = Literal::List(vec![Literal::String("marco".into())]);
        let assigned = doc.assign("bar", "friends", &list).unwrap();
        assert_eq!(assigned, Assigned::Created);

        let reparsed = document(&doc.to_string());
        let items: Vec<_> = reparsed.items().collect();
        assert_eq!(items.len(), 2);

        let ItemKind::Block { keyword, name, mut items, .. } = items[1].kind() else {
            panic!("expected a block");
        };
        assert_eq!((keyword, name), ("section", "bar"));

        let ItemKind::Assignment { key, value } = items.next().unwrap().kind() else {
            panic!("expected an assignment");
        };
        assert_eq!(key, "friends");
        assert_eq!(value.literal(), &list);
    }

    #[test]
    fn nested_blocks_are_rejected_when_editing() {
        let mut doc = document("section \"foo\" {\n  inner {}\n}\n");

        let err = doc
            .assign("foo", "screensize", &Literal::String("x".into()))
            .expect_err("must error");
        assert!(matches!(err, Error::Syntax { message, .. } if message.contains("flat keys")));
    }

    #[test]
    fn invalid_keys_are_rejected_when_editing() {
        let mut doc = document("");
        let err = doc
            .assign("foo", "not a key", &Literal::Bool(true))
            .expect_err("must error");
        assert!(matches!(err, Error::Syntax { .. }));
    }
}
