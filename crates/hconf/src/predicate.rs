//! condition expressions
//!
//! Turns an expression such as
//!
//! ```hcl
//! cpus() >= 4 && (role() == "db" || !(load() > 0.75))
//! ```
//!
//! into a [Predicate] over some context type `T`. The grammar is the HCL expression grammar; this module only gives
//! meaning to:
//! - the boolean operators `&&`, `||` and `!`
//! - comparisons `==`, `!=`, `<`, `<=`, `>`, `>=` with a function call on the left and a literal on the right
//! - function calls, looked up in a [Functions] registry
//!
//! Integers and floats support every comparison, strings only `==` and `!=`. The literal must be of the kind the
//! function returns, an integer is not accepted where a float is expected.
//!
//! `when` blocks are not evaluated by the decoder, this module is the building block for doing so.
use crate::document::Literal;
use hcl::expr::{BinaryOp, BinaryOperator, UnaryOperator};
use hcl::{Expression, Operation};
use indexmap::IndexMap;
use std::cmp::Ordering;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool>;

/// A registered function, called once at parse time with the literal arguments it was given
pub type Function<T> = Box<dyn Fn(&[Literal]) -> Result<Operand<T>, PredicateError>>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    #[error("invalid expression: {0}")]
    Parse(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}: {message}")]
    InvalidArguments { function: String, message: String },

    #[error("expected {expected}, got {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// the left side of a comparison is not a function call
    #[error("expected a function call, got {0}")]
    InvalidOperand(&'static str),

    #[error("expected predicate, got {0}")]
    NotAPredicate(&'static str),
}

/// The value a function extracts from the context
pub enum Operand<T> {
    Int(Box<dyn Fn(&T) -> i64>),
    Float(Box<dyn Fn(&T) -> f64>),
    String(Box<dyn Fn(&T) -> String>),
}

impl<T> Operand<T> {
    pub fn int(mapper: impl Fn(&T) -> i64 + 'static) -> Self {
        Operand::Int(Box::new(mapper))
    }

    pub fn float(mapper: impl Fn(&T) -> f64 + 'static) -> Self {
        Operand::Float(Box::new(mapper))
    }

    pub fn string(mapper: impl Fn(&T) -> String + 'static) -> Self {
        Operand::String(Box::new(mapper))
    }

    fn kind(&self) -> &'static str {
        match self {
            Operand::Int(_) => "integer",
            Operand::Float(_) => "float",
            Operand::String(_) => "string",
        }
    }
}

/// Function registry
pub struct Functions<T> {
    functions: IndexMap<String, Function<T>>,
}

impl<T> Default for Functions<T> {
    fn default() -> Self {
        Self {
            functions: Default::default(),
        }
    }
}

impl<T: 'static> Functions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in functions
    ///
    /// - `local_exec(text)`: evaluates to `text`
    pub fn standard() -> Self {
        let mut functions = Self::new();
        functions.register("local_exec", |args: &[Literal]| match args {
            [Literal::String(text)] => {
                let text = text.clone();
                Ok(Operand::string(move |_: &T| text.clone()))
            }
            _ => Err(PredicateError::InvalidArguments {
                function: "local_exec".into(),
                message: "expected a single string argument".into(),
            }),
        });
        functions
    }

    /// Add or replace a function
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: impl Fn(&[Literal]) -> Result<Operand<T>, PredicateError> + 'static,
    ) -> &mut Self {
        self.functions.insert(name.into(), Box::new(function));
        self
    }

    fn call(&self, name: &str, args: &[Literal]) -> Result<Operand<T>, PredicateError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| PredicateError::UnknownFunction(name.to_string()))?;
        function(args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl Comparison {
    fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            Comparison::Eq => ordering == Some(Ordering::Equal),
            Comparison::NotEq => ordering != Some(Ordering::Equal),
            Comparison::Less => ordering == Some(Ordering::Less),
            Comparison::LessEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Comparison::Greater => ordering == Some(Ordering::Greater),
            Comparison::GreaterEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }

    fn from_operator(operator: &BinaryOperator) -> Option<Self> {
        Some(match operator {
            BinaryOperator::Eq => Comparison::Eq,
            BinaryOperator::NotEq => Comparison::NotEq,
            BinaryOperator::Less => Comparison::Less,
            BinaryOperator::LessEq => Comparison::LessEq,
            BinaryOperator::Greater => Comparison::Greater,
            BinaryOperator::GreaterEq => Comparison::GreaterEq,
            _ => return None,
        })
    }
}

pub fn and<T: 'static>(predicates: Vec<Predicate<T>>) -> Predicate<T> {
    Box::new(move |context: &T| predicates.iter().all(|predicate| predicate(context)))
}

pub fn or<T: 'static>(predicates: Vec<Predicate<T>>) -> Predicate<T> {
    Box::new(move |context: &T| predicates.iter().any(|predicate| predicate(context)))
}

pub fn not<T: 'static>(predicate: Predicate<T>) -> Predicate<T> {
    Box::new(move |context: &T| !predicate(context))
}

/// Compare the value of `operand` against `constant`
pub fn compare<T: 'static>(
    comparison: Comparison,
    operand: Operand<T>,
    constant: &Literal,
) -> Result<Predicate<T>, PredicateError> {
    let mismatch = |operand: &Operand<T>| PredicateError::KindMismatch {
        expected: operand.kind(),
        found: constant.describe(),
    };

    match (operand, constant) {
        (Operand::Int(mapper), Literal::Int(constant)) => {
            let constant = *constant;
            Ok(Box::new(move |context: &T| {
                comparison.holds(mapper(context).partial_cmp(&constant))
            }))
        }
        (Operand::Float(mapper), Literal::Float(constant)) => {
            let constant = *constant;
            Ok(Box::new(move |context: &T| {
                comparison.holds(mapper(context).partial_cmp(&constant))
            }))
        }
        (Operand::String(mapper), Literal::String(constant)) => match comparison {
            Comparison::Eq | Comparison::NotEq => {
                let constant = constant.clone();
                Ok(Box::new(move |context: &T| {
                    comparison.holds(Some(mapper(context).cmp(&constant)))
                }))
            }
            other => Err(PredicateError::UnsupportedOperator(format!(
                "{other:?} on strings"
            ))),
        },
        (operand, _) => Err(mismatch(&operand)),
    }
}

/// Parse `text` into a predicate over `T`
pub fn parse_expression<T: 'static>(
    text: &str,
    functions: &Functions<T>,
) -> Result<Predicate<T>, PredicateError> {
    let expression = hcl_edit::parser::parse_expr(text)
        .map_err(|err| PredicateError::Parse(err.to_string()))?;

    build(associate(Expression::from(expression)), functions)
}

/// Regroup a chain of binary operations by operator precedence
///
/// The parser reads `a op b op c` as `a op (b op c)` whatever the operators are. Parenthesized expressions are left
/// as they are, they get regrouped when [build] descends into them.
fn associate(expression: Expression) -> Expression {
    let binary = match expression {
        Expression::Operation(operation) => match *operation {
            Operation::Binary(binary) => binary,
            unary => return Expression::from(unary),
        },
        other => return other,
    };

    let first = binary.lhs_expr;
    let mut rest = vec![];
    let mut next = (binary.operator, binary.rhs_expr);
    loop {
        match next {
            (operator, Expression::Operation(operation)) => match *operation {
                Operation::Binary(binary) => {
                    rest.push((operator, binary.lhs_expr));
                    next = (binary.operator, binary.rhs_expr);
                }
                unary => {
                    rest.push((operator, Expression::from(unary)));
                    break;
                }
            },
            last => {
                rest.push(last);
                break;
            }
        }
    }

    regroup(first, rest)
}

fn regroup(first: Expression, mut rest: Vec<(BinaryOperator, Expression)>) -> Expression {
    // operators of equal precedence are left associative: split at the rightmost one
    let Some(split) = (0..rest.len())
        .rev()
        .min_by_key(|&index| rest[index].0.precedence())
    else {
        return first;
    };

    let mut right = rest.split_off(split);
    let (operator, rhs_first) = right.remove(0);

    Expression::from(Operation::Binary(BinaryOp::new(
        regroup(first, rest),
        operator,
        regroup(rhs_first, right),
    )))
}

fn build<T: 'static>(
    expression: Expression,
    functions: &Functions<T>,
) -> Result<Predicate<T>, PredicateError> {
    let operation = match expression {
        Expression::Parenthesis(inner) => return build(associate(*inner), functions),
        Expression::Operation(operation) => *operation,
        other => return Err(PredicateError::NotAPredicate(Literal::from(other).describe())),
    };

    match operation {
        Operation::Unary(unary) => match unary.operator {
            UnaryOperator::Not => Ok(not(build(unary.expr, functions)?)),
            other => Err(PredicateError::UnsupportedOperator(format!("{other:?}"))),
        },
        Operation::Binary(binary) => match binary.operator {
            BinaryOperator::And => Ok(and(vec![
                build(binary.lhs_expr, functions)?,
                build(binary.rhs_expr, functions)?,
            ])),
            BinaryOperator::Or => Ok(or(vec![
                build(binary.lhs_expr, functions)?,
                build(binary.rhs_expr, functions)?,
            ])),
            operator => {
                let comparison = Comparison::from_operator(&operator)
                    .ok_or_else(|| PredicateError::UnsupportedOperator(format!("{operator:?}")))?;
                let operand = operand(binary.lhs_expr, functions)?;
                compare(comparison, operand, &Literal::from(binary.rhs_expr))
            }
        },
    }
}

fn operand<T: 'static>(
    expression: Expression,
    functions: &Functions<T>,
) -> Result<Operand<T>, PredicateError> {
    match expression {
        Expression::Parenthesis(inner) => operand(*inner, functions),
        Expression::FuncCall(call) => {
            let name = call.name.to_string();
            let args: Vec<Literal> = call.args.into_iter().map(Literal::from).collect();
            tracing::trace!(function = name, ?args, "resolve function");
            functions.call(&name, &args)
        }
        other => Err(PredicateError::InvalidOperand(Literal::from(other).describe())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Host {
        cpus: i64,
        load: f64,
        role: String,
    }

    fn functions() -> Functions<Host> {
        let mut functions = Functions::standard();
        functions
            .register("cpus", |_: &[Literal]| Ok(Operand::int(|host: &Host| host.cpus)))
            .register("load", |_: &[Literal]| Ok(Operand::float(|host: &Host| host.load)))
            .register("role", |_: &[Literal]| {
                Ok(Operand::string(|host: &Host| host.role.clone()))
            });
        functions
    }

    fn evaluate(text: &str, host: &Host) -> bool {
        let predicate = parse_expression(text, &functions()).expect(text);
        predicate(host)
    }

    fn error(text: &str) -> PredicateError {
        match parse_expression(text, &functions()) {
            Ok(_) => panic!("{text} must not parse"),
            Err(err) => err,
        }
    }

    fn db() -> Host {
        Host {
            cpus: 8,
            load: 0.5,
            role: "db".into(),
        }
    }

    #[test]
    fn int_comparisons() {
        let host = db();
        assert!(evaluate("cpus() == 8", &host));
        assert!(evaluate("cpus() != 4", &host));
        assert!(evaluate("cpus() > 4", &host));
        assert!(evaluate("cpus() >= 8", &host));
        assert!(evaluate("cpus() <= 8", &host));
        assert!(!evaluate("cpus() < 8", &host));
        assert!(evaluate("cpus() > -1", &host));
    }

    #[test]
    fn float_comparisons() {
        let host = db();
        assert!(evaluate("load() < 0.75", &host));
        assert!(evaluate("load() == 0.5", &host));
        assert!(!evaluate("load() > 0.5", &host));
    }

    #[test]
    fn string_comparisons() {
        let host = db();
        assert!(evaluate("role() == \"db\"", &host));
        assert!(evaluate("role() != \"web\"", &host));
        assert!(evaluate("local_exec(\"x\") == \"x\"", &host));
    }

    #[test]
    fn combinators() {
        let host = db();
        assert!(evaluate("cpus() >= 4 && role() == \"db\"", &host));
        assert!(!evaluate("cpus() >= 16 && role() == \"db\"", &host));
        assert!(evaluate("cpus() >= 16 || role() == \"db\"", &host));
        assert!(evaluate("!(load() > 0.75)", &host));
        assert!(evaluate(
            "cpus() >= 4 && (role() == \"web\" || !(load() > 0.75))",
            &host
        ));
    }

    #[test]
    fn precedence() {
        let host = db();
        assert!(evaluate("cpus() >= 4 && cpus() < 10", &host));
        assert!(evaluate("role() == \"web\" || role() == \"db\"", &host));

        // `&&` binds tighter than `||` on either side
        assert!(evaluate("cpus() > 16 && role() == \"web\" || load() < 0.75", &host));
        assert!(evaluate("load() < 0.75 || cpus() > 16 && role() == \"web\"", &host));
        assert!(!evaluate("cpus() > 16 && (role() == \"web\" || load() < 0.75)", &host));
        assert!(evaluate("cpus() == 1 || cpus() == 2 || cpus() == 8", &host));
        assert!(!evaluate("!(cpus() == 8) && load() < 0.75", &host));
    }

    #[test]
    fn errors() {
        assert!(matches!(error("cpus() >"), PredicateError::Parse(_)));
        assert!(matches!(
            error("role() < \"x\""),
            PredicateError::UnsupportedOperator(_)
        ));
        assert!(matches!(
            error("cpus() + 1"),
            PredicateError::UnsupportedOperator(_)
        ));
        assert_eq!(
            error("cpus() == \"8\""),
            PredicateError::KindMismatch {
                expected: "integer",
                found: "string"
            }
        );
        assert_eq!(
            error("load() == 1"),
            PredicateError::KindMismatch {
                expected: "float",
                found: "integer"
            }
        );
        assert_eq!(
            error("memory() > 1"),
            PredicateError::UnknownFunction("memory".into())
        );
        assert!(matches!(
            error("local_exec() == \"x\""),
            PredicateError::InvalidArguments { .. }
        ));
        assert!(matches!(error("8 == 8"), PredicateError::InvalidOperand(_)));
        assert!(matches!(error("\"db\""), PredicateError::NotAPredicate(_)));
    }

    #[test]
    fn comparison_table() {
        use Comparison::*;

        let cases = [
            (Eq, Ordering::Equal, true),
            (Eq, Ordering::Less, false),
            (NotEq, Ordering::Less, true),
            (Less, Ordering::Less, true),
            (LessEq, Ordering::Equal, true),
            (LessEq, Ordering::Greater, false),
            (Greater, Ordering::Greater, true),
            (GreaterEq, Ordering::Equal, true),
            (GreaterEq, Ordering::Less, false),
        ];

        for (comparison, ordering, expected) in cases {
            assert_eq!(comparison.holds(Some(ordering)), expected, "{comparison:?} {ordering:?}");
        }

        // NaN compares unequal to everything
        assert!(!Eq.holds(None));
        assert!(NotEq.holds(None));
        assert!(!LessEq.holds(None));
    }
}
