//! Definitions and functions to create and manipulate scan filter expressions

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

mod json;

/// A predicate operator that takes only a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum UnaryOp {
    IsNull,
    NotNull,
    IsNan,
    NotNan,
}

/// A predicate operator that compares a column against one literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum LiteralOp {
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    StartsWith,
    NotStartsWith,
}

/// A predicate operator that tests a column against a set of literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SetOp {
    In,
    NotIn,
}

/// A constant value in a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::Long(value.into())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "'{s}'"),
        }
    }
}

/// A boolean expression over the columns of a table, as used to filter a scan.
///
/// Column references are unbound: they name a column but carry no type information.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    True,
    False,
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Unary {
        op: UnaryOp,
        term: String,
    },
    Literal {
        op: LiteralOp,
        term: String,
        value: Literal,
    },
    Set {
        op: SetOp,
        term: String,
        values: Vec<Literal>,
    },
}

impl Default for Expression {
    fn default() -> Self {
        Self::always_true()
    }
}

impl Expression {
    pub const fn always_true() -> Self {
        Self::True
    }

    pub const fn always_false() -> Self {
        Self::False
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Expression) -> Self {
        Self::Not(Box::new(child))
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn unary(op: UnaryOp, term: impl Into<String>) -> Self {
        Self::Unary {
            op,
            term: term.into(),
        }
    }

    pub fn literal(op: LiteralOp, term: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::Literal {
            op,
            term: term.into(),
            value: value.into(),
        }
    }

    pub fn set<T: Into<Literal>>(
        op: SetOp,
        term: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::Set {
            op,
            term: term.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(term: impl Into<String>) -> Self {
        Self::unary(UnaryOp::IsNull, term)
    }

    pub fn not_null(term: impl Into<String>) -> Self {
        Self::unary(UnaryOp::NotNull, term)
    }

    pub fn equal(term: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::literal(LiteralOp::Eq, term, value)
    }

    pub fn less_than(term: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::literal(LiteralOp::Lt, term, value)
    }

    pub fn greater_than(term: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::literal(LiteralOp::Gt, term, value)
    }

    pub fn is_in<T: Into<Literal>>(
        term: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::set(SetOp::In, term, values)
    }

    /// The names of every column this expression references, in order of first appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs.into_iter().unique().collect()
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Self::True | Self::False => {}
            Self::Not(child) => child.collect_references(refs),
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            Self::Unary { term, .. } | Self::Literal { term, .. } | Self::Set { term, .. } => {
                refs.push(term)
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Not(child) => write!(f, "not({child})"),
            Self::And(left, right) => write!(f, "({left} and {right})"),
            Self::Or(left, right) => write!(f, "({left} or {right})"),
            Self::Unary { op, term } => write!(f, "{op}({term})"),
            Self::Literal { op, term, value } => write!(f, "{term} {op} {value}"),
            Self::Set { op, term, values } => {
                write!(f, "{term} {op} ({})", values.iter().join(", "))
            }
        }
    }
}
