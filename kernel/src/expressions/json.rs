//! JSON encoding of [`Expression`] trees.
//!
//! The constants are plain JSON booleans. Everything else is an object whose `type` names the
//! operator, e.g. `{"type":"lt","term":"id","value":5}` or `{"type":"not","child":true}`.

use serde::ser::{Error as _, SerializeMap as _};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::{Expression, Literal, LiteralOp, SetOp, UnaryOp};
use crate::json::{as_object, get, get_string};
use crate::{Error, KernelResult};

const TYPE: &str = "type";
const AND: &str = "and";
const OR: &str = "or";
const NOT: &str = "not";
const TRUE: &str = "true";
const FALSE: &str = "false";
const LEFT: &str = "left";
const RIGHT: &str = "right";
const CHILD: &str = "child";
const TERM: &str = "term";
const VALUE: &str = "value";
const VALUES: &str = "values";
const REFERENCE: &str = "reference";

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::Boolean(b) => serializer.serialize_bool(*b),
            Literal::Long(l) => serializer.serialize_i64(*l),
            // JSON has no NaN or infinity; writing them would lose the value
            Literal::Double(d) if !d.is_finite() => Err(S::Error::custom(format!(
                "Cannot create expression literal from {d}"
            ))),
            Literal::Double(d) => serializer.serialize_f64(*d),
            Literal::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expression::True => serializer.serialize_bool(true),
            Expression::False => serializer.serialize_bool(false),
            Expression::Not(child) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE, NOT)?;
                map.serialize_entry(CHILD, child)?;
                map.end()
            }
            Expression::And(left, right) | Expression::Or(left, right) => {
                let op = if matches!(self, Expression::And(..)) { AND } else { OR };
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(TYPE, op)?;
                map.serialize_entry(LEFT, left)?;
                map.serialize_entry(RIGHT, right)?;
                map.end()
            }
            Expression::Unary { op, term } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE, op.as_ref())?;
                map.serialize_entry(TERM, term)?;
                map.end()
            }
            Expression::Literal { op, term, value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(TYPE, op.as_ref())?;
                map.serialize_entry(TERM, term)?;
                map.serialize_entry(VALUE, value)?;
                map.end()
            }
            Expression::Set { op, term, values } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(TYPE, op.as_ref())?;
                map.serialize_entry(TERM, term)?;
                map.serialize_entry(VALUES, values)?;
                map.end()
            }
        }
    }
}

impl Expression {
    /// Decode an expression from its JSON form.
    pub fn from_json(json: &Value) -> KernelResult<Self> {
        if let Some(constant) = json.as_bool() {
            return Ok(if constant { Self::True } else { Self::False });
        }
        let node = as_object("expression", json)?;
        let kind = get_string(TYPE, node)?.to_ascii_lowercase();
        let expr = match kind.as_str() {
            TRUE => Self::True,
            FALSE => Self::False,
            NOT => Self::not(Self::from_json(get(CHILD, node)?)?),
            AND => Self::and(
                Self::from_json(get(LEFT, node)?)?,
                Self::from_json(get(RIGHT, node)?)?,
            ),
            OR => Self::or(
                Self::from_json(get(LEFT, node)?)?,
                Self::from_json(get(RIGHT, node)?)?,
            ),
            other => {
                if let Ok(op) = other.parse::<UnaryOp>() {
                    Self::unary(op, term_from_json(node)?)
                } else if let Ok(op) = other.parse::<LiteralOp>() {
                    Self::Literal {
                        op,
                        term: term_from_json(node)?,
                        value: literal_from_json(get(VALUE, node)?)?,
                    }
                } else if let Ok(op) = other.parse::<SetOp>() {
                    let values = get(VALUES, node)?;
                    let values = values.as_array().ok_or_else(|| {
                        Error::generic(format!("Cannot parse literals from non-array: {values}"))
                    })?;
                    Self::Set {
                        op,
                        term: term_from_json(node)?,
                        values: values
                            .iter()
                            .map(literal_from_json)
                            .collect::<KernelResult<_>>()?,
                    }
                } else {
                    return Err(Error::generic(format!(
                        "Cannot parse expression with unknown type: {other}"
                    )));
                }
            }
        };
        Ok(expr)
    }
}

fn term_from_json(node: &Map<String, Value>) -> KernelResult<String> {
    match get(TERM, node)? {
        Value::String(name) => Ok(name.clone()),
        Value::Object(reference) if get_string(TYPE, reference)? == REFERENCE => {
            Ok(get_string(TERM, reference)?.to_string())
        }
        other => Err(Error::generic(format!("Cannot parse reference from json: {other}"))),
    }
}

fn literal_from_json(json: &Value) -> KernelResult<Literal> {
    let literal = match json {
        Value::Bool(b) => Literal::Boolean(*b),
        Value::String(s) => Literal::String(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(l), _) => Literal::Long(l),
            (None, Some(d)) => Literal::Double(d),
            (None, None) => {
                return Err(Error::generic(format!("Cannot parse literal from json: {json}")))
            }
        },
        _ => return Err(Error::generic(format!("Cannot parse literal from json: {json}"))),
    };
    Ok(literal)
}
