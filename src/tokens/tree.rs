//! Parsing JSON documents into a tagged token tree.
//!
//! Source documents mix plain values, `$value` wrappers, and nested groups.
//! [`Node::parse`] inspects the JSON shape exactly once; every later pass works
//! on the resulting variants.

use serde_json::{Map, Value};

use super::path::TokenPath;
use super::value::Literal;

/// A parsed document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Literal),
    Reference(TokenPath),
    /// Children in document order.
    Group(Vec<(String, Node)>),
}

impl Node {
    /// Parses a JSON value into a node tree. Parsing never fails: values that
    /// cannot be interpreted become [`Literal::Invalid`] leaves.
    pub fn parse(value: &Value) -> Node {
        match value {
            Value::Object(map) => match map.get("$value") {
                Some(inner) => {
                    let hint = map.get("$type").and_then(Value::as_str);
                    parse_leaf(inner, hint)
                }
                None => parse_group(map),
            },
            Value::Array(items) => Node::Group(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), Node::parse(item)))
                    .collect(),
            ),
            other => parse_leaf(other, None),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }
}

fn parse_group(map: &Map<String, Value>) -> Node {
    Node::Group(
        map.iter()
            .filter(|(key, _)| !key.starts_with('$'))
            .map(|(key, value)| (key.clone(), Node::parse(value)))
            .collect(),
    )
}

fn invalid(raw: &Value, reason: &str) -> Node {
    Node::Leaf(Literal::Invalid {
        raw: raw.to_string(),
        reason: reason.to_string(),
    })
}

fn parse_leaf(raw: &Value, hint: Option<&str>) -> Node {
    match raw {
        Value::String(s) => parse_string(raw, s, hint),
        Value::Number(n) => match (hint, n.as_f64()) {
            (Some("dimension"), _) => invalid(raw, "dimension is missing a unit"),
            (Some("color"), _) => invalid(raw, "color must be a hex string"),
            (_, Some(f)) => Node::Leaf(Literal::Number(f)),
            (_, None) => invalid(raw, "number is out of range"),
        },
        Value::Bool(b) => match hint {
            None => Node::Leaf(Literal::Bool(*b)),
            Some(_) => invalid(raw, "boolean does not match declared type"),
        },
        Value::Object(map) => match hint {
            None | Some("dimension") => parse_dimension_object(raw, map),
            Some(_) => invalid(raw, "object value does not match declared type"),
        },
        Value::Null => invalid(raw, "null value"),
        Value::Array(_) => invalid(raw, "array values are not supported"),
    }
}

fn parse_string(raw: &Value, s: &str, hint: Option<&str>) -> Node {
    if s.contains(['{', '}']) {
        return match TokenPath::parse_reference(s) {
            Some(path) => Node::Reference(path),
            None => invalid(raw, "malformed reference"),
        };
    }

    match hint {
        Some("color") => Node::Leaf(Literal::Color(s.to_string())),
        Some("dimension") => match Literal::parse_dimension(s) {
            Some(dimension) => Node::Leaf(dimension),
            None => invalid(raw, "expected <number><unit>"),
        },
        Some("number") => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Node::Leaf(Literal::Number(n)),
            _ => invalid(raw, "expected a number"),
        },
        _ if s.starts_with('#') => Node::Leaf(Literal::Color(s.to_string())),
        _ if Literal::looks_like_dimension(s) => match Literal::parse_dimension(s) {
            Some(dimension) => Node::Leaf(dimension),
            None => Node::Leaf(Literal::Text(s.to_string())),
        },
        _ => Node::Leaf(Literal::Text(s.to_string())),
    }
}

fn parse_dimension_object(raw: &Value, map: &Map<String, Value>) -> Node {
    let value = map.get("value").and_then(Value::as_f64);
    let unit = map.get("unit").and_then(Value::as_str);
    match (value, unit) {
        (Some(value), Some(unit)) => Node::Leaf(Literal::Dimension {
            value,
            unit: unit.to_string(),
        }),
        _ => invalid(raw, "dimension needs a numeric 'value' and a string 'unit'"),
    }
}
