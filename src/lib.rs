//! A JSON value type with a strict parser and a canonical compact serializer.
//!
//! ```
//! use jsonval::{parse, to_string, Value};
//!
//! let v = parse(r#"{ "Key" : 10 }"#).unwrap();
//! assert_eq!(v.get("Key"), Some(&Value::Integer(10)));
//! assert_eq!(to_string(&v), r#"{"Key":10}"#);
//! ```
//!
//! Numbers without a fraction or exponent parse as [`Value::Integer`], all
//! others as [`Value::Double`]. Object keys are serialized in ascending order,
//! so equal values always produce the same text.
mod ast;
mod formatter;
mod impls;
mod parser;

pub use ast::{Kind, Map, Value};
pub use formatter::Formatter;
pub use parser::{ParseError, ParseErrorKind, Parser, DEFAULT_MAX_DEPTH};

use std::str::FromStr;

/// Parses `text` as exactly one JSON value.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    Parser::new(text).parse()
}

/// Serializes `value` in canonical compact form.
pub fn to_string(value: &Value) -> String {
    value.to_string()
}

impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
