use serde_json::{Map, Number};

use crate::ast::Value;

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(num) => {
                if let Some(i) = num.as_i64() {
                    Value::Integer(i)
                } else {
                    // u64 beyond i64::MAX or a float
                    num.as_f64().map_or(Value::Null, Value::Double)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(old) => Value::Array(old.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(old) => Value::Object(
                old.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(Number::from(i)),
            Value::Double(d) => Number::from_f64(d).map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(old) => serde_json::Value::Array(old.into_iter().map(serde_json::Value::from).collect()),
            Value::Object(old) => {
                let map: Map<String, serde_json::Value> = old
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        eq(other, self)
    }
}

impl PartialEq<Value> for serde_json::Value {
    fn eq(&self, other: &Value) -> bool {
        eq(self, other)
    }
}

fn eq(lhs: &serde_json::Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (serde_json::Value::Null, Value::Null) => true,
        (serde_json::Value::Bool(l), Value::Boolean(r)) => l == r,
        (serde_json::Value::Number(l), Value::Integer(r)) => l.as_i64() == Some(*r),
        (serde_json::Value::Number(l), Value::Double(r)) => l.is_f64() && l.as_f64() == Some(*r),
        (serde_json::Value::String(l), Value::String(r)) => l == r,
        (serde_json::Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(l, r)| eq(l, r))
        }
        (serde_json::Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, lv)| r.get(key).map_or(false, |rv| eq(lv, rv)))
        }
        _ => false,
    }
}
