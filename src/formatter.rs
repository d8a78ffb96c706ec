use crate::ast::{Map, Value};
use std::fmt::{self, Write};

/// Writes the canonical compact form of a [`Value`] into a `fmt::Write` sink.
pub struct Formatter<W> {
    out: W,
}

impl<W: Write> Formatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }
    fn format_string(&mut self, s: &str) -> fmt::Result {
        self.out.write_char('"')?;
        for ch in s.chars() {
            match ch {
                '"' => self.out.write_str("\\\"")?,
                '\\' => self.out.write_str("\\\\")?,
                '\u{8}' => self.out.write_str("\\b")?,
                '\u{c}' => self.out.write_str("\\f")?,
                '\n' => self.out.write_str("\\n")?,
                '\r' => self.out.write_str("\\r")?,
                '\t' => self.out.write_str("\\t")?,
                ch if ch < '\u{20}' => write!(self.out, "\\u{:04x}", ch as u32)?,
                ch => self.out.write_char(ch)?,
            }
        }
        self.out.write_char('"')
    }
    fn format_double(&mut self, d: f64) -> fmt::Result {
        if !d.is_finite() {
            return self.out.write_str("null");
        }
        // `{:?}` is the shortest round-trip form and always keeps a `.` or exponent
        write!(self.out, "{:?}", d)
    }
    fn format_object(&mut self, map: &Map) -> fmt::Result {
        self.out.write_char('{')?;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.out.write_char(',')?;
            }
            self.format_string(key)?;
            self.out.write_char(':')?;
            self.format(value)?;
        }
        self.out.write_char('}')
    }
    fn format_array(&mut self, values: &[Value]) -> fmt::Result {
        self.out.write_char('[')?;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.out.write_char(',')?;
            }
            self.format(value)?;
        }
        self.out.write_char(']')
    }
    pub fn format(&mut self, v: &Value) -> fmt::Result {
        match v {
            Value::Null => self.out.write_str("null"),
            Value::Boolean(b) => self.out.write_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => write!(self.out, "{}", n),
            Value::Double(d) => self.format_double(*d),
            Value::String(s) => self.format_string(s),
            Value::Array(values) => self.format_array(values),
            Value::Object(map) => self.format_object(map),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Formatter::new(f).format(self)
    }
}
