use crate::ast::{Map, Value};
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 128;

pub struct Parser {
    chars: Vec<char>,
    pos: usize,
    line_number: usize,
    column: usize,
    depth: usize,
    max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid token: `{0}`")]
    UnexpectedChar(char),
    #[error("expected: {expected}, found: `{found}`")]
    Expected { expected: &'static str, found: char },
    #[error("invalid escape: `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("control character in string")]
    ControlCharacter,
    #[error("invalid number")]
    InvalidNumber,
    #[error("integer out of range")]
    IntegerOverflow,
    #[error("number out of range")]
    DoubleOutOfRange,
    #[error("trailing characters")]
    TrailingCharacters,
    #[error("nesting too deep")]
    DepthLimitExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error at line {line_number}, column {column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line_number: usize,
    pub column: usize,
}

type Result<T> = std::result::Result<T, ParseError>;

impl Parser {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line_number: 1,
            column: 1,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            line_number: self.line_number,
            column: self.column,
        }
    }
    fn succ(&mut self) {
        if let Some(&ch) = self.chars.get(self.pos) {
            if ch == '\n' {
                self.line_number += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }
    fn get_cur_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
    fn cur_char_is(&self, ch: char) -> bool {
        self.get_cur_char() == Some(ch)
    }
    // take the current char, failing at end of input
    fn next_char(&mut self) -> Result<char> {
        let ch = self
            .get_cur_char()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))?;
        self.succ();
        Ok(ch)
    }
    fn expect_char(&self, expected: &'static str, ch: char) -> Result<()> {
        match self.get_cur_char() {
            Some(actual) if actual == ch => Ok(()),
            Some(found) => Err(self.error(ParseErrorKind::Expected { expected, found })),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }
    // check current token and skip it
    fn consume_char(&mut self, expected: &'static str, ch: char) -> Result<()> {
        self.expect_char(expected, ch)?;
        self.succ();
        Ok(())
    }
    fn skip_whitespace(&mut self) {
        while let Some(' ') | Some('\t') | Some('\n') | Some('\r') = self.get_cur_char() {
            self.succ();
        }
    }
    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value> {
        for expected in word.chars() {
            match self.get_cur_char() {
                Some(ch) if ch == expected => self.succ(),
                Some(ch) => return Err(self.error(ParseErrorKind::UnexpectedChar(ch))),
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
        }
        Ok(value)
    }
    fn parse_hex4(&mut self) -> Result<u16> {
        let mut code = 0u16;
        for _ in 0..4 {
            let digit = self
                .next_char()?
                .to_digit(16)
                .ok_or_else(|| self.error(ParseErrorKind::InvalidUnicodeEscape))?;
            code = code * 16 + digit as u16;
        }
        Ok(code)
    }
    // called after `\u`; a high surrogate followed by `\uDC00..\uDFFF` is combined
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let first = self.parse_hex4()?;
        if !(0xD800..0xDC00).contains(&first) {
            return Ok(char::from_u32(u32::from(first)).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        let rest = self.chars.get(self.pos..self.pos + 2);
        if rest != Some(&['\\', 'u'][..]) {
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        let (pos, line_number, column) = (self.pos, self.line_number, self.column);
        self.succ();
        self.succ();
        let second = self.parse_hex4()?;
        if (0xDC00..0xE000).contains(&second) {
            let code = 0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00);
            Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        } else {
            // unpaired; rewind so the second escape is decoded on its own
            self.pos = pos;
            self.line_number = line_number;
            self.column = column;
            Ok(char::REPLACEMENT_CHARACTER)
        }
    }
    fn parse_inner_string(&mut self) -> Result<String> {
        self.consume_char("`\"`", '"')?; // left quotes
        let mut s = String::new();
        loop {
            match self.next_char()? {
                '"' => break, // right quotes
                '\\' => {
                    let escaped = match self.next_char()? {
                        '"' => '"',
                        '\\' => '\\',
                        '/' => '/',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'u' => self.parse_unicode_escape()?,
                        other => return Err(self.error(ParseErrorKind::InvalidEscape(other))),
                    };
                    s.push(escaped);
                }
                ch if ch < '\u{20}' => return Err(self.error(ParseErrorKind::ControlCharacter)),
                ch => s.push(ch),
            }
        }
        Ok(s)
    }
    fn parse_string_value(&mut self) -> Result<Value> {
        let s = self.parse_inner_string()?;
        Ok(Value::String(s))
    }
    fn parse_string_key(&mut self) -> Result<String> {
        self.parse_inner_string()
    }
    fn push_digits(&mut self, num: &mut String) -> Result<()> {
        match self.get_cur_char() {
            Some(ch) if ch.is_ascii_digit() => {}
            _ => return Err(self.error(ParseErrorKind::InvalidNumber)),
        }
        while let Some(ch) = self.get_cur_char().filter(char::is_ascii_digit) {
            num.push(ch);
            self.succ();
        }
        Ok(())
    }
    fn parse_number(&mut self) -> Result<Value> {
        let mut num = String::new();
        if self.cur_char_is('-') {
            num.push('-');
            self.succ();
        }
        if self.cur_char_is('0') {
            num.push('0');
            self.succ();
        } else {
            self.push_digits(&mut num)?;
        }
        let mut is_double = false;
        if self.cur_char_is('.') {
            num.push('.');
            self.succ();
            self.push_digits(&mut num)?;
            is_double = true;
        }
        if let Some(e) = self.get_cur_char().filter(|&ch| ch == 'e' || ch == 'E') {
            num.push(e);
            self.succ();
            if let Some(sign) = self.get_cur_char().filter(|&ch| ch == '+' || ch == '-') {
                num.push(sign);
                self.succ();
            }
            self.push_digits(&mut num)?;
            is_double = true;
        }
        if is_double {
            let d: f64 = num
                .parse()
                .map_err(|_| self.error(ParseErrorKind::InvalidNumber))?;
            if !d.is_finite() {
                return Err(self.error(ParseErrorKind::DoubleOutOfRange));
            }
            Ok(Value::Double(d))
        } else {
            // the literal is already validated, so the only failure left is overflow
            num.parse()
                .map(Value::Integer)
                .map_err(|_| self.error(ParseErrorKind::IntegerOverflow))
        }
    }
    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(self.error(ParseErrorKind::DepthLimitExceeded));
        }
        self.depth += 1;
        Ok(())
    }
    fn parse_object(&mut self) -> Result<Value> {
        self.consume_char("`{`", '{')?;
        self.enter()?;
        self.skip_whitespace();
        let mut map = Map::new();
        if self.cur_char_is('}') {
            self.succ();
            self.depth -= 1;
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string_key()?;
            self.skip_whitespace();
            self.consume_char("`:`", ':')?;
            let value = self.parse_value()?;
            self.skip_whitespace();
            map.insert(key, value);
            match self.get_cur_char() {
                Some(',') => self.succ(),
                Some('}') => break,
                Some(found) => {
                    return Err(self.error(ParseErrorKind::Expected {
                        expected: "`,` or `}`",
                        found,
                    }))
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
        }
        self.consume_char("`}`", '}')?;
        self.depth -= 1;
        Ok(Value::Object(map))
    }
    fn parse_array(&mut self) -> Result<Value> {
        self.consume_char("`[`", '[')?;
        self.enter()?;
        self.skip_whitespace();
        let mut values = vec![];
        if self.cur_char_is(']') {
            self.succ();
            self.depth -= 1;
            return Ok(Value::Array(values));
        }
        loop {
            let value = self.parse_value()?;
            self.skip_whitespace();
            values.push(value);
            match self.get_cur_char() {
                Some(',') => self.succ(),
                Some(']') => break,
                Some(found) => {
                    return Err(self.error(ParseErrorKind::Expected {
                        expected: "`,` or `]`",
                        found,
                    }))
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            }
        }
        self.consume_char("`]`", ']')?;
        self.depth -= 1;
        Ok(Value::Array(values))
    }
    pub fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.get_cur_char() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string_value(),
            Some('t') => self.parse_literal("true", Value::Boolean(true)),
            Some('f') => self.parse_literal("false", Value::Boolean(false)),
            Some('n') => self.parse_literal("null", Value::Null),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(other) => Err(self.error(ParseErrorKind::UnexpectedChar(other))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }
    /// Parses the whole input as exactly one JSON value.
    pub fn parse(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.get_cur_char().is_some() {
            return Err(self.error(ParseErrorKind::TrailingCharacters));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> Value {
        Value::String(String::from(s))
    }

    fn object(pairs: Vec<(&str, Value)>) -> Value {
        pairs.into_iter().collect()
    }

    fn parser(s: &str) -> Parser {
        Parser::new(s)
    }

    fn error_kind(input: &str) -> ParseErrorKind {
        match parser(input).parse() {
            Err(e) => e.kind,
            Ok(v) => unreachable!("parsed {:?}", v),
        }
    }

    #[test]
    fn test_parse_string() {
        let test = |input: &str, result: &str| {
            let mut p = parser(input);
            let v = p.parse_string_value().unwrap();
            assert_eq!(v, string(result));
        };
        test(r#""""#, ""); // ""
        test(r#""   ""#, "   "); // "   "
        test(r#""abc de f""#, "abc de f"); // "abc de f"
        test(r#""abc\nde f""#, "abc\nde f"); // "abc\nde f"
        test(r#""\"\\\/\b\f\r\t""#, "\"\\/\u{8}\u{c}\r\t");
        test(r#""Aé""#, "Aé");
        test(r#""\ud83d\ude00""#, "\u{1F600}"); // surrogate pair
        test(r#""\ud83dx""#, "\u{FFFD}x"); // unpaired high
        test(r#""\ude00""#, "\u{FFFD}"); // unpaired low
        test(r#""\ud83d\u0041""#, "\u{FFFD}A"); // high then non-surrogate
        test("\"日本語\"", "日本語");
    }

    #[test]
    fn test_ng_parse_string() {
        let test = |input: &str| {
            let mut p = parser(input);
            assert!(p.parse_string_value().is_err());
        };
        test(r#"abc de f""#); // abc de f"
        test(r#""abc de f"#); // "abc de f
        test(r#""\x""#); // invalid escape
        test(r#""\u12""#); // short unicode escape
        test(r#""\u12G4""#); // non-hex digit
        test(r#""abc\"#); // backslash at end
        test("\"a\nb\""); // raw newline
    }

    #[test]
    fn test_parse_number() {
        let test = |input: &str, result: Value| {
            let mut p = parser(input);
            let v = p.parse_number().unwrap();
            assert_eq!(v, result);
        };
        test("0", Value::Integer(0));
        test("10", Value::Integer(10));
        test("-123", Value::Integer(-123));
        test("-0", Value::Integer(0));
        test("9223372036854775807", Value::Integer(i64::MAX));
        test("-9223372036854775808", Value::Integer(i64::MIN));
        test("1.01", Value::Double(1.01));
        test("10.0", Value::Double(10.0));
        test("-123.45", Value::Double(-123.45));
        test("1e3", Value::Double(1000.0));
        test("1E+3", Value::Double(1000.0));
        test("25e-2", Value::Double(0.25));
        test("0.5e1", Value::Double(5.0));
    }

    #[test]
    fn test_ng_parse_number() {
        let test = |input: &str, kind: ParseErrorKind| {
            assert_eq!(error_kind(input), kind);
        };
        test("9223372036854775808", ParseErrorKind::IntegerOverflow);
        test("-9223372036854775809", ParseErrorKind::IntegerOverflow);
        test("1e400", ParseErrorKind::DoubleOutOfRange);
        test("-", ParseErrorKind::InvalidNumber);
        test("1.", ParseErrorKind::InvalidNumber);
        test("1.e5", ParseErrorKind::InvalidNumber);
        test("1e", ParseErrorKind::InvalidNumber);
        test("1e+", ParseErrorKind::InvalidNumber);
        test("-a", ParseErrorKind::InvalidNumber);
        test("01", ParseErrorKind::TrailingCharacters);
        test("+1", ParseErrorKind::UnexpectedChar('+'));
        test(".5", ParseErrorKind::UnexpectedChar('.'));
    }

    #[test]
    fn test_parse_literal() {
        let test = |input: &str, result: Value| {
            assert_eq!(parser(input).parse().unwrap(), result);
        };
        test("true", Value::Boolean(true));
        test("false", Value::Boolean(false));
        test("null", Value::Null);
        test("  null \r\n\t", Value::Null);
    }

    #[test]
    fn test_ng_parse_literal() {
        let test = |input: &str| {
            assert!(parser(input).parse().is_err());
        };
        test("tru");
        test("True");
        test("nul");
        test("NULL");
        test("falsey");
        test("f");
    }

    #[test]
    fn test_parse_empty_object() {
        let test = |input: &str| {
            let mut p = parser(input);
            assert_eq!(p.parse_object().unwrap(), Value::Object(Map::new()));
        };
        test("{}");
        test("{    }");
        test("{\n}");
    }

    #[test]
    fn test_parse_object() {
        let mut p = parser(r#"{"a" : 123,      "bc"  :"xyz"   }"#);
        let v: Value = p.parse_object().unwrap();
        let expected = object(vec![("a", Value::Integer(123)), ("bc", string("xyz"))]);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_parse_nested_object() {
        let mut p = parser(r#"{"a": {"bc": 12345, "def": "xyz"}, "ijk": 0}"#);
        let v: Value = p.parse_object().unwrap();
        let expected = object(vec![
            (
                "a",
                object(vec![("bc", Value::Integer(12345)), ("def", string("xyz"))]),
            ),
            ("ijk", Value::Integer(0)),
        ]);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_parse_object_duplicate_keys() {
        let v = parser(r#"{"a": 1, "a": 2}"#).parse().unwrap();
        assert_eq!(v, object(vec![("a", Value::Integer(2))]));
    }

    #[test]
    fn test_ng_parse_object() {
        let test = |input: &str| {
            let mut p = parser(input);
            assert!(p.parse_object().is_err());
        };
        test(r#"{ , }"#);
        test(r#"{"a": 123"#); // {"a":123
        test(r#""a":123}"#); // "a":123}
        test(r#"{"a":123  "bc":"xyz"}"#); // missing comma
        test(r#"{"a"  123}"#); // missing colon
        test(r#"{ "a": }"#); // missing value
        test(r#"{"a": 1,}"#); // trailing comma
        test(r#"{a: 1}"#); // bare key
        test(r#"{1: 1}"#); // non-string key
    }

    #[test]
    fn test_parse_array() {
        let mut p = parser(r#"[1, 23, 456, "xyz"]"#);
        let v: Value = p.parse_array().unwrap();
        let expected = Value::Array(vec![
            Value::Integer(1),
            Value::Integer(23),
            Value::Integer(456),
            string("xyz"),
        ]);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_parse_nested_array() {
        let mut p = parser(r#"[1, [23, 456], "xyz", []]"#);
        let v: Value = p.parse_array().unwrap();
        let expected = Value::Array(vec![
            Value::Integer(1),
            Value::Array(vec![Value::Integer(23), Value::Integer(456)]),
            string("xyz"),
            Value::Array(vec![]),
        ]);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_parse_combined_object_array() {
        let mut p = parser(r#"{"a": [{"id": 1, "text": "xxx"}, {"id": 2, "text": "yyy"}]}"#);
        let v: Value = p.parse_object().unwrap();
        let expected = object(vec![(
            "a",
            Value::Array(vec![
                object(vec![("id", Value::Integer(1)), ("text", string("xxx"))]),
                object(vec![("id", Value::Integer(2)), ("text", string("yyy"))]),
            ]),
        )]);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_ng_parse_array() {
        let test = |input: &str| {
            let mut p = parser(input);
            assert!(p.parse_array().is_err());
        };
        test(r#"[ , ]"#);
        test(r#"["a""#); // ["a"
        test(r#"["a","#); // ["a",
        test(r#""a"]"#); // "a"]
        test(r#","a"]"#); // ,"a"]
        test(r#"["a"  123]"#); // missing comma
        test(r#"[1,2,]"#); // trailing comma
    }

    #[test]
    fn test_trailing_content() {
        let test = |input: &str| {
            assert_eq!(error_kind(input), ParseErrorKind::TrailingCharacters);
        };
        test("1 2");
        test("{} {}");
        test("[]]");
        test("null x");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(error_kind(""), ParseErrorKind::UnexpectedEnd);
        assert_eq!(error_kind("   "), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(4), "]".repeat(4));
        assert!(parser(&deep).with_max_depth(4).parse().is_ok());
        let err = parser(&deep).with_max_depth(3).parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DepthLimitExceeded);

        let hostile = "[".repeat(100_000);
        assert_eq!(error_kind(&hostile), ParseErrorKind::DepthLimitExceeded);
    }

    #[test]
    fn test_error_line() {
        let test = |input: &str, line_number: usize| {
            let mut p = parser(input);
            match p.parse_object() {
                Err(e) => {
                    assert_eq!(e.line_number, line_number);
                }
                _ => unreachable!(),
            }
        };

        // missing colon
        #[rustfmt::skip]
        test(
r#"{
"a": 123,
"b"  45
}"#,
            3,
        );

        // missing comma
        #[rustfmt::skip]
        test(
r#"{
"a": 123
"b": 45
}"#,
            3,
        );

        // missing close brace
        #[rustfmt::skip]
        test(
r#"{
"a": 123,
"b": 45
"#,
            4,
        );
    }

    #[test]
    fn test_error_display() {
        let err = parser("{\n  \"a\" 1}").parse().unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.column, 7);
        assert_eq!(
            err.to_string(),
            "error at line 2, column 7: expected: `:`, found: `1`"
        );
    }
}
