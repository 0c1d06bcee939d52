//! Permissive parser for JSON-like literals.
//!
//! Strict JSON is always tried first. When that fails, [`parse_literal`]
//! accepts the looser notation commonly found in exported spreadsheets and
//! hand-edited files:
//!
//! - single-quoted strings (`{'a': 'b'}`)
//! - bare identifier keys (`{name: "x"}`)
//! - `True` / `False` / `None` alongside `true` / `false` / `null`
//! - tuples written with parentheses, read as arrays
//! - trailing commas

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::schema::Cell;

/// Maximum nesting depth accepted by the fallback parser.
const MAX_DEPTH: usize = 128;

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
});

/// True if the trimmed text is wrapped in `[...]` or `{...}`.
pub fn is_json_like(text: &str) -> bool {
    let text = text.trim();
    (text.starts_with('[') && text.ends_with(']')) || (text.starts_with('{') && text.ends_with('}'))
}

/// Parse text as strict JSON, falling back to the permissive literal parser.
pub fn parse_structured(text: &str) -> Option<Cell> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(Cell::from_json(value)),
        Err(_) => parse_literal(text).map(Cell::from_json),
    }
}

/// Parse JSON-like text with the permissive grammar.
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.at_end() {
        Some(value)
    } else {
        None
    }
}

struct LiteralParser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Option<Value> {
        if depth > MAX_DEPTH {
            return None;
        }
        self.skip_whitespace();
        match self.peek()? {
            '{' => self.parse_object(depth),
            '[' => self.parse_sequence('[', ']', depth),
            '(' => self.parse_sequence('(', ')', depth),
            '"' | '\'' => self.parse_string().map(Value::String),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.parse_number(),
            c if is_identifier_start(c) => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_object(&mut self, depth: usize) -> Option<Value> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = self.parse_key()?;
            self.skip_whitespace();
            if !self.eat(':') {
                return None;
            }
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            return None;
        }
    }

    fn parse_key(&mut self) -> Option<String> {
        match self.peek()? {
            '"' | '\'' => self.parse_string(),
            c if is_identifier_start(c) => Some(self.parse_identifier()),
            c if c == '-' || c.is_ascii_digit() => {
                let token = NUMBER_PATTERN.find(self.rest())?.as_str().to_string();
                self.pos += token.len();
                Some(token)
            }
            _ => None,
        }
    }

    fn parse_sequence(&mut self, open: char, close: char, depth: usize) -> Option<Value> {
        debug_assert_eq!(self.peek(), Some(open));
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Some(Value::Array(items));
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                return Some(Value::Array(items));
            }
            return None;
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            let ch = self.bump()?;
            if ch == quote {
                return Some(out);
            }
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match self.bump()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000C}'),
                '0' => out.push('\0'),
                'u' => out.push(self.parse_unicode_escape()?),
                other => out.push(other),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Option<char> {
        let hex = self.rest().get(..4)?;
        let code = u32::from_str_radix(hex, 16).ok()?;
        self.pos += 4;
        if (0xD800..0xDC00).contains(&code) {
            // High surrogate: expect a `\uXXXX` low surrogate next.
            let rest = self.rest();
            if !rest.starts_with("\\u") {
                return None;
            }
            let low = u32::from_str_radix(rest.get(2..6)?, 16).ok()?;
            if !(0xDC00..0xE000).contains(&low) {
                return None;
            }
            self.pos += 6;
            return char::from_u32(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00));
        }
        char::from_u32(code)
    }

    fn parse_number(&mut self) -> Option<Value> {
        let token = NUMBER_PATTERN.find(self.rest())?.as_str();
        self.pos += token.len();
        let unsigned = token.trim_start_matches('+');
        let is_integer = !unsigned.contains(['.', 'e', 'E']);
        if is_integer {
            if let Ok(i) = unsigned.parse::<i64>() {
                return Some(Value::Number(i.into()));
            }
        }
        let f: f64 = unsigned.parse().ok()?;
        Number::from_f64(f).map(Value::Number)
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.source[start..self.pos].to_string()
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        match self.parse_identifier().as_str() {
            "true" | "True" => Some(Value::Bool(true)),
            "false" | "False" => Some(Value::Bool(false)),
            "null" | "None" => Some(Value::Null),
            _ => None,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}
