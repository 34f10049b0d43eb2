//! Reader for generated standalone sources
//!
//! Understands the subset of C++ the packer emits: line comments,
//! preprocessor lines, `Type name(value);` and `Type name = value;`
//! declarations, braced `{name, value}` lists and narrow string literals
//! with line splices and adjacent-literal concatenation. Used to verify
//! artifacts and to inspect what a build will embed.

use crate::error::{PackError, Result};
use crate::node::Node;

/// Value bound to a declared symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Braced list of entries
    Tree(Vec<Node>),
    /// String literal
    Text(String),
}

/// One top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub ty: String,
    pub symbol: String,
    pub value: Value,
}

/// Every declaration found in a generated file, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    pub includes: Vec<String>,
    pub declarations: Vec<Declaration>,
}

impl Artifact {
    pub fn get(&self, symbol: &str) -> Option<&Value> {
        self.declarations
            .iter()
            .find(|d| d.symbol == symbol)
            .map(|d| &d.value)
    }

    /// Entries of a tree declaration
    pub fn tree(&self, symbol: &str) -> Option<&[Node]> {
        match self.get(symbol)? {
            Value::Tree(children) => Some(children),
            Value::Text(_) => None,
        }
    }

    /// Contents of a string declaration
    pub fn text(&self, symbol: &str) -> Option<&str> {
        match self.get(symbol)? {
            Value::Text(text) => Some(text),
            Value::Tree(_) => None,
        }
    }
}

/// Parse a complete generated source file
pub fn parse_artifact(source: &str) -> Result<Artifact> {
    let mut cursor = Cursor::new(source);
    let mut artifact = Artifact::default();

    loop {
        cursor.skip_trivia();
        match cursor.peek() {
            None => break,
            Some('#') => {
                let line = cursor.take_line();
                if let Some(target) = line.trim().strip_prefix("#include") {
                    artifact.includes.push(target.trim().to_string());
                }
            }
            Some(_) => artifact.declarations.push(cursor.declaration()?),
        }
    }

    Ok(artifact)
}

/// Decode one or more adjacent string literals back into text
pub fn unescape_literal(source: &str) -> Result<String> {
    let mut cursor = Cursor::new(source);
    let text = cursor.string()?;
    cursor.skip_trivia();
    if cursor.peek().is_some() {
        return Err(cursor.error("trailing input after string literal"));
    }
    Ok(text)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Drop backslash-newline splices at the current position
    fn splice(&mut self) {
        loop {
            match (self.chars.get(self.pos), self.chars.get(self.pos + 1)) {
                (Some('\\'), Some('\n')) => {
                    self.pos += 2;
                    self.line += 1;
                }
                (Some('\\'), Some('\r')) if self.chars.get(self.pos + 2) == Some(&'\n') => {
                    self.pos += 3;
                    self.line += 1;
                }
                _ => break,
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.splice();
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> PackError {
        PackError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_trivia();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", want, c))),
            None => Err(self.error(format!("expected '{}', found end of input", want))),
        }
    }

    fn take_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        line
    }

    /// Whitespace and `//` or `/* */` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'/') => {
                    self.take_line();
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.pos += 2;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn declaration(&mut self) -> Result<Declaration> {
        let mut words = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('(') | Some('=') => break,
                Some(c) if is_word_char(c) => words.push(self.word()),
                Some(c) => return Err(self.error(format!("unexpected '{}' in declaration", c))),
                None => return Err(self.error("unterminated declaration")),
            }
        }

        let symbol = words
            .pop()
            .ok_or_else(|| self.error("declaration has no name"))?;
        if words.is_empty() {
            return Err(self.error(format!("declaration of '{}' has no type", symbol)));
        }

        let value = if self.bump() == Some('(') {
            let value = self.value()?;
            self.expect(')')?;
            value
        } else {
            self.value()?
        };
        self.expect(';')?;

        Ok(Declaration {
            ty: words.join(" "),
            symbol,
            value,
        })
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => Ok(Value::Tree(self.directory()?)),
            Some('"') => Ok(Value::Text(self.string()?)),
            Some(c) => Err(self.error(format!("expected '{{' or string, found '{}'", c))),
            None => Err(self.error("expected value, found end of input")),
        }
    }

    fn directory(&mut self) -> Result<Vec<Node>> {
        self.expect('{')?;
        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(children);
                }
                Some('{') => {
                    children.push(self.entry()?);
                    self.skip_trivia();
                    match self.peek() {
                        Some(',') => {
                            self.bump();
                        }
                        Some('}') => {}
                        _ => return Err(self.error("expected ',' or '}' after entry")),
                    }
                }
                Some(c) => return Err(self.error(format!("unexpected '{}' in directory", c))),
                None => return Err(self.error("unterminated directory")),
            }
        }
    }

    fn entry(&mut self) -> Result<Node> {
        self.expect('{')?;
        self.skip_trivia();
        let name = self.string()?;
        self.expect(',')?;
        let node = match self.value()? {
            Value::Tree(children) => Node::dir(name, children),
            Value::Text(contents) => Node::file(name, contents),
        };
        self.expect('}')?;
        Ok(node)
    }

    /// Adjacent literals joined into one string
    fn string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        self.skip_trivia();
        if self.peek() != Some('"') {
            return Err(self.error("expected string literal"));
        }
        while self.peek() == Some('"') {
            self.literal(&mut bytes)?;
            self.skip_trivia();
        }
        String::from_utf8(bytes).map_err(|_| self.error("string literal is not valid UTF-8"))
    }

    fn literal(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some('"') => return Ok(()),
                Some('\\') => self.escape(out)?,
                Some(c) => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
    }

    fn escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape"))?;
        let byte = match c {
            '"' => b'"',
            '\'' => b'\'',
            '\\' => b'\\',
            '?' => b'?',
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0b,
            '0'..='7' => {
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            self.bump();
                        }
                        _ => break,
                    }
                }
                u8::try_from(value).map_err(|_| self.error("octal escape out of range"))?
            }
            'x' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while let Some(d) = self.peek().and_then(|d| d.to_digit(16)) {
                    value = value.saturating_mul(16).saturating_add(d);
                    digits += 1;
                    self.bump();
                }
                if digits == 0 {
                    return Err(self.error("\\x escape without digits"));
                }
                u8::try_from(value).map_err(|_| self.error("hex escape out of range"))?
            }
            other => return Err(self.error(format!("unsupported escape '\\{}'", other))),
        };
        out.push(byte);
        Ok(())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}
