//! Tokenizer for the tree description language.
//! Turns source text into a flat list of positioned tokens terminated by [`TokenKind::Eof`].

use crate::error::{Error, Result};
use log::debug;

/// Reserved words. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Folder,
    File,
    For,
    If,
    Else,
    Stdout,
    Stdin,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "folder" => Some(Keyword::Folder),
            "file" => Some(Keyword::File),
            "for" => Some(Keyword::For),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "stdout" => Some(Keyword::Stdout),
            "stdin" => Some(Keyword::Stdin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,
    ShiftLeft,
    ShiftRight,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
}

/// Two-character operators are listed first so they win over their one-character prefixes.
const OPERATORS: &[(&str, Operator)] = &[
    ("==", Operator::Eq),
    ("!=", Operator::Ne),
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("++", Operator::Increment),
    ("--", Operator::Decrement),
    ("<<", Operator::ShiftLeft),
    (">>", Operator::ShiftRight),
    ("=", Operator::Assign),
    ("<", Operator::Lt),
    (">", Operator::Gt),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Star),
    ("/", Operator::Slash),
    ("%", Operator::Percent),
    ("(", Operator::LParen),
    (")", Operator::RParen),
    ("{", Operator::LBrace),
    ("}", Operator::RBrace),
    ("[", Operator::LBracket),
    ("]", Operator::RBracket),
    (",", Operator::Comma),
    (":", Operator::Colon),
    (";", Operator::Semicolon),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    /// Double-quoted string; the text excludes the quotes.
    String,
    /// Digits and dots. Whether it is an integer is decided by the parser.
    Number,
    Operator(Operator),
    /// `${...}`; the text is the trimmed content between the braces.
    Placeholder,
    Eof,
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: &str, line: usize, column: usize) -> Error {
        Error::LexError {
            message: message.to_string(),
            line,
            column,
        }
    }

    fn push(&mut self, kind: TokenKind, text: String, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, text, line, column));
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                self.skip_comment();
            } else if c == '"' {
                self.read_string()?;
            } else if c.is_ascii_digit() {
                self.read_number();
            } else if c == '$' && self.peek_at(1) == Some('{') {
                self.read_placeholder()?;
            } else if c.is_alphabetic() || c == '_' {
                self.read_word();
            } else if !self.read_operator() {
                debug!(
                    "Skipping unrecognized character {:?} at line {}, column {}",
                    c, self.line, self.column
                );
                self.advance();
            }
        }

        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, String::new(), line, column);
        Ok(self.tokens)
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column);
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => {
                    text.push('\\');
                    match self.advance() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(self.error("unterminated string", line, column)),
                    }
                }
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated string", line, column)),
            }
        }
        self.push(TokenKind::String, text, line, column);
        Ok(())
    }

    fn read_number(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            text.push(c);
            self.advance();
        }
        self.push(TokenKind::Number, text, line, column);
    }

    fn read_placeholder(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column);
        self.advance();
        self.advance();
        let mut depth = 1usize;
        let mut text = String::new();
        while depth > 0 {
            match self.advance() {
                Some('{') => {
                    depth += 1;
                    text.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth > 0 {
                        text.push('}');
                    }
                }
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated placeholder", line, column)),
            }
        }
        self.push(TokenKind::Placeholder, text.trim().to_string(), line, column);
        Ok(())
    }

    fn read_word(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            text.push(c);
            self.advance();
        }
        let kind = Keyword::lookup(&text)
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Identifier);
        self.push(kind, text, line, column);
    }

    fn read_operator(&mut self) -> bool {
        let (line, column) = (self.line, self.column);
        for (symbol, op) in OPERATORS {
            let matches = symbol
                .chars()
                .enumerate()
                .all(|(i, expected)| self.peek_at(i) == Some(expected));
            if matches {
                for _ in 0..symbol.chars().count() {
                    self.advance();
                }
                self.push(TokenKind::Operator(*op), symbol.to_string(), line, column);
                return true;
            }
        }
        false
    }
}

/// Tokenizes `source`.
///
/// # Errors
/// * `Error::LexError` on an unterminated string or placeholder. No recovery is attempted.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let tokens = Lexer::new(source).run()?;
    debug!("Tokenized source into {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_char_operators_win() {
        let tokens = tokenize("<< <= <").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Operator(Operator::ShiftLeft),
                TokenKind::Operator(Operator::Le),
                TokenKind::Operator(Operator::Lt),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_lookup_ignores_case() {
        assert_eq!(Keyword::lookup("FoLdEr"), Some(Keyword::Folder));
        assert_eq!(Keyword::lookup("true"), None);
    }
}
