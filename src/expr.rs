//! Restricted expression language used by template `{if}` and `{for}` blocks.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or         := and (("or" | "||") and)*
//! and        := not (("and" | "&&") not)*
//! not        := ("not" | "!") not | comparison
//! comparison := additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)?
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := "-" unary | primary
//! primary    := number | string | true | false | null | identifier
//!             | "(" or ")" | "[" (or ("," or)*)? "]"
//! ```
//!
//! Identifiers resolve against the render context; nothing else is reachable.

use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
}

/// Value produced by an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Converts a context entry. Strings that spell a number or a boolean take that type,
    /// so a variable holding `"3"` compares numerically.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Self::from_text(s)),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => None,
        }
    }

    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
        match trimmed {
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            _ => Value::Str(text.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

const OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!",
];

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    'outer: while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        match c {
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            ',' => tokens.push(Token::Comma),
            '"' | '\'' => {
                let mut text = String::new();
                pos += 1;
                loop {
                    match chars.get(pos) {
                        Some(&q) if q == c => break,
                        Some('\\') if pos + 1 < chars.len() => {
                            text.push(chars[pos + 1]);
                            pos += 2;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            pos += 1;
                        }
                        None => return Err(ExprError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(text));
            }
            _ if c.is_ascii_digit() || (c == '.' && chars.get(pos + 1).is_some_and(char::is_ascii_digit)) => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let text: String = chars[start..pos].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::UnexpectedToken(format!("number '{}'", text)))?;
                tokens.push(Token::Number(number));
                continue;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
                continue;
            }
            _ => {
                for op in OPERATORS {
                    let len = op.chars().count();
                    if chars.len() >= pos + len && op.chars().eq(chars[pos..pos + len].iter().copied()) {
                        tokens.push(Token::Op(op));
                        pos += len;
                        continue 'outer;
                    }
                }
                return Err(ExprError::UnexpectedChar(c));
            }
        }
        pos += 1;
    }
    Ok(tokens)
}

struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    context: &'a serde_json::Value,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(token: Option<Token>) -> ExprError {
        match token {
            Some(token) => ExprError::UnexpectedToken(format!("{:?}", token)),
            None => ExprError::UnexpectedToken("end of expression".to_string()),
        }
    }

    fn eat_word(&mut self, words: &[&str]) -> bool {
        let matched = match self.peek() {
            Some(Token::Op(op)) => words.contains(op),
            Some(Token::Ident(name)) => words.contains(&name.as_str()),
            _ => false,
        };
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn or(&mut self) -> Result<Value, ExprError> {
        let mut left = self.and()?;
        while self.eat_word(&["or", "||"]) {
            let right = self.and()?;
            left = Value::Bool(left.is_truthy() || right.is_truthy());
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Value, ExprError> {
        let mut left = self.not()?;
        while self.eat_word(&["and", "&&"]) {
            let right = self.not()?;
            left = Value::Bool(left.is_truthy() && right.is_truthy());
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Value, ExprError> {
        if self.eat_word(&["not", "!"]) {
            let value = self.not()?;
            return Ok(Value::Bool(!value.is_truthy()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value, ExprError> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Op(op)) if matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=") => *op,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        let result = match op {
            "==" => left == right,
            "!=" => left != right,
            _ => {
                let ordering = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                }
                .ok_or(ExprError::TypeMismatch {
                    op,
                    left: left.type_name(),
                    right: right.type_name(),
                })?;
                match op {
                    "<" => ordering == Ordering::Less,
                    "<=" => ordering != Ordering::Greater,
                    ">" => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }
            }
        };
        Ok(Value::Bool(result))
    }

    fn additive(&mut self) -> Result<Value, ExprError> {
        let mut left = self.term()?;
        while let Some(Token::Op(op @ ("+" | "-"))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.term()?;
            left = arithmetic(op, left, right)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Value, ExprError> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ ("*" | "/" | "%"))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.unary()?;
            left = arithmetic(op, left, right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Value, ExprError> {
        if let Some(Token::Op("-")) = self.peek() {
            self.pos += 1;
            let value = self.unary()?;
            return arithmetic("-", Value::Number(0.0), value);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" | "True" => Ok(Value::Bool(true)),
                "false" | "False" => Ok(Value::Bool(false)),
                "null" | "None" => Ok(Value::Null),
                _ => self
                    .context
                    .get(&name)
                    .and_then(Value::from_json)
                    .ok_or(ExprError::UnknownName(name)),
            },
            Some(Token::LParen) => {
                let value = self.or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    other => Err(Self::unexpected(other)),
                }
            }
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if let Some(Token::RBracket) = self.peek() {
                    self.pos += 1;
                    return Ok(Value::List(items));
                }
                loop {
                    items.push(self.or()?);
                    match self.next() {
                        Some(Token::Comma) => continue,
                        Some(Token::RBracket) => break,
                        other => return Err(Self::unexpected(other)),
                    }
                }
                Ok(Value::List(items))
            }
            other => Err(Self::unexpected(other)),
        }
    }
}

fn arithmetic(op: &'static str, left: Value, right: Value) -> Result<Value, ExprError> {
    let (a, b) = match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => (*a, *b),
        _ => {
            return Err(ExprError::TypeMismatch {
                op,
                left: left.type_name(),
                right: right.type_name(),
            })
        }
    };
    let result = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" if b == 0.0 => return Err(ExprError::DivisionByZero),
        "/" => a / b,
        "%" if b == 0.0 => return Err(ExprError::DivisionByZero),
        // Floored remainder: the result takes the sign of the divisor.
        _ => a - b * (a / b).floor(),
    };
    Ok(Value::Number(result))
}

/// Evaluates `source` with identifiers resolved from `context`.
///
/// # Errors
/// * `ExprError` for malformed input, unknown names or ill-typed operations
pub fn evaluate(source: &str, context: &serde_json::Value) -> Result<Value, ExprError> {
    let mut evaluator = Evaluator {
        tokens: tokenize(source)?,
        pos: 0,
        context,
    };
    let value = evaluator.or()?;
    match evaluator.next() {
        None => Ok(value),
        other => Err(Evaluator::unexpected(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(source: &str) -> Result<Value, ExprError> {
        evaluate(source, &json!({"n": "3", "name": "app", "flag": "true", "items": ["a", "b"]}))
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("-n + 1"), Ok(Value::Number(-2.0)));
        assert_eq!(eval("7 % 4"), Ok(Value::Number(3.0)));
        assert_eq!(eval("7 % -3"), Ok(Value::Number(-2.0)));
        assert_eq!(eval("-7 % 3"), Ok(Value::Number(2.0)));
        assert_eq!(eval("7 % -3 == -2"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_comparisons_and_connectives() {
        assert_eq!(eval("n > 2 and n < 4"), Ok(Value::Bool(true)));
        assert_eq!(eval("n == 3 || false"), Ok(Value::Bool(true)));
        assert_eq!(eval("not flag"), Ok(Value::Bool(false)));
        assert_eq!(eval("name == 'app'"), Ok(Value::Bool(true)));
        assert_eq!(eval("name != \"lib\""), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            eval("[1, 'x']"),
            Ok(Value::List(vec![Value::Number(1.0), Value::Str("x".into())]))
        );
        assert_eq!(eval("[]"), Ok(Value::List(vec![])));
        assert_eq!(
            eval("items"),
            Ok(Value::List(vec![Value::Str("a".into()), Value::Str("b".into())]))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("missing > 1"), Err(ExprError::UnknownName("missing".into())));
        assert_eq!(eval("1 / 0"), Err(ExprError::DivisionByZero));
        assert!(matches!(eval("name < 1"), Err(ExprError::TypeMismatch { .. })));
        assert!(matches!(eval("'a' + 'b'"), Err(ExprError::TypeMismatch { .. })));
        assert!(eval("1 +").is_err());
        assert!(eval("(1").is_err());
        assert!(eval("1 2").is_err());
        assert_eq!(eval("__import__('os')"), Err(ExprError::UnknownName("__import__".into())));
        assert_eq!(eval("a = 1"), Err(ExprError::UnexpectedChar('=')));
    }
}
