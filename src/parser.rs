//! Recursive-descent parser building the syntax tree from a token list.

use crate::ast::{
    AttributeValue, Attributes, Comparison, FileNode, FolderNode, ForLoopNode, InputNode,
    Node, OutputNode,
};
use crate::error::{Error, Result};
use crate::lexer::{tokenize, Keyword, Operator, Token, TokenKind};
use log::debug;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let eof = match tokens.last() {
            Some(last) => Token::new(TokenKind::Eof, "", last.line, last.column),
            None => Token::new(TokenKind::Eof, "", 1, 1),
        };
        Self {
            tokens,
            pos: 0,
            eof,
        }
    }

    /// Current token. Past the end of the slice this is a synthetic end-of-input token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let token = self.current();
        Error::ParseError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::String => format!("string \"{}\"", token.text),
            _ => format!("'{}'", token.text),
        }
    }

    fn expect_operator(&mut self, op: Operator, symbol: &str) -> Result<Token> {
        if self.current().is_operator(op) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected '{}', found {}",
                symbol,
                Self::describe(self.current())
            )))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Token> {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                what,
                Self::describe(self.current())
            )))
        }
    }

    /// Parses statements until end of input.
    pub fn parse(&mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        while !self.at_end() {
            nodes.push(self.parse_statement()?);
        }
        Ok(nodes)
    }

    fn parse_statement(&mut self) -> Result<Node> {
        match self.current().kind {
            TokenKind::Keyword(Keyword::Folder) => self.parse_folder(),
            TokenKind::Keyword(Keyword::File) => self.parse_file(),
            TokenKind::Keyword(Keyword::For) => self.parse_for_loop(),
            TokenKind::Keyword(Keyword::Stdout) => self.parse_output(),
            TokenKind::Keyword(Keyword::Stdin) => self.parse_input(),
            _ => Err(self.error(format!(
                "unexpected {}, expected a statement",
                Self::describe(self.current())
            ))),
        }
    }

    /// `{ statement* }`
    fn parse_block(&mut self) -> Result<Vec<Node>> {
        self.expect_operator(Operator::LBrace, "{")?;
        let mut children = Vec::new();
        while !self.current().is_operator(Operator::RBrace) {
            if self.at_end() {
                return Err(self.error("expected '}', found end of input"));
            }
            children.push(self.parse_statement()?);
        }
        self.advance();
        Ok(children)
    }

    fn parse_name(&mut self, what: &str) -> Result<String> {
        let token = self.current();
        match token.kind {
            TokenKind::Identifier | TokenKind::String => Ok(self.advance().text),
            TokenKind::Placeholder => Ok(format!("${{{}}}", self.advance().text)),
            _ => Err(self.error(format!(
                "expected {} name, found {}",
                what,
                Self::describe(token)
            ))),
        }
    }

    fn parse_optional_attributes(&mut self) -> Result<Attributes> {
        if self.current().is_operator(Operator::LParen) {
            self.parse_attributes()
        } else {
            Ok(Attributes::new())
        }
    }

    fn parse_folder(&mut self) -> Result<Node> {
        self.advance();
        let name = self.parse_name("folder")?;
        let attributes = self.parse_optional_attributes()?;
        let children = self.parse_block()?;
        Ok(Node::Folder(FolderNode {
            name,
            attributes,
            children,
        }))
    }

    fn parse_file(&mut self) -> Result<Node> {
        self.advance();
        let name = self.parse_name("file")?;
        let attributes = self.parse_optional_attributes()?;
        Ok(Node::File(FileNode { name, attributes }))
    }

    fn parse_output(&mut self) -> Result<Node> {
        self.advance();
        self.expect_operator(Operator::ShiftLeft, "<<")?;
        if self.current().kind != TokenKind::String {
            return Err(self.error(format!(
                "expected string after '<<', found {}",
                Self::describe(self.current())
            )));
        }
        let message = self.advance().text;
        Ok(Node::Output(OutputNode { message }))
    }

    fn parse_input(&mut self) -> Result<Node> {
        self.advance();
        self.expect_operator(Operator::ShiftRight, ">>")?;
        let variable = self.expect_identifier("variable name after '>>'")?.text;
        Ok(Node::Input(InputNode { variable }))
    }

    fn parse_loop_variable(&mut self, var_name: &str) -> Result<()> {
        let token = self.current();
        if token.kind != TokenKind::Identifier || token.text != var_name {
            return Err(self.error(format!(
                "expected loop variable '{}', found {}",
                var_name,
                Self::describe(token)
            )));
        }
        self.advance();
        Ok(())
    }

    fn parse_integer(&mut self, what: &str) -> Result<i64> {
        let negative = self.current().is_operator(Operator::Minus);
        if negative {
            self.advance();
        }
        let token = self.current();
        if token.kind != TokenKind::Number {
            return Err(self.error(format!(
                "expected numeric {}, found {}",
                what,
                Self::describe(token)
            )));
        }
        let text = if negative {
            format!("-{}", token.text)
        } else {
            token.text.clone()
        };
        let value = text
            .parse::<i64>()
            .map_err(|_| self.error(format!("expected integer {}, found '{}'", what, text)))?;
        self.advance();
        Ok(value)
    }

    /// `for [ i = 0 ; i < 10 ; i++ ] { ... }`
    fn parse_for_loop(&mut self) -> Result<Node> {
        self.advance();
        self.expect_operator(Operator::LBracket, "[")?;

        let var_name = self.expect_identifier("loop variable name")?.text;
        self.expect_operator(Operator::Assign, "=")?;
        let start = self.parse_integer("start value")?;
        self.expect_operator(Operator::Semicolon, ";")?;

        self.parse_loop_variable(&var_name)?;
        let condition = match self.current().kind {
            TokenKind::Operator(Operator::Lt) => Comparison::Lt,
            TokenKind::Operator(Operator::Le) => Comparison::Le,
            TokenKind::Operator(Operator::Gt) => Comparison::Gt,
            TokenKind::Operator(Operator::Ge) => Comparison::Ge,
            TokenKind::Operator(Operator::Ne) => Comparison::Ne,
            _ => {
                return Err(self.error(format!(
                    "unsupported comparison operator {}",
                    Self::describe(self.current())
                )))
            }
        };
        self.advance();
        let end = self.parse_integer("end value")?;
        self.expect_operator(Operator::Semicolon, ";")?;

        self.parse_loop_variable(&var_name)?;
        let step = match self.current().kind {
            TokenKind::Operator(Operator::Increment) => 1,
            TokenKind::Operator(Operator::Decrement) => -1,
            _ => {
                return Err(self.error(format!(
                    "expected '++' or '--', found {}",
                    Self::describe(self.current())
                )))
            }
        };
        self.advance();
        self.expect_operator(Operator::RBracket, "]")?;

        let children = self.parse_block()?;
        Ok(Node::ForLoop(ForLoopNode {
            var_name,
            start,
            end,
            condition,
            step,
            children,
        }))
    }

    /// `( name = value, ... )`; separating commas are optional.
    fn parse_attributes(&mut self) -> Result<Attributes> {
        self.expect_operator(Operator::LParen, "(")?;
        let mut attributes = Attributes::new();
        while !self.current().is_operator(Operator::RParen) {
            let name = self.expect_identifier("attribute name")?.text;
            self.expect_operator(Operator::Assign, "=")?;
            let value = self.parse_attribute_value()?;
            if attributes.insert(name.clone(), value).is_some() {
                debug!("Attribute '{}' given twice, keeping the last value", name);
            }
            if self.current().is_operator(Operator::Comma) {
                self.advance();
            }
        }
        self.advance();
        Ok(attributes)
    }

    fn parse_attribute_value(&mut self) -> Result<AttributeValue> {
        let token = self.current();
        match token.kind {
            TokenKind::String => Ok(AttributeValue::from_string(self.advance().text)),
            TokenKind::Number => {
                let value = token.text.parse::<i64>().map_err(|_| {
                    self.error(format!("expected integer value, found '{}'", token.text))
                })?;
                self.advance();
                Ok(AttributeValue::Integer(value))
            }
            TokenKind::Identifier => {
                let text = self.advance().text;
                Ok(match text.to_ascii_lowercase().as_str() {
                    "true" => AttributeValue::Boolean(true),
                    "false" => AttributeValue::Boolean(false),
                    "null" => AttributeValue::Null,
                    _ => AttributeValue::from_string(text),
                })
            }
            _ => Err(self.error(format!(
                "unsupported attribute value {}",
                Self::describe(token)
            ))),
        }
    }
}

/// Parses a token list into top-level statements.
///
/// # Errors
/// * `Error::ParseError` with the position of the offending token
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>> {
    let nodes = Parser::new(tokens).parse()?;
    debug!("Parsed {} top-level statements", nodes.len());
    Ok(nodes)
}

/// Tokenizes and parses `source` in one step.
pub fn parse_source(source: &str) -> Result<Vec<Node>> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}
