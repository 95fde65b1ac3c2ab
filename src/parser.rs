//! Recursive-descent parser for rule text
//!
//! ```text
//! expression := or_expr
//! or_expr    := and_expr ( "OR" and_expr )*
//! and_expr   := term ( "AND" term )*
//! term       := "(" expression ")" | comparison
//! comparison := identifier comparator literal
//! literal    := number | quoted_string
//! ```
//!
//! AND binds tighter than OR and both fold left, so `a AND b AND c` is
//! `(a AND b) AND c`.

use crate::ast::{Comparison, Literal, LogicalOperator, Node};
use crate::error::{Result, RuleError};
use crate::lexer::{tokenize, Lexeme, Token};

/// Parenthesis nesting allowed by [`parse`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest parenthesis nesting accepted before failing with `TooDeep`
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub fn parse(input: &str) -> Result<Node> {
    parse_with(input, ParseOptions::default())
}

pub fn parse_with(input: &str, options: ParseOptions) -> Result<Node> {
    let lexemes = tokenize(input)?;
    let mut parser = Parser {
        src: input,
        lexemes,
        cursor: 0,
        depth: 0,
        options,
    };

    let node = parser.expression()?;
    parser.expect_end()?;
    Ok(node)
}

struct Parser<'a> {
    src: &'a str,
    // never empty: tokenize always terminates the stream with End
    lexemes: Vec<Lexeme>,
    cursor: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Lexeme {
        let last = self.lexemes.len() - 1;
        &self.lexemes[self.cursor.min(last)]
    }

    fn advance(&mut self) -> Lexeme {
        let lexeme = self.peek().clone();
        if lexeme.token != Token::End {
            self.cursor += 1;
        }
        lexeme
    }

    fn error_here(&self, reason: impl Into<String>) -> RuleError {
        RuleError::parse(self.src, self.peek().span.start, reason)
    }

    fn eat_operator(&mut self, operator: LogicalOperator) -> bool {
        if self.peek().token == Token::Operator(operator) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Result<Node> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Node> {
        let mut node = self.and_expr()?;
        while self.eat_operator(LogicalOperator::Or) {
            let right = self.and_expr()?;
            node = Node::or(node, right);
        }
        Ok(node)
    }

    fn and_expr(&mut self) -> Result<Node> {
        let mut node = self.term()?;
        while self.eat_operator(LogicalOperator::And) {
            let right = self.term()?;
            node = Node::and(node, right);
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Node> {
        if self.peek().token != Token::LParen {
            return self.comparison();
        }

        let open = self.advance().span.start;
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(RuleError::too_deep(self.src, open, self.options.max_depth));
        }

        let node = self.expression()?;
        if self.peek().token != Token::RParen {
            return Err(self.error_here(format!(
                "expected ')' to close '(' at position {}, found {}",
                open,
                self.peek().token.describe()
            )));
        }
        self.advance();
        self.depth -= 1;
        Ok(node)
    }

    fn comparison(&mut self) -> Result<Node> {
        let attribute = match &self.peek().token {
            Token::Identifier(name) => name.clone(),
            other => {
                return Err(self.error_here(format!(
                    "expected attribute name or '(', found {}",
                    other.describe()
                )))
            }
        };
        self.advance();

        let comparator = match &self.peek().token {
            Token::Comparator(c) => *c,
            other => {
                return Err(self.error_here(format!(
                    "expected comparator (>, <, >=, <=, =, !=) after '{}', found {}",
                    attribute,
                    other.describe()
                )))
            }
        };
        self.advance();

        let value = match &self.peek().token {
            Token::Number(n) => Literal::Number(*n),
            Token::String(s) => Literal::Text(s.clone()),
            other => {
                return Err(self.error_here(format!(
                    "expected literal (number or quoted string) after '{}', found {}",
                    comparator,
                    other.describe()
                )))
            }
        };
        self.advance();

        Ok(Node::Comparison(Comparison::new(attribute, comparator, value)))
    }

    fn expect_end(&self) -> Result<()> {
        match &self.peek().token {
            Token::End => Ok(()),
            Token::RParen => Err(self.error_here("unmatched ')'")),
            other => Err(self.error_here(format!(
                "expected AND, OR or end of input, found {}",
                other.describe()
            ))),
        }
    }
}
