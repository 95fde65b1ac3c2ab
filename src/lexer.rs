//! Tokenizer for rule text

use std::fmt;
use std::ops::Range;

use crate::ast::{Comparator, LogicalOperator};
use crate::error::{Result, RuleError};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Number(f64),
    /// Quoted text, quotes stripped
    String(String),
    Operator(LogicalOperator),
    Comparator(Comparator),
    LParen,
    RParen,
    End,
}

impl Token {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string '{}'", s),
            Token::Operator(op) => format!("'{}'", op),
            Token::Comparator(c) => format!("'{}'", c),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "Identifier({})", name),
            Token::Number(n) => write!(f, "Number({})", n),
            Token::String(s) => write!(f, "String({})", s),
            Token::Operator(op) => write!(f, "Operator({})", op),
            Token::Comparator(c) => write!(f, "Comparator({})", c),
            Token::LParen => write!(f, "LParen"),
            Token::RParen => write!(f, "RParen"),
            Token::End => write!(f, "End"),
        }
    }
}

/// A token and the byte range of rule text it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Split rule text into tokens. The result always ends with [`Token::End`],
/// whose span is empty and sits at `input.len()`.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>> {
    let mut lexer = Lexer { src: input, pos: 0 };
    let mut lexemes = Vec::new();
    loop {
        let lexeme = lexer.next_lexeme()?;
        let done = lexeme.token == Token::End;
        lexemes.push(lexeme);
        if done {
            return Ok(lexemes);
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_lexeme(&mut self) -> Result<Lexeme> {
        let skipped = self.rest().len() - self.rest().trim_start().len();
        self.pos += skipped;

        let start = self.pos;
        let token = match self.peek() {
            None => Token::End,
            Some('(') => {
                self.pos += 1;
                Token::LParen
            }
            Some(')') => {
                self.pos += 1;
                Token::RParen
            }
            Some('>' | '<' | '=' | '!') => self.comparator()?,
            Some(quote @ ('\'' | '"')) => self.string(quote)?,
            Some('-' | '0'..='9') => self.number()?,
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.word(),
            Some(c) => {
                return Err(RuleError::lex(
                    self.src,
                    start,
                    format!("unexpected character '{}'", c),
                ))
            }
        };

        Ok(Lexeme {
            token,
            span: start..self.pos,
        })
    }

    fn comparator(&mut self) -> Result<Token> {
        // two-character forms first so '>=' never lexes as '>' '='
        for symbol in [">=", "<=", "!=", ">", "<", "="] {
            if self.rest().starts_with(symbol) {
                self.pos += symbol.len();
                // symbols come from the comparator table
                return Comparator::from_symbol(symbol)
                    .map(Token::Comparator)
                    .ok_or_else(|| RuleError::lex(self.src, self.pos, "unknown comparator"));
            }
        }
        Err(RuleError::lex(self.src, self.pos, "expected '=' after '!'"))
    }

    fn string(&mut self, quote: char) -> Result<Token> {
        let start = self.pos;
        let body = &self.rest()[1..];
        match body.find(quote) {
            Some(end) => {
                let text = body[..end].to_string();
                self.pos += end + 2;
                Ok(Token::String(text))
            }
            None => Err(RuleError::lex(
                self.src,
                start,
                format!("unterminated string literal, missing closing {}", quote),
            )),
        }
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        if self.eat_digits() == 0 {
            return Err(RuleError::lex(self.src, self.pos, "expected digit"));
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            if self.eat_digits() == 0 {
                return Err(RuleError::lex(
                    self.src,
                    self.pos - 1,
                    "expected digits after decimal point",
                ));
            }
        }

        let text = &self.src[start..self.pos];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            Ok(_) => Err(RuleError::lex(self.src, start, "number out of range")),
            Err(e) => Err(RuleError::lex(self.src, start, format!("invalid number: {}", e))),
        }
    }

    fn eat_digits(&mut self) -> usize {
        let count = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        self.pos += count;
        count
    }

    fn word(&mut self) -> Token {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let word = &self.rest()[..len];
        self.pos += len;

        match word {
            "AND" => Token::Operator(LogicalOperator::And),
            "OR" => Token::Operator(LogicalOperator::Or),
            _ => Token::Identifier(word.to_string()),
        }
    }
}
