use crate::error::{Error, ErrorType, Result};
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
    #[regex("[ \t\r]+")]
    Whitespace,
    #[regex(";[^\n]*")]
    Comment,
    #[token("\n")]
    Newline,

    #[token("label")]
    Label,

    #[regex("-?[0-9]+")]
    IntegerLiteral,
    #[regex("[a-zA-Z_][_0-9a-zA-Z]*")]
    Identifier,

    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn expand(&self, other: &Self) -> Self {
        SourceRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for SourceRange {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<SourceRange> for Range<usize> {
    fn from(range: SourceRange) -> Self {
        range.start..range.end
    }
}

#[derive(Debug)]
pub struct Token<'a> {
    pub token_type: TokenType,
    pub value: &'a str,
    pub range: SourceRange,
}

impl<'a> Token<'a> {
    pub fn new(token_type: TokenType, value: &'a str, range: SourceRange) -> Self {
        Self {
            token_type,
            value,
            range,
        }
    }
}

impl<'a> PartialEq for Token<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type && self.range == other.range
    }
}

pub fn lex(input: &str) -> Result<Vec<Token<'_>>> {
    let mut lex = TokenType::lexer(input);

    let mut tokens = vec![];

    while let Some(token_type) = lex.next() {
        match token_type {
            Err(_) => {
                return Err(Error::new_with_range(
                    ErrorType::Lexer,
                    format!("Unknown character '{}'", lex.slice()),
                    lex.span().into(),
                ))
            }
            Ok(TokenType::Whitespace) | Ok(TokenType::Comment) => continue,
            Ok(token_type) => tokens.push(Token::new(token_type, lex.slice(), lex.span().into())),
        }
    }

    Ok(tokens)
}
