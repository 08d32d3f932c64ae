use crate::{
    error::{Error, ErrorType, Result},
    lexer::{SourceRange, Token, TokenType},
    program::{Argument, Declaration},
};

/// Turns a token stream into declarations, one per non-empty line.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    index: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn end_range(&self) -> SourceRange {
        self.tokens
            .last()
            .map(|t| SourceRange::new(t.range.end, t.range.end))
            .unwrap_or(SourceRange::new(0, 0))
    }

    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.index)
    }

    fn peeks(&self, i: usize) -> Option<&'a Token<'a>> {
        self.tokens.get(self.index + i)
    }

    fn consume(&mut self, expected: &str) -> Result<&'a Token<'a>> {
        match self.peek() {
            Some(token) => {
                self.index += 1;
                Ok(token)
            }
            None => Err(Error::new_with_range(
                ErrorType::Parser,
                format!("Expected {}, found end of file", expected),
                self.end_range(),
            )),
        }
    }

    fn consume_assert(&mut self, token_type: TokenType, expected: &str) -> Result<&'a Token<'a>> {
        let token = self.consume(expected)?;
        if token.token_type != token_type {
            return Err(Error::new_with_range(
                ErrorType::Parser,
                format!("Expected {}, found {}", expected, describe(token)),
                token.range,
            ));
        }
        Ok(token)
    }

    fn skip_newlines(&mut self) {
        while let Some(token) = self.peek() {
            if token.token_type != TokenType::Newline {
                break;
            }
            self.index += 1;
        }
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => self
                .consume_assert(TokenType::Newline, "end of line")
                .map(|_| ()),
        }
    }

    fn parse_argument(&mut self) -> Result<(Argument, SourceRange)> {
        let token = self.consume("operand")?;
        match token.token_type {
            TokenType::Identifier => Ok((Argument::Name(token.value.to_string()), token.range)),
            TokenType::IntegerLiteral => {
                let value = token.value.parse::<i64>().map_err(|_| {
                    Error::new_with_range(
                        ErrorType::Parser,
                        format!("Integer literal '{}' is out of range", token.value),
                        token.range,
                    )
                })?;
                Ok((Argument::Integer(value), token.range))
            }
            _ => Err(Error::new_with_range(
                ErrorType::Parser,
                format!("Expected operand, found {}", describe(token)),
                token.range,
            )),
        }
    }

    fn parse_label(&mut self) -> Result<Declaration> {
        let keyword = self.consume_assert(TokenType::Label, "'label'")?;
        let name = self.consume_assert(TokenType::Identifier, "label name")?;
        self.end_of_line()?;

        Ok(Declaration::Label {
            name: name.value.to_string(),
            range: Some(keyword.range.expand(&name.range)),
        })
    }

    fn parse_instruction_or_label(&mut self) -> Result<Declaration> {
        let mnemonic = self.consume_assert(TokenType::Identifier, "instruction")?;

        if let Some(colon) = self.peek().filter(|t| t.token_type == TokenType::Colon) {
            self.index += 1;
            self.end_of_line()?;

            return Ok(Declaration::Label {
                name: mnemonic.value.to_string(),
                range: Some(mnemonic.range.expand(&colon.range)),
            });
        }

        let mut range = mnemonic.range;
        let mut arguments = vec![];

        if self
            .peek()
            .map_or(false, |t| t.token_type != TokenType::Newline)
        {
            loop {
                let (argument, argument_range) = self.parse_argument()?;
                arguments.push(argument);
                range = range.expand(&argument_range);

                match self.peek() {
                    Some(t) if t.token_type == TokenType::Comma => self.index += 1,
                    _ => break,
                }
            }
        }

        self.end_of_line()?;

        Ok(Declaration::Instruction {
            mnemonic: mnemonic.value.to_string(),
            arguments,
            range: Some(range),
        })
    }

    pub fn parse_declaration(&mut self) -> Result<Declaration> {
        self.skip_newlines();

        match self.peek().map(|t| t.token_type) {
            Some(TokenType::Label) => {
                if self.peeks(1).map(|t| t.token_type) == Some(TokenType::Colon) {
                    let token = self.consume("'label'")?;
                    return Err(Error::new_with_range(
                        ErrorType::Parser,
                        "'label' is reserved and cannot name a label".to_string(),
                        token.range,
                    ));
                }
                self.parse_label()
            }
            _ => self.parse_instruction_or_label(),
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Declaration>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_newlines();

        if self.eof() {
            return None;
        }

        Some(self.parse_declaration())
    }
}

fn describe(token: &Token<'_>) -> String {
    match token.token_type {
        TokenType::Newline => "end of line".to_string(),
        _ => format!("'{}'", token.value),
    }
}

/// Lexes and parses `source` into its declarations.
pub fn parse(source: &str) -> Result<Vec<Declaration>> {
    let tokens = crate::lexer::lex(source)?;
    Parser::new(&tokens).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(mnemonic: &str, arguments: Vec<Argument>, range: (usize, usize)) -> Declaration {
        Declaration::Instruction {
            mnemonic: mnemonic.to_string(),
            arguments,
            range: Some(SourceRange::new(range.0, range.1)),
        }
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("\n\n  ; only a comment\n").unwrap(), vec![]);
    }

    #[test]
    fn parse_instructions() {
        let declarations = parse("mov ax, 5\ninc bx\ncmp 1, -2").unwrap();

        assert_eq!(
            declarations,
            vec![
                instruction("mov", vec!["ax".into(), 5.into()], (0, 9)),
                instruction("inc", vec!["bx".into()], (10, 16)),
                instruction("cmp", vec![1.into(), (-2).into()], (17, 26)),
            ]
        );
    }

    #[test]
    fn parse_labels() {
        let declarations = parse("label start\nend:").unwrap();

        assert_eq!(
            declarations,
            vec![
                Declaration::Label {
                    name: "start".to_string(),
                    range: Some(SourceRange::new(0, 11)),
                },
                Declaration::Label {
                    name: "end".to_string(),
                    range: Some(SourceRange::new(12, 16)),
                },
            ]
        );
    }

    #[test]
    fn parse_keeps_arity_for_the_builder() {
        let declarations = parse("inc ax, 1, 2\njmp").unwrap();

        assert_eq!(
            declarations,
            vec![
                instruction("inc", vec!["ax".into(), 1.into(), 2.into()], (0, 12)),
                instruction("jmp", vec![], (13, 16)),
            ]
        );
    }

    #[test]
    fn parse_missing_operand() {
        let error = parse("mov ax,").unwrap_err();
        assert_eq!(error.error_type, ErrorType::Parser);
        assert_eq!(error.message, "Expected operand, found end of file");

        let error = parse("mov ax,\ninc bx").unwrap_err();
        assert_eq!(error.message, "Expected operand, found end of line");
    }

    #[test]
    fn parse_two_instructions_on_one_line() {
        let error = parse("mov ax, 1 inc ax").unwrap_err();

        assert_eq!(error.message, "Expected end of line, found 'inc'");
        assert_eq!(error.range, Some(SourceRange::new(10, 13)));
    }

    #[test]
    fn parse_integer_out_of_range() {
        let error = parse("mov ax, 99999999999999999999").unwrap_err();
        assert_eq!(
            error.message,
            "Integer literal '99999999999999999999' is out of range"
        );
    }

    #[test]
    fn parse_reserved_label_name() {
        let error = parse("label:").unwrap_err();
        assert_eq!(error.message, "'label' is reserved and cannot name a label");

        let error = parse("label label").unwrap_err();
        assert_eq!(error.message, "Expected label name, found 'label'");

        let error = parse("jmp label").unwrap_err();
        assert_eq!(error.message, "Expected operand, found 'label'");
        assert_eq!(error.range, Some(SourceRange::new(4, 9)));
    }
}
