use crate::lexer::SourceRange;
use ariadne::{Label, Report, ReportKind, Source};
use std::fmt;
use std::ops::Range;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Lexer,
    Parser,
    UnknownInstruction,
    MalformedInstruction,
    UnknownRegister,
    UndefinedLabel,
}

impl ErrorType {
    /// Build-time errors are raised before a program exists, so no register file was touched.
    pub fn is_build_time(&self) -> bool {
        use ErrorType::*;

        matches!(
            self,
            Lexer | Parser | UnknownInstruction | MalformedInstruction
        )
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorType::*;

        let name = match self {
            Lexer => "lexer error",
            Parser => "parser error",
            UnknownInstruction => "unknown instruction",
            MalformedInstruction => "malformed instruction",
            UnknownRegister => "unknown register",
            UndefinedLabel => "undefined label",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub error_type: ErrorType,
    pub message: String,
    pub range: Option<SourceRange>,
}

impl Error {
    pub fn new(error_type: ErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            range: None,
        }
    }

    pub fn new_with_range(error_type: ErrorType, message: String, range: SourceRange) -> Self {
        Self {
            error_type,
            message,
            range: Some(range),
        }
    }

    /// Attaches a source range unless the error already points somewhere more precise.
    pub fn or_range(mut self, range: Option<SourceRange>) -> Self {
        if self.range.is_none() {
            self.range = range;
        }
        self
    }

    pub fn print(&self, file: &str, source: &str) -> std::io::Result<()> {
        match self.range {
            Some(range) => Report::build(ReportKind::Error, file, range.start)
                .with_message(self.error_type.to_string())
                .with_label(
                    Label::new((file, Range::<usize>::from(range))).with_message(&self.message),
                )
                .finish()
                .eprint((file, Source::from(source))),
            None => {
                eprintln!("error: {}", self.message);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for Error {}
