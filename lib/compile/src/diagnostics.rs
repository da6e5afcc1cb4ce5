use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFile,
    term::{
        self,
        termcolor::{self, WriteColor},
    },
};
use core::fmt;
use std::{io, ops::Range};
use thiserror::Error;

pub type Spanned<T> = (T, Span);
pub type Span = Range<usize>;

pub trait ToDiagnostic {
    fn to_diagnostic(&self, span: &Span) -> Diagnostic<()>;
}

/// The piece of grammar a [`SyntaxError::Invalid`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    CreateTable,
    Insert,
    Select,
    Update,
    Delete,
    DropTable,
    Where,
    Join,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::CreateTable => write!(f, "CREATE TABLE syntax"),
            Grammar::Insert => write!(f, "INSERT syntax"),
            Grammar::Select => write!(f, "SELECT syntax"),
            Grammar::Update => write!(f, "UPDATE syntax"),
            Grammar::Delete => write!(f, "DELETE syntax"),
            Grammar::DropTable => write!(f, "DROP TABLE syntax"),
            Grammar::Where => write!(f, "WHERE clause"),
            Grammar::Join => write!(f, "JOIN clause"),
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SyntaxError {
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
    #[error("invalid {grammar}: {detail}")]
    Invalid { grammar: Grammar, detail: String },
    #[error("unsupported data type: {0}")]
    UnsupportedDataType(String),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unknown token: {0:?}")]
    UnknownToken(String),
}

impl ToDiagnostic for SyntaxError {
    fn to_diagnostic(&self, span: &Span) -> Diagnostic<()> {
        let mut diagnostic = Diagnostic::error()
            .with_code("Syntax Error: ")
            .with_message(self.to_string())
            .with_labels(vec![Label::primary((), span.clone())]);
        match self {
            SyntaxError::UnsupportedQuery(_) => {
                diagnostic = diagnostic.with_notes(vec![format!(
                    "expected: {}",
                    one_of(&[
                        "CREATE TABLE".to_string(),
                        "INSERT INTO".to_string(),
                        "SELECT".to_string(),
                        "UPDATE".to_string(),
                        "DELETE FROM".to_string(),
                        "DROP TABLE".to_string(),
                    ])
                )]);
            }
            SyntaxError::UnterminatedString => {
                diagnostic = diagnostic.with_notes(vec![String::from("expected: a closing quote")]);
            }
            SyntaxError::UnsupportedDataType(_) => {
                diagnostic = diagnostic.with_notes(vec![format!(
                    "expected: {}",
                    one_of(&[
                        "INT".to_string(),
                        "VARCHAR(n)".to_string(),
                        "BOOLEAN".to_string(),
                        "DATE".to_string(),
                    ])
                )]);
            }
            _ => {}
        };
        diagnostic
    }
}

fn one_of(strings: &[String]) -> String {
    let mut result = String::new();
    for (i, string) in strings.iter().enumerate() {
        if i > 0 {
            result.push_str(", ");
        }

        if i == strings.len() - 1 {
            result.push_str("or ");
        }
        result.push_str(string);
    }
    result
}

/// A [`SyntaxError`] located in the statement text.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{error}")]
pub struct ParseError {
    error: SyntaxError,
    span: Span,
}

impl ParseError {
    pub fn new(error: SyntaxError, span: Span) -> Self {
        Self { error, span }
    }

    pub fn error(&self) -> &SyntaxError {
        &self.error
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl From<Spanned<SyntaxError>> for ParseError {
    fn from((error, span): Spanned<SyntaxError>) -> Self {
        ParseError::new(error, span)
    }
}

pub fn report_errors(
    writer: &mut impl io::Write,
    source: &str,
    errors: &[ParseError],
) -> io::Result<()> {
    let mut buffer = termcolor::Buffer::ansi();
    for err in errors {
        report_error(&mut buffer, source, err)?;
    }
    writer.write_all(buffer.as_slice())
}

pub fn report_error(writer: &mut impl WriteColor, source: &str, error: &ParseError) -> io::Result<()> {
    let file = SimpleFile::new("<query>", source);
    let config = term::Config::default();
    let diagnostic = error.error().to_diagnostic(error.span());

    term::emit(writer, &config, &file, &diagnostic)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
