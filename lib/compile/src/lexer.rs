use crate::diagnostics::{ParseError, Span, SyntaxError};
use logos::{Lexer, Logos};
use thiserror::Error;

#[derive(Debug, Default, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Unknown token")]
    #[default]
    UnknownToken,
    #[error("Unterminated string literal")]
    UnterminatedString,
}

fn unterminated(_: &mut Lexer<TokenKind>) -> Result<(), LexerError> {
    Err(LexerError::UnterminatedString)
}

/// Token kinds of the SQL dialect. Literal tokens carry no payload: their text
/// is recovered from the span and handed to [`crate::literal::parse_value`].
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(error = LexerError)]
pub enum TokenKind {
    #[regex(r"[ \r\n\t\f]+", logos::skip)]
    #[regex(r"--[^\n]*", logos::skip)]
    Ignored,

    #[token("SELECT", ignore(ascii_case))]
    Select,
    #[token("FROM", ignore(ascii_case))]
    From,
    #[token("WHERE", ignore(ascii_case))]
    Where,
    #[token("INSERT", ignore(ascii_case))]
    Insert,
    #[token("INTO", ignore(ascii_case))]
    Into,
    #[token("VALUES", ignore(ascii_case))]
    Values,
    #[token("UPDATE", ignore(ascii_case))]
    Update,
    #[token("SET", ignore(ascii_case))]
    Set,
    #[token("DELETE", ignore(ascii_case))]
    Delete,
    #[token("CREATE", ignore(ascii_case))]
    Create,
    #[token("DROP", ignore(ascii_case))]
    Drop,
    #[token("TABLE", ignore(ascii_case))]
    Table,
    #[token("JOIN", ignore(ascii_case))]
    Join,
    #[token("ON", ignore(ascii_case))]
    On,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"'[^']*'")]
    #[regex(r#""[^"]*""#)]
    String,

    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("*")]
    Star,
    #[token(".")]
    Dot,

    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r"'[^']*", unterminated)]
    #[regex(r#""[^"]*"#, unterminated)]
    UnterminatedString,
}

impl TokenKind {
    /// Human readable name used in "expected ..., found ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ignored => "whitespace",
            TokenKind::Select => "SELECT",
            TokenKind::From => "FROM",
            TokenKind::Where => "WHERE",
            TokenKind::Insert => "INSERT",
            TokenKind::Into => "INTO",
            TokenKind::Values => "VALUES",
            TokenKind::Update => "UPDATE",
            TokenKind::Set => "SET",
            TokenKind::Delete => "DELETE",
            TokenKind::Create => "CREATE",
            TokenKind::Drop => "DROP",
            TokenKind::Table => "TABLE",
            TokenKind::Join => "JOIN",
            TokenKind::On => "ON",
            TokenKind::Number => "a number",
            TokenKind::Ident => "an identifier",
            TokenKind::String => "a string",
            TokenKind::Eq => "'='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Star => "'*'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Semi => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::UnterminatedString => "an unterminated string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Splits `source` into tokens, failing on the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    TokenKind::lexer(source)
        .spanned()
        .map(|(kind, span)| match kind {
            Ok(kind) => Ok(Token { kind, span }),
            Err(LexerError::UnterminatedString) => {
                Err(ParseError::new(SyntaxError::UnterminatedString, span))
            }
            Err(LexerError::UnknownToken) => Err(ParseError::new(
                SyntaxError::UnknownToken(source[span.clone()].to_string()),
                span,
            )),
        })
        .collect()
}


#[cfg(test)]
mod error_cases {
    use super::*;
    use pretty_assertions_sorted::assert_eq;
    use TokenKind::*;

    #[test]
    fn test_unterminated_string() {
        let lexer = TokenKind::lexer("'This is an unterminated string");

        let tokens = lexer.spanned().collect::<Vec<_>>();

        assert_eq!(tokens, &[(Err(LexerError::UnterminatedString), 0..31)],);
    }

    #[test]
    fn test_unexpected_token() {
        let lexer = TokenKind::lexer("SELECT * FROM @");

        let tokens = lexer.spanned().collect::<Vec<_>>();

        assert_eq!(
            tokens,
            &[
                (Ok(Select), 0..6),
                (Ok(Star), 7..8),
                (Ok(From), 9..13),
                (Err(LexerError::UnknownToken), 14..15),
            ],
        );
    }

    #[test]
    fn test_tokenize_reports_span() {
        let err = tokenize("SELECT * FROM users WHERE name = 'John").unwrap_err();

        assert_eq!(err.error(), &SyntaxError::UnterminatedString);
        assert_eq!(err.span(), &(33..38));
    }
}
