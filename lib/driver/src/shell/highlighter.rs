use compile::lexer::TokenKind;
use logos::Logos;
use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

/// Highlights input with the dialect's own lexer, so keywords light up
/// exactly when the parser would treat them as keywords.
pub(crate) struct SqlHighlighter;

/// Words that lex as identifiers but carry meaning inside a statement.
const CONTEXTUAL_KEYWORDS: &[&str] = &[
    "INT", "INTEGER", "VARCHAR", "BOOLEAN", "BOOL", "DATE", "PRIMARY", "KEY", "UNIQUE", "NOT",
    "NULL", "TRUE", "FALSE",
];

fn style_for(kind: Option<TokenKind>, text: &str) -> Style {
    match kind {
        Some(TokenKind::Number | TokenKind::Star) => Style::new().fg(Color::Yellow),
        Some(TokenKind::String) => Style::new().fg(Color::LightRed),
        Some(
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq,
        ) => Style::new().fg(Color::Magenta),
        Some(
            TokenKind::Comma | TokenKind::Semi | TokenKind::LParen | TokenKind::RParen | TokenKind::Dot,
        ) => Style::new().fg(Color::DarkGray),
        Some(TokenKind::Ident)
            if CONTEXTUAL_KEYWORDS
                .iter()
                .any(|keyword| keyword.eq_ignore_ascii_case(text)) =>
        {
            Style::new().fg(Color::Green)
        }
        Some(TokenKind::Ident) => Style::new().fg(Color::LightBlue),
        Some(_) => Style::new().fg(Color::Green),
        None => Style::new().fg(Color::Red).underline(),
    }
}

impl Highlighter for SqlHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut last = 0;

        for (token, span) in TokenKind::lexer(line).spanned() {
            if span.start > last {
                styled_text.push((Style::new(), line[last..span.start].to_string()));
            }
            let text = &line[span.clone()];
            styled_text.push((style_for(token.ok(), text), text.to_string()));
            last = span.end;
        }
        if last < line.len() {
            styled_text.push((Style::new().fg(Color::DarkGray), line[last..].to_string()));
        }

        styled_text
    }
}
