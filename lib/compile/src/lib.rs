//! # Statement Compilation
//!
//! Turns SQL text into a [`ParsedQuery`]: [`lexer`] splits the text into
//! tokens, [`parser`] builds the structured query, and [`literal`] interprets
//! literal tokens. Failures are [`ParseError`]s carrying a byte span, which
//! [`diagnostics`] renders with `codespan-reporting`.
//!
//! ```
//! use compile::{parse, ast::ParsedQuery};
//!
//! let query = parse("SELECT * FROM users WHERE age > 25").unwrap();
//! assert!(matches!(query, ParsedQuery::Select(_)));
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod literal;
pub mod parser;

pub use ast::ParsedQuery;
pub use diagnostics::{report_error, report_errors, ParseError, SyntaxError};
pub use literal::parse_value;
pub use parser::parse;
