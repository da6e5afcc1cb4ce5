//! Recursive-descent parser for the SQL dialect.
//!
//! The grammar is small enough that every statement is parsed by a single
//! method on [`Parser`]. Errors carry the span of the offending token (or the
//! end of the input) so they can be rendered with [`crate::diagnostics`].

use crate::{
    ast::*,
    diagnostics::{Grammar, ParseError, Span, SyntaxError},
    lexer::{tokenize, Token, TokenKind},
    literal::parse_value,
};
use catalog::{Column, TableSchema};
use tracing::trace;
use ty::{DataTypeKind, Row, Value};

/// Parses one statement. A single trailing `;` is allowed; anything after it
/// is an error.
pub fn parse(sql: &str) -> Result<ParsedQuery, ParseError> {
    let mut parser = Parser::new(sql)?;
    let query = parser.parse_statement()?;
    trace!(kind = query.kind(), table = query.table(), "Parsed statement");
    Ok(query)
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(Parser {
            source,
            tokens: tokenize(source)?,
            current: 0,
        })
    }

    pub fn parse_statement(&mut self) -> Result<ParsedQuery, ParseError> {
        let (query, grammar) = match self.peek_kind() {
            Some(TokenKind::Create) if self.peek_kind_at(1) == Some(TokenKind::Table) => {
                self.advance_by(2);
                (self.create_table()?, Grammar::CreateTable)
            }
            Some(TokenKind::Insert) if self.peek_kind_at(1) == Some(TokenKind::Into) => {
                self.advance_by(2);
                (self.insert()?, Grammar::Insert)
            }
            Some(TokenKind::Select) => {
                self.advance_by(1);
                (self.select()?, Grammar::Select)
            }
            Some(TokenKind::Update) => {
                self.advance_by(1);
                (self.update()?, Grammar::Update)
            }
            Some(TokenKind::Delete) => {
                self.advance_by(1);
                self.expect(TokenKind::From, Grammar::Delete)?;
                (self.delete()?, Grammar::Delete)
            }
            Some(TokenKind::Drop) if self.peek_kind_at(1) == Some(TokenKind::Table) => {
                self.advance_by(2);
                (self.drop_table()?, Grammar::DropTable)
            }
            _ => return Err(self.unsupported()),
        };

        if self.peek_kind() == Some(TokenKind::Semi) {
            self.advance_by(1);
        }
        if let Some(token) = self.peek() {
            let span = token.span.clone();
            let detail = format!("unexpected {}", self.describe(token));
            return Err(ParseError::new(SyntaxError::Invalid { grammar, detail }, span));
        }

        Ok(query)
    }

    fn create_table(&mut self) -> Result<ParsedQuery, ParseError> {
        let grammar = Grammar::CreateTable;
        let name = self.identifier(grammar)?;
        self.expect(TokenKind::LParen, grammar)?;

        let mut columns = Vec::new();
        if self.peek_kind() == Some(TokenKind::RParen) {
            self.advance_by(1);
        } else {
            loop {
                columns.push(self.column_definition()?);
                match self.peek_kind() {
                    Some(TokenKind::Comma) => self.advance_by(1),
                    Some(TokenKind::RParen) => {
                        self.advance_by(1);
                        break;
                    }
                    _ => return Err(self.unexpected("',' or ')'", grammar)),
                }
            }
        }

        Ok(ParsedQuery::CreateTable(CreateTable {
            schema: TableSchema::new(&name, columns),
        }))
    }

    /// `<name> <type>[(<length>)] [modifiers]`, stopping before the `,` or `)`
    /// that ends the definition.
    fn column_definition(&mut self) -> Result<Column, ParseError> {
        let grammar = Grammar::CreateTable;
        let name = self.identifier(grammar)?;

        let type_token = self.expect(TokenKind::Ident, grammar)?;
        let type_name = self.text(&type_token);
        let column_type = DataTypeKind::from_sql(type_name).ok_or_else(|| {
            ParseError::new(
                SyntaxError::UnsupportedDataType(type_name.to_string()),
                type_token.span.clone(),
            )
        })?;

        let mut max_length = None;
        if column_type == DataTypeKind::VarChar && self.peek_kind() == Some(TokenKind::LParen) {
            self.advance_by(1);
            let length = self.expect(TokenKind::Number, grammar)?;
            let parsed = self.text(&length).parse::<u32>().map_err(|_| {
                self.invalid(grammar, "VARCHAR length must be a whole number", length.span.clone())
            })?;
            max_length = Some(parsed);
            self.expect(TokenKind::RParen, grammar)?;
        }

        let mut primary_key = false;
        let mut unique = false;
        let mut not_null = false;
        let mut depth = 0usize;
        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Ident => {
                    let word = self.text(&token);
                    let next = self.peek_word_at(1);
                    if word.eq_ignore_ascii_case("PRIMARY") && next_is(next, "KEY") {
                        primary_key = true;
                        self.advance_by(1);
                    } else if word.eq_ignore_ascii_case("NOT") && next_is(next, "NULL") {
                        not_null = true;
                        self.advance_by(1);
                    } else if word.eq_ignore_ascii_case("UNIQUE") {
                        unique = true;
                    }
                }
                _ => {}
            }
            self.advance_by(1);
        }

        let mut column = Column::builder()
            .column_name(name)
            .column_type(column_type)
            .primary_key(primary_key)
            .unique(unique)
            .auto_increment(primary_key)
            .nullable(!(primary_key || not_null))
            .build();
        column.set_max_length(max_length);

        Ok(column)
    }

    fn insert(&mut self) -> Result<ParsedQuery, ParseError> {
        let grammar = Grammar::Insert;
        let table = self.identifier(grammar)?;

        let columns = if self.peek_kind() == Some(TokenKind::LParen) {
            self.advance_by(1);
            let columns = self.separated(|parser| parser.identifier(grammar))?;
            self.expect(TokenKind::RParen, grammar)?;
            Some(columns)
        } else {
            None
        };

        self.expect(TokenKind::Values, grammar)?;
        self.expect(TokenKind::LParen, grammar)?;
        let values = self.separated(|parser| parser.value(grammar))?;
        self.expect(TokenKind::RParen, grammar)?;

        Ok(ParsedQuery::Insert(Insert {
            table,
            columns,
            values,
        }))
    }

    fn select(&mut self) -> Result<ParsedQuery, ParseError> {
        let grammar = Grammar::Select;
        let projection = if self.peek_kind() == Some(TokenKind::Star) {
            self.advance_by(1);
            Projection::All
        } else {
            Projection::Columns(self.separated(|parser| parser.projected_column())?)
        };

        self.expect(TokenKind::From, grammar)?;
        let table = self.identifier(grammar)?;

        let mut predicate = None;
        let mut join = None;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Where) if predicate.is_none() => {
                    self.advance_by(1);
                    predicate = Some(self.predicate()?);
                }
                Some(TokenKind::Join) if join.is_none() => {
                    self.advance_by(1);
                    join = Some(self.join()?);
                }
                _ => break,
            }
        }

        Ok(ParsedQuery::Select(Select {
            table,
            projection,
            predicate,
            join,
        }))
    }

    fn projected_column(&mut self) -> Result<String, ParseError> {
        let name = self.identifier(Grammar::Select)?;
        if self.peek_kind() == Some(TokenKind::Dot) {
            self.advance_by(1);
            let column = self.identifier(Grammar::Select)?;
            return Ok(format!("{}.{}", name, column));
        }
        Ok(name)
    }

    fn update(&mut self) -> Result<ParsedQuery, ParseError> {
        let grammar = Grammar::Update;
        let table = self.identifier(grammar)?;
        self.expect(TokenKind::Set, grammar)?;

        let pairs = self.separated(|parser| {
            let column = parser.identifier(grammar)?;
            parser.expect(TokenKind::Eq, grammar)?;
            let value = parser.value(grammar)?;
            Ok((column, value))
        })?;
        let mut assignments = Row::with_capacity(pairs.len());
        for (column, value) in pairs {
            assignments.insert(column, value);
        }

        let predicate = self.optional_predicate()?;

        Ok(ParsedQuery::Update(Update {
            table,
            assignments,
            predicate,
        }))
    }

    fn delete(&mut self) -> Result<ParsedQuery, ParseError> {
        let table = self.identifier(Grammar::Delete)?;
        let predicate = self.optional_predicate()?;
        Ok(ParsedQuery::Delete(Delete { table, predicate }))
    }

    fn drop_table(&mut self) -> Result<ParsedQuery, ParseError> {
        let table = self.identifier(Grammar::DropTable)?;
        Ok(ParsedQuery::DropTable(DropTable { table }))
    }

    fn optional_predicate(&mut self) -> Result<Option<Predicate>, ParseError> {
        if self.peek_kind() == Some(TokenKind::Where) {
            self.advance_by(1);
            return self.predicate().map(Some);
        }
        Ok(None)
    }

    fn predicate(&mut self) -> Result<Predicate, ParseError> {
        let grammar = Grammar::Where;
        let column = self.identifier(grammar)?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => ComparisonOp::Eq,
            Some(TokenKind::NotEq) => ComparisonOp::NotEq,
            Some(TokenKind::Gt) => ComparisonOp::Gt,
            Some(TokenKind::Lt) => ComparisonOp::Lt,
            Some(TokenKind::GtEq) => ComparisonOp::GtEq,
            Some(TokenKind::LtEq) => ComparisonOp::LtEq,
            _ => return Err(self.unexpected("a comparison operator", grammar)),
        };
        self.advance_by(1);
        let value = self.value(grammar)?;

        Ok(Predicate { column, op, value })
    }

    fn join(&mut self) -> Result<JoinSpec, ParseError> {
        let grammar = Grammar::Join;
        let table = self.identifier(grammar)?;
        self.expect(TokenKind::On, grammar)?;
        let left = self.column_ref(grammar)?;
        self.expect(TokenKind::Eq, grammar)?;
        let right = self.column_ref(grammar)?;

        Ok(JoinSpec { table, left, right })
    }

    fn column_ref(&mut self, grammar: Grammar) -> Result<ColumnRef, ParseError> {
        let table = self.identifier(grammar)?;
        self.expect(TokenKind::Dot, grammar)?;
        let column = self.identifier(grammar)?;
        Ok(ColumnRef { table, column })
    }

    /// A literal: a number, a quoted string or a bare word.
    fn value(&mut self, grammar: Grammar) -> Result<Value, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Number | TokenKind::String | TokenKind::Ident) => {
                let token = self.tokens[self.current].clone();
                self.advance_by(1);
                Ok(parse_value(self.text(&token)))
            }
            _ => Err(self.unexpected("a value", grammar)),
        }
    }

    /// One or more items separated by commas.
    fn separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance_by(1);
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn identifier(&mut self, grammar: Grammar) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::Ident, grammar)?;
        Ok(self.text(&token).to_string())
    }

    fn expect(&mut self, kind: TokenKind, grammar: Grammar) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.advance_by(1);
                Ok(token)
            }
            _ => Err(self.unexpected(kind.describe(), grammar)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_kind_at(0)
    }

    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.current + offset).map(|token| token.kind)
    }

    fn peek_word_at(&self, offset: usize) -> Option<&'a str> {
        self.tokens
            .get(self.current + offset)
            .filter(|token| token.kind == TokenKind::Ident)
            .map(|token| &self.source[token.span.clone()])
    }

    fn advance_by(&mut self, count: usize) {
        self.current = (self.current + count).min(self.tokens.len());
    }

    fn text(&self, token: &Token) -> &'a str {
        &self.source[token.span.clone()]
    }

    fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Ident | TokenKind::Number | TokenKind::String => {
                format!("'{}'", self.text(token))
            }
            kind => kind.describe().to_string(),
        }
    }

    fn end_span(&self) -> Span {
        let end = self.source.trim_end().len();
        end..end
    }

    fn unexpected(&self, expected: &str, grammar: Grammar) -> ParseError {
        let (found, span) = match self.peek() {
            Some(token) => (self.describe(token), token.span.clone()),
            None => ("end of input".to_string(), self.end_span()),
        };
        self.invalid(grammar, &format!("expected {}, found {}", expected, found), span)
    }

    fn invalid(&self, grammar: Grammar, detail: &str, span: Span) -> ParseError {
        ParseError::new(
            SyntaxError::Invalid {
                grammar,
                detail: detail.to_string(),
            },
            span,
        )
    }

    fn unsupported(&self) -> ParseError {
        let statement = self.source.trim();
        let span = match self.tokens.first() {
            Some(token) => token.span.clone(),
            None => self.end_span(),
        };
        ParseError::new(SyntaxError::UnsupportedQuery(statement.to_string()), span)
    }
}

fn next_is(word: Option<&str>, expected: &str) -> bool {
    word.map_or(false, |word| word.eq_ignore_ascii_case(expected))
}
