//! Literal values as they appear in statements.

use ty::Value;

/// Interprets a single raw literal token.
///
/// Quoted text is taken verbatim (no escapes), `true`/`false` become booleans
/// in any case, finite numbers become integers when integral and floats
/// otherwise. Everything else, including `NULL`, is kept as text.
///
/// ```
/// use compile::literal::parse_value;
/// use ty::Value;
///
/// assert_eq!(parse_value("'John'"), Value::Text("John".to_string()));
/// assert_eq!(parse_value("30"), Value::Integer(30));
/// assert_eq!(parse_value("TRUE"), Value::Boolean(true));
/// ```
pub fn parse_value(raw: &str) -> Value {
    if let Some(text) = unquote(raw) {
        return Value::Text(text.to_string());
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    parse_number(raw).unwrap_or_else(|| Value::Text(raw.to_string()))
}

fn unquote(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if first == last && (first == b'\'' || first == b'"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::Integer(int));
    }

    // `f64::from_str` also accepts "inf" and "NaN".
    if !raw.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) {
        return None;
    }
    let float = raw.parse::<f64>().ok().filter(|float| float.is_finite())?;

    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(Value::Integer(float as i64))
    } else {
        Some(Value::Float(float))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn test_quoted_text_is_verbatim() {
        assert_eq!(parse_value("'hello world'"), Value::Text("hello world".into()));
        assert_eq!(parse_value("\"O'Brien\""), Value::Text("O'Brien".into()));
        assert_eq!(parse_value("'42'"), Value::Text("42".into()));
        assert_eq!(parse_value("'true'"), Value::Text("true".into()));
        assert_eq!(parse_value("''"), Value::Text("".into()));
    }

    #[test]
    fn test_mismatched_quotes_are_not_stripped() {
        assert_eq!(parse_value("'abc\""), Value::Text("'abc\"".into()));
        assert_eq!(parse_value("'"), Value::Text("'".into()));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_value("true"), Value::Boolean(true));
        assert_eq!(parse_value("False"), Value::Boolean(false));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_value("30"), Value::Integer(30));
        assert_eq!(parse_value("-7"), Value::Integer(-7));
        assert_eq!(parse_value("19.99"), Value::Float(19.99));
        assert_eq!(parse_value("3.0"), Value::Integer(3));
        assert_eq!(parse_value("1e3"), Value::Integer(1000));
        assert_eq!(parse_value("2.5e-1"), Value::Float(0.25));
    }

    #[test]
    fn test_non_finite_numbers_stay_text() {
        assert_eq!(parse_value("inf"), Value::Text("inf".into()));
        assert_eq!(parse_value("NaN"), Value::Text("NaN".into()));
        assert_eq!(parse_value("1e999"), Value::Text("1e999".into()));
    }

    #[test]
    fn test_bare_words_are_text() {
        assert_eq!(parse_value("NULL"), Value::Text("NULL".into()));
        assert_eq!(parse_value("hello"), Value::Text("hello".into()));
        assert_eq!(parse_value(""), Value::Text("".into()));
    }

    #[test]
    fn test_literals_read_back() {
        let values = [
            Value::Text("John".into()),
            Value::Text("it's".into()),
            Value::Integer(-12),
            Value::Float(0.5),
            Value::Boolean(true),
        ];
        for value in values {
            assert_eq!(parse_value(&value.to_literal()), value);
        }
    }
}
