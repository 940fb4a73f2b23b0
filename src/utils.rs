//! Useful functions for parsing and accounting.

use crate::{Date, Decimal, Error, ErrorType, Source};

/// Parses a [`Decimal`](crate::Decimal) from a [`&str`]. Amounts that
/// cannot be represented without rounding are rejected.
#[inline]
pub fn parse_decimal(num_str: &str, src: &Source) -> Result<Decimal, Error> {
    Decimal::from_str_exact(num_str).map_err(|_| {
        Error::new(
            ErrorType::Syntax,
            format!("Invalid number: {}.", num_str),
            src.clone(),
        )
    })
}

/// Parses a date written as `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_date(date_str: &str, src: &Source) -> Result<Date, Error> {
    let format = if date_str.contains('/') {
        "%Y/%m/%d"
    } else {
        "%Y-%m-%d"
    };
    Date::parse_from_str(date_str, format).map_err(|_| {
        Error::new(
            ErrorType::Syntax,
            format!("Invalid date: {}.", date_str),
            src.clone(),
        )
    })
}

#[inline]
pub fn remove_quotes(input: &str) -> &str {
    let mut chars = input.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Strips the `;` (or legacy `//`) delimiter and surrounding blanks from a
/// comment token.
pub fn comment_text(token_text: &str) -> &str {
    token_text
        .strip_prefix(';')
        .or_else(|| token_text.strip_prefix("//"))
        .unwrap_or(token_text)
        .trim()
}

/// Key used for case-insensitive lookups of commodity symbols and account
/// names.
#[inline]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;
    use std::sync::Arc;

    fn src() -> Source {
        Source::file_start(Arc::new("utils.luca".to_string()))
    }

    #[test]
    fn dates_accept_both_separators() {
        let dashed = parse_date("2024-03-21", &src()).unwrap();
        let slashed = parse_date("2024/03/21", &src()).unwrap();
        assert_eq!(dashed, slashed);
        assert_eq!(
            parse_date("2024-13-01", &src()).unwrap_err().r#type,
            ErrorType::Syntax
        );
    }

    #[test]
    fn decimals_keep_their_scale() {
        assert_eq!(parse_decimal("25.00", &src()).unwrap().to_string(), "25.00");
        assert!(parse_decimal("2.5.0", &src()).is_err());
    }

    #[test]
    fn decimals_are_never_rounded() {
        let tiny = parse_decimal("0.0000000000000000000000000001", &src()).unwrap();
        assert_eq!(tiny.scale(), 28);
        assert!(!tiny.is_zero());
        let err = parse_decimal("0.00000000000000000000000000001", &src()).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Syntax);
        assert!(err.msg.contains("0.00000000000000000000000000001"), "{}", err.msg);
    }

    #[test]
    fn comments_lose_their_delimiter() {
        assert_eq!(comment_text("; hello "), "hello");
        assert_eq!(comment_text("// legacy"), "legacy");
        assert_eq!(comment_text(";"), "");
        assert_eq!(remove_quotes("\"US Dollar\""), "US Dollar");
        assert_eq!(name_key("Assets:Cash"), "assets:cash");
    }
}
