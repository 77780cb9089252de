//! Input validation for façade parameters.

use cinegraph_core::{EngineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+$").expect("keyword pattern is a valid regex"));

/// Parses a traversal degree from user input. Must be a positive integer.
pub fn parse_degree(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n)
            .map_err(|_| EngineError::invalid(format!("degree {} is too large", n))),
        _ => Err(EngineError::invalid(format!(
            "degree must be a positive integer, got {:?}",
            input
        ))),
    }
}

/// Checks that a search keyword is a single word.
pub fn check_keyword(keyword: &str) -> Result<&str> {
    if KEYWORD.is_match(keyword) {
        Ok(keyword)
    } else {
        Err(EngineError::invalid("keyword must be one word"))
    }
}

/// Rejects a blank required field, returning it trimmed.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EngineError::invalid(format!("{} must not be empty", field)))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_degree() {
        assert_eq!(parse_degree("2"), Ok(2));
        assert_eq!(parse_degree(" 3 "), Ok(3));
        assert!(parse_degree("0").is_err());
        assert!(parse_degree("-1").is_err());
        assert!(parse_degree("two").is_err());
        assert!(parse_degree("1..5").is_err());
        assert!(parse_degree("").is_err());
        assert!(parse_degree("99999999999").is_err());
    }

    #[test]
    fn test_keyword_must_be_one_word() {
        assert!(check_keyword("great").is_ok());
        assert!(check_keyword("sci_fi").is_ok());
        assert!(check_keyword("película").is_ok());
        assert!(check_keyword("two words").is_err());
        assert!(check_keyword("").is_err());
        assert!(check_keyword("great!").is_err());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("title", "  Heat "), Ok("Heat"));
        assert!(require("title", "   ").is_err());
    }
}
