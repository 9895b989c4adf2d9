//! Program text parser
//!
//! Intcode programs are distributed as a single line of comma-separated signed
//! integers:
//!
//! ```text
//! 109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99
//! ```
//!
//! Whitespace (including newlines) around values is ignored, as is a trailing comma.

use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("program text contains no values")]
    Empty,

    #[error("value {index} is not an integer: {token:?}")]
    InvalidValue { index: usize, token: String },
}

/// Parse comma-separated program text into a memory image
pub fn parse_program(source: &str) -> Result<Vec<i64>, ParseError> {
    let mut tokens: Vec<&str> = source.split(',').map(str::trim).collect();
    if tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<i64>().map_err(|_| ParseError::InvalidValue {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_program("1,0,0,0,99"), Ok(vec![1, 0, 0, 0, 99]));
    }

    #[test]
    fn test_whitespace_and_trailing_comma() {
        assert_eq!(
            parse_program(" 104, -7 ,\n99,\n"),
            Ok(vec![104, -7, 99])
        );
    }

    #[test]
    fn test_large_values() {
        assert_eq!(
            parse_program("104,1125899906842624,99"),
            Ok(vec![104, 1125899906842624, 99])
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_program(""), Err(ParseError::Empty));
        assert_eq!(parse_program("  \n"), Err(ParseError::Empty));
        assert_eq!(
            parse_program("1,x,3"),
            Err(ParseError::InvalidValue {
                index: 1,
                token: "x".to_string()
            })
        );
        assert_eq!(
            parse_program("1,,3"),
            Err(ParseError::InvalidValue {
                index: 1,
                token: String::new()
            })
        );
    }
}
