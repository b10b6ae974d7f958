//! Caller input validation
//!
//! Validation returns an error kind instead of unwinding, so a prompt loop
//! can branch on the result and re-ask.

use thiserror::Error;

/// Invalid input value kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Input is not an integer
    #[error("Wrong input '{0}': it should be a numeric value")]
    NotNumeric(String),
    /// Input is an integer below zero
    #[error("Wrong input '{0}': it should be a positive integer")]
    Negative(String),
    /// Input is above the accepted range
    #[error("Wrong input '{0}': it should be at most 2147483647")]
    OutOfRange(String),
}

/// Result type for input validation
pub type InputResult<T> = Result<T, InputError>;

/// Parse a signed 32-bit integer
pub fn check_numeric(input: &str) -> InputResult<i32> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => i32::try_from(n).map_err(|_| InputError::OutOfRange(input.to_string())),
        Err(_) => Err(InputError::NotNumeric(input.to_string())),
    }
}

/// Parse an integer in `0..=2147483647`
pub fn check_non_negative(input: &str) -> InputResult<u32> {
    let value = check_numeric(input)?;
    u32::try_from(value).map_err(|_| InputError::Negative(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_INPUT_VALUE;

    #[test]
    fn test_check_numeric() {
        assert_eq!(check_numeric("42"), Ok(42));
        assert_eq!(check_numeric(" -3 "), Ok(-3));
        assert_eq!(
            check_numeric("abc"),
            Err(InputError::NotNumeric("abc".to_string()))
        );
        assert_eq!(
            check_numeric("2147483648"),
            Err(InputError::OutOfRange("2147483648".to_string()))
        );
    }

    #[test]
    fn test_check_non_negative() {
        assert_eq!(check_non_negative("0"), Ok(0));
        assert_eq!(check_non_negative("2147483647"), Ok(MAX_INPUT_VALUE));
        assert_eq!(
            check_non_negative("-1"),
            Err(InputError::Negative("-1".to_string()))
        );
        assert!(matches!(
            check_non_negative(""),
            Err(InputError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_input_error_display() {
        let err = InputError::Negative("-5".to_string());
        assert_eq!(err.to_string(), "Wrong input '-5': it should be a positive integer");
    }
}
