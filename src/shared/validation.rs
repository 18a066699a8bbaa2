use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Runs of whitespace, collapsed when normalizing scraped or extracted text
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"[ \t\u{a0}]+").unwrap();

    /// Three or more consecutive newlines
    pub static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Reject strings that are empty or only whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Reject negative amounts
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

/// Collapse horizontal whitespace and excess blank lines, then trim
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    BLANK_LINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Jane Doe").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   \t").is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::new(150050, 2)).is_ok());
        assert!(non_negative(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a   b \t c  "), "a b c");
        assert_eq!(normalize_whitespace("a\n\n\n\n b"), "a\n\nb");
        assert_eq!(normalize_whitespace("\n\n"), "");
    }
}
