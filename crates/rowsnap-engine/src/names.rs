//! Snapshot and query name rules
//!
//! A name becomes a directory or file name on disk, so it is limited to
//! ASCII letters, digits, `_` and `-`.

use rowsnap_core::errors::{Result, RowsnapError};

/// Validate a snapshot name and lower-case it
///
/// # Errors
///
/// `InvalidName` if the name is empty or holds any other character.
pub fn normalize_name(name: &str) -> Result<String> {
    validate_name(name)?;
    Ok(name.to_ascii_lowercase())
}

/// Validate a name without changing it
///
/// Query names are kept as given since table queries select from them.
///
/// # Errors
///
/// As for [`normalize_name`].
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    if let Some(c) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(invalid(
            name,
            format!("character {:?} is not a letter, digit, '_' or '-'", c),
        ));
    }
    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn invalid(name: &str, reason: impl Into<String>) -> RowsnapError {
    RowsnapError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_valid_names() {
        assert_eq!(normalize_name("After_Insert-2").unwrap(), "after_insert-2");
        assert_eq!(normalize_name("initial").unwrap(), "initial");
    }

    #[test]
    fn test_rejects_invalid_names() {
        for name in ["", "a b", "../up", "semi;colon", "naïve"] {
            assert!(
                matches!(normalize_name(name), Err(RowsnapError::InvalidName { .. })),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_validate_keeps_case() {
        assert!(validate_name("Orders").is_ok());
        assert!(validate_name("orders.v2").is_err());
    }
}
