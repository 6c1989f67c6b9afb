//! Input validation utilities.

/// Validate that a name is a plain SQL identifier, safe to splice into a statement.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit, and at
/// most 63 bytes (the PostgreSQL identifier limit).
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("identifier cannot be empty or whitespace only".into());
    }

    if name.len() > 63 {
        return Err(format!("identifier `{name}` is longer than 63 bytes"));
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("identifier `{name}` cannot start with a digit"));
    }

    let valid = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!(
            "identifier `{name}` can only contain letters, numbers, and underscores"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_table_names() {
        assert!(validate_identifier("ir_model").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("res_users2").is_ok());
    }

    #[test]
    fn test_rejects_injection_attempts() {
        assert!(validate_identifier("ir_model; DROP TABLE x").is_err());
        assert!(validate_identifier("public.ir_model").is_err());
        assert!(validate_identifier("\"quoted\"").is_err());
    }

    #[test]
    fn test_rejects_empty_and_leading_digit() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("1table").is_err());
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }
}
