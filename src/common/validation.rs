// src/common/validation.rs

use validator::ValidationError;

/// Rejeita textos que só têm espaços. O `length(min = 1)` sozinho aceita "   ".
pub fn not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   \t").is_err());
        assert!(not_blank(" REM-1 ").is_ok());
    }
}
