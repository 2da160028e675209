//! Column width limits and the validation error raised before persistence.

/// `market.user.first_name` / `last_name`.
pub const PERSON_NAME_MAX: usize = 150;
/// `market.user.company` / `position`.
pub const COMPANY_MAX: usize = 40;
/// Names of shops, categories, products and parameters.
pub const NAME_MAX: usize = 30;
/// `market.product.model` and `market.product_parameter.value`.
pub const LONG_TEXT_MAX: usize = 100;
/// `market.contact.city`.
pub const CITY_MAX: usize = 30;
/// `market.contact.street`.
pub const STREET_MAX: usize = 100;
/// House, structure, building and apartment designators.
pub const ADDRESS_PART_MAX: usize = 15;
/// `market.contact.phone`.
pub const PHONE_MAX: usize = 20;
/// `market.confirm_email_token.key`.
pub const TOKEN_KEY_MAX: usize = 64;

/// A field failed validation before it reached the database.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Explanation.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Ensure `value` fits into a column of `max` characters.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when the value is too long.
pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_counts_chars_not_bytes() {
        assert!(check_length("city", &"ü".repeat(CITY_MAX), CITY_MAX).is_ok());
        assert!(check_length("city", &"ü".repeat(CITY_MAX + 1), CITY_MAX).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = check_length("company", &"x".repeat(41), COMPANY_MAX).unwrap_err();
        assert_eq!(err.field, "company");
        assert_eq!(err.to_string(), "company: must be at most 40 characters");
    }
}
