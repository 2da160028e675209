//! Shop domain types.

use std::fmt;

use serde::Serialize;
use url::Url;

use marketplace_core::limits::NAME_MAX;
use marketplace_core::{ShopId, UserId, ValidationError, check_length};

/// A seller, owned one-to-one by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub url: Option<String>,
    /// Whether the shop is accepting orders.
    pub state: bool,
    /// Owner; unique across shops.
    pub user_id: UserId,
}

impl fmt::Display for Shop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Values for creating or updating a shop.
#[derive(Debug, Clone)]
pub struct ShopDetails {
    pub name: String,
    pub url: Option<String>,
    pub state: bool,
}

impl ShopDetails {
    /// An open shop with no URL.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            state: true,
        }
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is empty or too long, or if
    /// the URL is not an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        check_length("name", &self.name, NAME_MAX)?;

        if let Some(raw) = &self.url {
            let parsed = Url::parse(raw)
                .map_err(|e| ValidationError::new("url", format!("invalid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ValidationError::new("url", "must use http or https"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(ShopDetails::named("Gadgets").validate().is_ok());
        assert!(ShopDetails::named(" ").validate().is_err());
        assert!(ShopDetails::named("n".repeat(31)).validate().is_err());
    }

    #[test]
    fn test_validate_url() {
        let with_url = |url: &str| ShopDetails {
            url: Some(url.to_owned()),
            ..ShopDetails::named("Gadgets")
        };

        assert!(with_url("https://gadgets.example.com/price.yaml").validate().is_ok());
        assert!(with_url("http://localhost:8000").validate().is_ok());

        for bad in ["gadgets.example.com", "not a url", "ftp://example.com/list"] {
            let err = with_url(bad).validate().err();
            assert_eq!(err.map(|e| e.field), Some("url"), "{bad}");
        }
    }
}
