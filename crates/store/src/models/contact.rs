//! Delivery contact domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

use marketplace_core::limits::{ADDRESS_PART_MAX, CITY_MAX, PHONE_MAX, STREET_MAX};
use marketplace_core::{ContactId, UserId, ValidationError, check_length};

/// A delivery address and phone number belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub details: ContactDetails,
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.details.city, self.details.street, self.details.house
        )
    }
}

/// Address fields of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactDetails {
    pub city: String,
    pub street: String,
    pub house: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub apartment: String,
    pub phone: String,
}

impl ContactDetails {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a missing required field or a field
    /// wider than its column.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("city", &self.city),
            ("street", &self.street),
            ("house", &self.house),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::new(field, "must not be empty"));
            }
        }

        check_length("city", &self.city, CITY_MAX)?;
        check_length("street", &self.street, STREET_MAX)?;
        check_length("house", &self.house, ADDRESS_PART_MAX)?;
        check_length("structure", &self.structure, ADDRESS_PART_MAX)?;
        check_length("building", &self.building, ADDRESS_PART_MAX)?;
        check_length("apartment", &self.apartment, ADDRESS_PART_MAX)?;
        check_length("phone", &self.phone, PHONE_MAX)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ContactDetails {
        ContactDetails {
            city: "Berlin".to_owned(),
            street: "Unter den Linden".to_owned(),
            house: "5".to_owned(),
            phone: "+49301234567".to_owned(),
            ..ContactDetails::default()
        }
    }

    #[test]
    fn test_valid_details() {
        assert!(details().validate().is_ok());
    }

    #[test]
    fn test_blank_structure_is_allowed() {
        let d = ContactDetails {
            structure: String::new(),
            ..details()
        };
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_missing_phone() {
        let d = ContactDetails {
            phone: " ".to_owned(),
            ..details()
        };
        assert_eq!(d.validate().err().map(|e| e.field), Some("phone"));
    }

    #[test]
    fn test_phone_too_long() {
        let d = ContactDetails {
            phone: "1".repeat(21),
            ..details()
        };
        assert_eq!(d.validate().err().map(|e| e.field), Some("phone"));
    }

    #[test]
    fn test_display() {
        let contact = Contact {
            id: ContactId::new(1),
            user_id: UserId::new(1),
            details: details(),
        };
        assert_eq!(contact.to_string(), "Berlin Unter den Linden 5");
    }
}
