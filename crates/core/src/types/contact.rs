//! Customer identity fields.
//!
//! A customer is identified by the pair (name, phone number). Both arrive as
//! free-form text from the checkout form and must be non-blank after trimming.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerName`] or [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// The input is empty or only whitespace.
    #[error("{field} is required")]
    Empty {
        /// Human readable field name.
        field: &'static str,
    },
    /// The trimmed input is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Human readable field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

fn parse_trimmed(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ContactError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContactError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ContactError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// The name a customer gives at checkout.
///
/// ## Examples
///
/// ```
/// use baattak_core::CustomerName;
///
/// assert_eq!(CustomerName::parse("  Ana ").unwrap().as_str(), "Ana");
/// assert!(CustomerName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Maximum length of a customer name.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `CustomerName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Empty`] for blank input and
    /// [`ContactError::TooLong`] above [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        parse_trimmed(s, "customer name", Self::MAX_LENGTH).map(Self)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A customer phone number.
///
/// Only blankness and length are checked; formats vary too much between
/// regions to validate further.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum length of a phone number.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `PhoneNumber`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Empty`] for blank input and
    /// [`ContactError::TooLong`] above [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        parse_trimmed(s, "phone number", Self::MAX_LENGTH).map(Self)
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the phone number and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let name = CustomerName::parse("\t Ana  \n").unwrap();
        assert_eq!(name.as_str(), "Ana");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(
            CustomerName::parse("    "),
            Err(ContactError::Empty {
                field: "customer name"
            })
        );
        assert!(CustomerName::parse("").is_err());
    }

    #[test]
    fn test_blank_phone_rejected() {
        let err = PhoneNumber::parse(" ").unwrap_err();
        assert_eq!(err.to_string(), "phone number is required");
    }

    #[test]
    fn test_phone_too_long() {
        let long = "5".repeat(PhoneNumber::MAX_LENGTH + 1);
        assert!(matches!(
            PhoneNumber::parse(&long),
            Err(ContactError::TooLong { max: 32, .. })
        ));
    }

    #[test]
    fn test_interior_whitespace_kept() {
        let phone = PhoneNumber::parse(" 555 0101 ").unwrap();
        assert_eq!(phone.as_str(), "555 0101");
    }
}
