//! Clan name validation
//!
//! Names are stored in VARCHAR(36) columns and double as primary keys,
//! so the length cap is a hard constraint, not a style choice.

use super::validation::ValidationError;

/// Maximum length for clan names, matching the column width.
pub const MAX_CLAN_NAME_LEN: usize = 36;

/// Validated clan name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClanName(String);

impl ClanName {
    /// Create a new clan name.
    ///
    /// # Rules
    /// - Max 36 characters
    /// - No whitespace or control characters
    ///
    /// # Example
    /// ```
    /// use clanhall_core::ClanName;
    ///
    /// assert!(ClanName::new("Reds").is_ok());
    /// assert!(ClanName::new("two words").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "clan name" });
        }

        if s.chars().count() > MAX_CLAN_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "clan name",
                max: MAX_CLAN_NAME_LEN,
            });
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "clan name",
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the clan name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ClanName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClanName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
