//! Admin username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too short.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a disallowed character.
    #[error("username may only contain letters, digits, '.', '-' and '_'")]
    InvalidCharacter,
}

/// An admin account username.
///
/// ## Constraints
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, `.`, `-`, `_`
///
/// ## Examples
///
/// ```
/// use treasury_core::Username;
///
/// assert!(Username::parse("admin").is_ok());
/// assert!(Username::parse("jane.doe-2").is_ok());
///
/// assert!(Username::parse("").is_err());       // empty
/// assert!(Username::parse("ab").is_err());     // too short
/// assert!(Username::parse("a b").is_err());    // whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, outside the length bounds, or
    /// contains characters other than ASCII letters, digits, `.`, `-`, `_`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(Username::parse("admin").is_ok());
        assert!(Username::parse("jane.doe").is_ok());
        assert!(Username::parse("user_42-x").is_ok());
    }

    #[test]
    fn test_empty() {
        assert!(matches!(Username::parse(""), Err(UsernameError::Empty)));
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            Username::parse("ab"),
            Err(UsernameError::TooShort { .. })
        ));
        let long = "a".repeat(Username::MAX_LENGTH + 1);
        assert!(matches!(
            Username::parse(&long),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            Username::parse("jane doe"),
            Err(UsernameError::InvalidCharacter)
        ));
        assert!(matches!(
            Username::parse("jane@doe"),
            Err(UsernameError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_as_str() {
        let username = Username::parse("admin").expect("valid username");
        assert_eq!(username.as_str(), "admin");
        assert_eq!(username.to_string(), "admin");
    }
}
