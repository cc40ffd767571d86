//! Semantic newtypes for domain identifiers
//!
//! # Parse-at-Boundaries Pattern
//!
//! Each identifier type:
//! - Trims whitespace before validation
//! - Validates its input on construction and cannot represent invalid states
//! - Deserializes through the same validation (`serde(try_from = "String")`)
//!
//! Ids are opaque to the coordinator. GUIDs, slugs, numeric keys, email
//! addresses and names with inner spaces all parse; only control characters
//! are refused.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum identifier length in characters.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Error type for all identifier validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier is empty or whitespace-only
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which identifier failed
        kind: &'static str,
    },

    /// Identifier exceeds [`MAX_IDENTIFIER_LEN`]
    #[error("{kind} too long: {actual} characters (max {max})")]
    TooLong {
        /// Which identifier failed
        kind: &'static str,
        /// The maximum allowed length
        max: usize,
        /// The actual length provided
        actual: usize,
    },

    /// Identifier contains a control character
    #[error("{kind} contains invalid character '{found}'")]
    InvalidCharacters {
        /// Which identifier failed
        kind: &'static str,
        /// First offending character
        found: char,
    },
}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdentifierError> {
    if raw.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    let len = raw.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong {
            kind,
            max: MAX_IDENTIFIER_LEN,
            actual: len,
        });
    }
    raw.chars()
        .find(|c| c.is_control())
        .map_or(Ok(()), |found| {
            Err(IdentifierError::InvalidCharacters { kind, found })
        })
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier.
            ///
            /// # Errors
            ///
            /// Returns `IdentifierError` if the value is empty, too long,
            /// or contains a control character.
            pub fn parse(s: impl Into<String>) -> Result<Self, IdentifierError> {
                let s = s.into();
                let trimmed = s.trim();
                validate($kind, trimmed)?;
                Ok(Self(trimmed.to_string()))
            }

            /// Get the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// A content block: the unit a lock is taken on.
    BlockId,
    "block id"
);

identifier!(
    /// A user acting on (or owning) a lock.
    UserId,
    "user id"
);

identifier!(
    /// The release section containing a block.
    SectionId,
    "section id"
);

identifier!(
    /// The release owning a section; also the broadcast scope.
    ReleaseId,
    "release id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = BlockId::parse("  0b6e3f1c-9d5a-4c1e-8f07-2a4b6c8d0e1f  ");
        assert_eq!(
            id.map(|b| b.as_str().to_string()),
            Ok("0b6e3f1c-9d5a-4c1e-8f07-2a4b6c8d0e1f".to_string())
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(
            UserId::parse("   "),
            Err(IdentifierError::Empty { kind: "user id" })
        );
    }

    #[test]
    fn test_too_long_is_rejected() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            ReleaseId::parse(long),
            Err(IdentifierError::TooLong { actual, .. }) if actual == MAX_IDENTIFIER_LEN + 1
        ));
    }

    #[test]
    fn test_control_characters_are_rejected() {
        assert_eq!(
            SectionId::parse("sec\n1"),
            Err(IdentifierError::InvalidCharacters {
                kind: "section id",
                found: '\n'
            })
        );
        assert!(BlockId::parse("b\u{0}1").is_err());
    }

    #[test]
    fn test_external_id_shapes_are_accepted() {
        for raw in [
            "jane@example.com",
            "Section 2/Headlines",
            "urn:release#2024+1",
            "8f07 2a4b",
            "données",
        ] {
            assert_eq!(
                UserId::parse(raw).map(|id| id.as_str().to_string()),
                Ok(raw.to_string())
            );
        }
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<UserId, _> = serde_json::from_str("\"jane\"");
        assert!(ok.is_ok());
        let bad: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&BlockId::parse("b-1")?)?;
        assert_eq!(json, "\"b-1\"");
        Ok(())
    }
}
