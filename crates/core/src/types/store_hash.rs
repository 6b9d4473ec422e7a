//! Store hash type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`StoreHash`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreHashError {
    /// The input string is empty.
    #[error("store hash cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("store hash must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside `[a-z0-9]`.
    #[error("store hash may only contain lowercase letters and digits (found {0:?})")]
    InvalidCharacter(char),
    /// A context string did not have the `stores/{hash}` shape.
    #[error("context must look like stores/{{hash}}, got {0:?}")]
    InvalidContext(String),
}

/// The short identifier BigCommerce assigns to every store.
///
/// It appears in API URLs (`/stores/{hash}/v3/...`), in OAuth contexts
/// (`stores/{hash}`) and inside signed payloads.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Lowercase ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use bigcommerce_core::StoreHash;
///
/// assert!(StoreHash::parse("abc123").is_ok());
/// assert_eq!(StoreHash::from_context("stores/abc123").unwrap().as_str(), "abc123");
///
/// assert!(StoreHash::parse("").is_err());
/// assert!(StoreHash::parse("ABC/1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct StoreHash(String);

impl StoreHash {
    /// Maximum accepted length of a store hash.
    pub const MAX_LENGTH: usize = 64;

    /// Prefix of an OAuth/signed-payload context string.
    pub const CONTEXT_PREFIX: &'static str = "stores/";

    /// Parse a `StoreHash` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains
    /// characters other than lowercase letters and digits.
    pub fn parse(s: &str) -> Result<Self, StoreHashError> {
        if s.is_empty() {
            return Err(StoreHashError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(StoreHashError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        {
            return Err(StoreHashError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Extract the hash from a context string such as `stores/abc123`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreHashError::InvalidContext`] if the prefix is missing,
    /// or the usual parse errors for the remainder.
    pub fn from_context(context: &str) -> Result<Self, StoreHashError> {
        let hash = context
            .strip_prefix(Self::CONTEXT_PREFIX)
            .ok_or_else(|| StoreHashError::InvalidContext(context.to_owned()))?;
        Self::parse(hash)
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `stores/{hash}` context form.
    #[must_use]
    pub fn context(&self) -> String {
        format!("{}{}", Self::CONTEXT_PREFIX, self.0)
    }
}

impl fmt::Display for StoreHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StoreHash {
    type Err = StoreHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StoreHash {
    type Error = StoreHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoreHash> for String {
    fn from(hash: StoreHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for StoreHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
