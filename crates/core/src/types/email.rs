//! Shopper email addresses for login and signup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was not accepted as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs text on both sides of the @")]
    EmptyPart,
}

/// A shopper's email address, trimmed and lower-cased.
///
/// ```
/// use tote_core::Email;
///
/// let email: Email = "  Shopper@Example.com ".parse().unwrap();
/// assert_eq!(email.as_str(), "shopper@example.com");
/// assert_eq!(email.domain(), "example.com");
/// assert!("no-at-symbol".parse::<Email>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    address: String,
    at: usize,
}

impl Email {
    /// Longest address a mail server has to accept (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Normalize and check an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] if the trimmed input is empty, too long, or
    /// not of the form `local@domain`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let address = input.trim().to_lowercase();
        if address.is_empty() {
            return Err(EmailError::Empty);
        }
        if address.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut ats = address.match_indices('@').map(|(i, _)| i);
        let (Some(at), None) = (ats.next(), ats.next()) else {
            return Err(EmailError::AtSymbol);
        };
        if at == 0 || at + 1 == address.len() {
            return Err(EmailError::EmptyPart);
        }

        Ok(Self { address, at })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Everything before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address.get(..self.at).unwrap_or_default()
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.address.get(self.at + 1..).unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.address
    }
}
