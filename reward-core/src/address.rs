use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Errors produced when parsing an [`Address`] from untrusted input.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum AddressError {
    /// The address was empty.
    #[snafu(display("address is empty"))]
    Empty,

    /// The address contained whitespace.
    #[snafu(display("malformed address '{address}': contains whitespace"))]
    Whitespace {
        /// The rejected input.
        address: String,
    },
}

/// An opaque account address whose identity is case-insensitive.
///
/// The original spelling is kept for display, while equality and hashing use the ASCII lowercase
/// form. No checksum validation happens here; `0xABC` and `0xabc` are the same account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps a raw address string without validation.
    ///
    /// Chain events carry whatever the source delivered, so the ledger accepts any string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The address as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized (lowercase) form used for identity.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Returns `true` if `other` names the same account, ignoring ASCII case.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace {
                address: s.to_string(),
            });
        }
        Ok(Self::new(s))
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
