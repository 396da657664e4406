//! Prefixed public identifiers for type-safe entity references.
//!
//! Every record exposed to customers carries a human-readable identifier made of
//! an entity-kind prefix and a random suffix, e.g. `CUST-7K2M9QXA`. These are
//! distinct from any internal storage key.
//!
//! Use the `define_public_id!` macro to create wrappers that prevent
//! accidentally mixing identifiers from different entity types.

use rand::Rng;

/// Number of random characters after the prefix.
pub const SUFFIX_LEN: usize = 8;

/// Alphabet for the random suffix (uppercase alphanumeric).
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Errors that can occur when parsing a public identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier does not start with the expected prefix.
    #[error("identifier must start with {expected}-")]
    WrongPrefix {
        /// Expected prefix.
        expected: &'static str,
    },
    /// The suffix is not exactly eight uppercase alphanumeric characters.
    #[error("identifier suffix must be {SUFFIX_LEN} uppercase alphanumeric characters")]
    InvalidSuffix,
}

/// Generate a random suffix of [`SUFFIX_LEN`] uppercase alphanumeric characters.
#[must_use]
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET.get(idx).copied().unwrap_or(b'0'))
        })
        .collect()
}

/// Validate a full `PREFIX-SUFFIX` identifier.
///
/// # Errors
///
/// Returns [`IdError`] if the prefix or suffix is malformed.
pub fn validate(prefix: &'static str, value: &str) -> Result<(), IdError> {
    let suffix = value
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or(IdError::WrongPrefix { expected: prefix })?;

    let well_formed = suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if well_formed {
        Ok(())
    } else {
        Err(IdError::InvalidSuffix)
    }
}

/// Macro to define a prefixed public identifier.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string, validated on the way in
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `generate()`, `parse()`, `as_str()` and `Display`
///
/// # Example
///
/// ```rust
/// # use sparksonic_core::define_public_id;
/// define_public_id!(InvoiceId, "INV");
///
/// let id = InvoiceId::generate();
/// assert!(id.as_str().starts_with("INV-"));
/// assert!(InvoiceId::parse(id.as_str()).is_ok());
/// ```
#[macro_export]
macro_rules! define_public_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Entity-kind prefix for this identifier.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh identifier with a random suffix.
            #[must_use]
            pub fn generate() -> Self {
                Self::generate_with(&mut ::rand::rng())
            }

            /// Generate an identifier from the given random source.
            #[must_use]
            pub fn generate_with<R: ::rand::Rng + ?Sized>(rng: &mut R) -> Self {
                Self(format!(
                    "{}-{}",
                    Self::PREFIX,
                    $crate::types::id::random_suffix(rng)
                ))
            }

            /// Parse an identifier, checking prefix and suffix shape.
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the value is not `PREFIX-XXXXXXXX`.
            pub fn parse(value: &str) -> Result<Self, $crate::types::id::IdError> {
                $crate::types::id::validate(Self::PREFIX, value)?;
                Ok(Self(value.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::id::IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $crate::types::id::validate(Self::PREFIX, &value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_public_id!(CustomerId, "CUST");
define_public_id!(QuoteId, "QT");
define_public_id!(TicketId, "TKT");
define_public_id!(ContactId, "CNT");
define_public_id!(ProjectId, "PRJ");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn assert_shape(value: &str, prefix: &str) {
        let suffix = value.strip_prefix(prefix).unwrap().strip_prefix('-').unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "unexpected suffix {suffix}"
        );
    }

    #[test]
    fn test_generated_ids_have_prefix_and_suffix() {
        assert_shape(CustomerId::generate().as_str(), "CUST");
        assert_shape(QuoteId::generate().as_str(), "QT");
        assert_shape(TicketId::generate().as_str(), "TKT");
        assert_shape(ContactId::generate().as_str(), "CNT");
        assert_shape(ProjectId::generate().as_str(), "PRJ");
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = CustomerId::generate_with(&mut StdRng::seed_from_u64(7));
        let b = CustomerId::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_ids_do_not_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| QuoteId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_parse_rejects_wrong_prefix() {
        assert_eq!(
            CustomerId::parse("QT-ABCDEFGH"),
            Err(IdError::WrongPrefix { expected: "CUST" })
        );
        assert_eq!(
            CustomerId::parse("CUSTABCDEFGH"),
            Err(IdError::WrongPrefix { expected: "CUST" })
        );
    }

    #[test]
    fn test_parse_rejects_bad_suffix() {
        assert_eq!(TicketId::parse("TKT-abcdefgh"), Err(IdError::InvalidSuffix));
        assert_eq!(TicketId::parse("TKT-ABC"), Err(IdError::InvalidSuffix));
        assert_eq!(TicketId::parse("TKT-ABCDEFGH1"), Err(IdError::InvalidSuffix));
        assert!(TicketId::parse("TKT-AB12CD34").is_ok());
    }

    #[test]
    fn test_serde_is_plain_string_and_validated() {
        let id = QuoteId::parse("QT-1A2B3C4D").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"QT-1A2B3C4D\"");

        let back: QuoteId = serde_json::from_str("\"QT-1A2B3C4D\"").unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<QuoteId>("\"CUST-1A2B3C4D\"").is_err());
    }
}
