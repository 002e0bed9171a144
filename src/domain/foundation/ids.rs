//! Strongly-typed identifier value objects.
//!
//! Identifiers are opaque strings. Fresh ones are minted as UUID v4 strings,
//! but any non-empty value coming back from the remote store (or typed by a
//! test, e.g. `"t1"`) is accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Generates a string-backed identifier newtype.
///
/// Each generated type validates non-emptiness on construction and on
/// deserialization, so an empty id can never enter the aggregate.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier, returning error if blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Mints a new random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Durable identifier of one workshop session.
    SessionId,
    "session_id"
);

string_id!(
    /// Identifier of a trigger event within a session.
    TriggerId,
    "trigger_id"
);

string_id!(
    /// Identifier of a job-to-be-done within a session.
    JobId,
    "job_id"
);

string_id!(
    /// Identifier of a target buyer segment within a session.
    BuyerId,
    "buyer_id"
);

string_id!(
    /// Identifier of a pain within a session.
    PainId,
    "pain_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_generate_is_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_generate_is_a_uuid() {
        let id = SessionId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn ids_accept_arbitrary_non_empty_strings() {
        let id = TriggerId::new("t1").unwrap();
        assert_eq!(id.as_str(), "t1");
        assert_eq!(id.to_string(), "t1");
    }

    #[test]
    fn ids_reject_blank_strings() {
        assert!(SessionId::new("").is_err());
        assert!(PainId::new("   ").is_err());
    }

    #[test]
    fn ids_parse_from_str() {
        let id: BuyerId = "b-42".parse().unwrap();
        assert_eq!(id.as_str(), "b-42");
        assert!("".parse::<JobId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = PainId::new("p1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
    }

    #[test]
    fn ids_reject_empty_strings_on_deserialize() {
        let result: Result<JobId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn blank_id_error_names_the_field() {
        let err = SessionId::new("").unwrap_err();
        assert_eq!(err.to_string(), "Field 'session_id' cannot be empty");
    }
}
