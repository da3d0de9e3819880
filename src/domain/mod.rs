//! Domain primitives shared by the user, model and prediction records.
//!
//! Identifiers follow the Newtype pattern so a `ModelId` can never be passed
//! where a `TaskId` is expected.

pub mod events;

use serde::{Deserialize, Serialize};
use std::fmt;

/// String-keyed JSON object used for prediction inputs and results.
pub type Payload = serde_json::Map<String, serde_json::Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
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
    /// Unique identifier of a [`User`](crate::models::User).
    ///
    /// ```rust
    /// use modelhub::domain::UserId;
    ///
    /// let id = UserId::new("u-1");
    /// assert_eq!(id.as_str(), "u-1");
    /// assert_eq!(id.to_string(), "u-1");
    /// ```
    UserId
);

string_id!(
    /// Unique identifier of a [`Model`](crate::models::Model).
    ModelId
);

string_id!(
    /// Identifier of a [`PredictionTask`](crate::models::PredictionTask).
    ///
    /// Uniqueness is not enforced by the history container.
    TaskId
);

impl TaskId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
