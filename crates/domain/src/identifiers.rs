//! Strongly-typed identifiers for the evaluation domain.
//!
//! Two flavours live here: UUID-backed ids generated by the pipeline itself
//! (one per evaluation session), and validated string ids supplied from the
//! outside, such as the competition a run belongs to. Competition ids end up
//! inside checkpoint file names, so they are restricted to a filesystem-safe
//! alphabet.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Longest accepted competition id.
pub const MAX_COMPETITION_ID_LEN: usize = 128;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new ID with a time-ordered UUID v7
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an ID from an existing UUID
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get a reference to the underlying UUID
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(
    RunId,
    "Unique identifier for one evaluation session (UUID v7 for time-ordering)"
);

/// Identifier of the competition a task set and its results belong to.
///
/// Scopes every checkpoint artifact. Only ASCII alphanumerics, `-`, `_` and
/// `.` are accepted, and the id may not be `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompetitionId(String);

impl CompetitionId {
    /// Parse and validate a competition id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ConfigurationError> {
        let raw = raw.into();
        let invalid = |reason: &str| ConfigurationError::InvalidCompetitionId {
            value: raw.clone(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if raw.len() > MAX_COMPETITION_ID_LEN {
            return Err(invalid("too long"));
        }
        if raw == "." || raw == ".." {
            return Err(invalid("reserved name"));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("only ASCII letters, digits, '-', '_' and '.' are allowed"));
        }

        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CompetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CompetitionId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompetitionId {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CompetitionId> for String {
    fn from(id: CompetitionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_from_string() {
        let id1 = RunId::new();
        let id2: RunId = id1.to_string().parse().unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_competition_id_accepts_safe_names() {
        for raw in ["comp-1", "finetune_2024.q3", "A"] {
            let id = CompetitionId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn test_competition_id_rejects_path_like_values() {
        for raw in ["", ".", "..", "a/b", "..\\x", "has space", "tasks*"] {
            assert!(CompetitionId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_competition_id_rejects_overlong_value() {
        let raw = "x".repeat(MAX_COMPETITION_ID_LEN + 1);
        assert!(CompetitionId::parse(raw).is_err());
    }

    #[test]
    fn test_competition_id_serde_validates() {
        let id: CompetitionId = serde_json::from_str("\"comp-7\"").unwrap();
        assert_eq!(id.as_str(), "comp-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"comp-7\"");

        let bad: Result<CompetitionId, _> = serde_json::from_str("\"../etc\"");
        assert!(bad.is_err());
    }
}
