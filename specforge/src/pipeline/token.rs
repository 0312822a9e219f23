//! Run tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifies one end-to-end execution of a pipeline.
///
/// Checkpoints are keyed by run token; distinct tokens never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunToken(Uuid);

impl RunToken {
    /// Generates a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(RunToken::new(), RunToken::new());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let token = RunToken::new();
        let parsed: RunToken = token.to_string().parse().unwrap();
        assert_eq!(token, parsed);
    }

    #[test]
    fn serializes_as_a_plain_string() {
        let token = RunToken::new();
        let value = serde_json::to_value(token).unwrap();
        assert!(value.is_string());
    }
}
