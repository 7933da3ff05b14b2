use serde::{Deserialize, Serialize};
use std::fmt;

/// Validity of a component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentState {
    /// Initial state; at least one handler is not ready
    #[default]
    Invalid,
    /// Every registered handler is satisfied; services may be published
    Valid,
}

impl ComponentState {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Parse a state name as written in a callback declaration.
    ///
    /// Unrecognized names map to `Invalid` instead of failing.
    pub fn from_declaration(name: &str) -> Self {
        name.parse().unwrap_or(Self::Invalid)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "INVALID"),
            Self::Valid => write!(f, "VALID"),
        }
    }
}

impl std::str::FromStr for ComponentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALID" => Ok(Self::Valid),
            "INVALID" => Ok(Self::Invalid),
            _ => Err(format!("Invalid component state: {s}")),
        }
    }
}
