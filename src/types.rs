use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// What a merge does with a key present in the overlay but not in the base.
///
/// - `Raise`: reject the merge with [`ConfigError::MergeKey`].
/// - `Warn`: add the key and record a `NewKeyAdded` warning (default).
/// - `Pass`: add the key silently.
///
/// Reserved `__`-prefixed keys are always added, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewKeyPolicy {
    Raise,
    #[default]
    Warn,
    Pass,
}

impl NewKeyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewKeyPolicy::Raise => "raise",
            NewKeyPolicy::Warn => "warn",
            NewKeyPolicy::Pass => "pass",
        }
    }
}

impl fmt::Display for NewKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raise" => Ok(NewKeyPolicy::Raise),
            "warn" => Ok(NewKeyPolicy::Warn),
            "pass" => Ok(NewKeyPolicy::Pass),
            other => Err(ConfigError::InvalidPolicy(other.to_string())),
        }
    }
}

/// Prefix marking reserved metadata keys (`__default__`, `__run__`, ...).
pub const RESERVED_PREFIX: &str = "__";

pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}
