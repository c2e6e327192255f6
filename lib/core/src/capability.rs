use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A served capability. Each one owns exactly one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Fraud,
    Risk,
    Similarity,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Fraud, Capability::Risk, Capability::Similarity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Fraud => "fraud",
            Capability::Risk => "risk",
            Capability::Similarity => "similarity",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fraud" => Ok(Capability::Fraud),
            "risk" => Ok(Capability::Risk),
            "similarity" => Ok(Capability::Similarity),
            other => Err(Error::UnknownCapability(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_capabilities() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>().unwrap(), capability);
        }
    }

    #[test]
    fn test_parse_unknown_capability() {
        let err = "weather".parse::<Capability>().unwrap_err();
        assert!(matches!(err, Error::UnknownCapability(ref name) if name == "weather"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Capability::Risk).unwrap(), "\"risk\"");
    }
}
