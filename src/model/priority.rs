use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Task priority, 1 (lowest) through 4 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    pub const LOWEST: Priority = Priority(1);
    pub const HIGHEST: Priority = Priority(4);

    /// Build a priority, clamping into 1..=4.
    pub fn new(level: i64) -> Self {
        Priority(level.clamp(Self::LOWEST.0 as i64, Self::HIGHEST.0 as i64) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::LOWEST
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.map(Priority::new).unwrap_or_default())
    }
}
