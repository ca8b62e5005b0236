use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from tisk.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Snapshot directory. Relative paths resolve against the config file.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// How long a saved project list stays usable
    #[serde(default = "default_projects_max_age")]
    pub projects_max_age_secs: u64,
    /// How long saved start-page query results stay usable
    #[serde(default = "default_queries_max_age")]
    pub queries_max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: None,
            projects_max_age_secs: default_projects_max_age(),
            queries_max_age_secs: default_queries_max_age(),
        }
    }
}

/// One day
fn default_projects_max_age() -> u64 {
    86_400
}

/// Two hours
fn default_queries_max_age() -> u64 {
    7_200
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Offset of the user's timezone from UTC, in whole hours
    #[serde(default)]
    pub tz_offset_hours: i32,
}
