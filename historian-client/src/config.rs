//! Client settings read from `HISTORIAN_*` environment variables.
//!
//! | Env var                  | Default |
//! |--------------------------|---------|
//! | `HISTORIAN_SERVER`       | unset   |
//! | `HISTORIAN_POINT_PREFIX` | `""`    |

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Server node to connect to at start-up, if any.
    #[serde(default)]
    pub server: Option<String>,
    /// Prepended to every normalized tag name. Used verbatim.
    #[serde(default)]
    pub point_prefix: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix("HISTORIAN"))
    }

    pub fn from_environment(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("point_prefix", "")?
            .add_source(env)
            .build()
            .context("Failed to read historian client configuration")?
            .try_deserialize()
            .context("Invalid historian client configuration")
    }
}
