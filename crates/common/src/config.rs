//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// How resolving an invitation that is already accepted or declined is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Reject with a conflict and leave everything untouched
    #[default]
    Strict,
    /// Re-apply the resolution: status is overwritten and membership updates re-run
    Permissive,
}

impl std::str::FromStr for ResolutionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ResolutionPolicy::Strict),
            "permissive" => Ok(ResolutionPolicy::Permissive),
            other => Err(anyhow::anyhow!(
                "Unknown resolution policy '{}', expected 'strict' or 'permissive'",
                other
            )),
        }
    }
}

impl std::fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionPolicy::Strict => write!(f, "strict"),
            ResolutionPolicy::Permissive => write!(f, "permissive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URL for the document store; in-memory when unset
    pub database_url: Option<String>,

    /// Policy applied when an already-resolved invitation is resolved again
    pub resolution_policy: ResolutionPolicy,

    /// File backing the local key-value store
    pub local_store_path: PathBuf,

    /// Runtime configuration
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let resolution_policy = match env::var("SHAREKIT_RESOLUTION_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => ResolutionPolicy::default(),
        };

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            resolution_policy,
            local_store_path: env::var("SHAREKIT_LOCAL_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("sharekit-local-store.json")),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "sharekit=info".to_string()),
        };

        Ok(config)
    }
}
