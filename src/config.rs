use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokensError};

/// Degree of parallelism for per-document work
///
/// - `Auto`: every execution unit (rayon's global pool)
/// - `Sequential`: run on the calling thread
/// - `Fixed(n)`: a dedicated pool of `n` workers, `n <= 1` behaves as `Sequential`
///
/// The output of an operation never depends on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threads {
    #[default]
    Auto,
    Sequential,
    Fixed(usize),
}

impl FromStr for Threads {
    type Err = TokensError;

    /// Parses `auto`, `sequential` or a thread count (`0` and `1` mean sequential).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Threads::Auto),
            "sequential" | "0" | "1" => Ok(Threads::Sequential),
            other => other
                .parse::<usize>()
                .map(Threads::Fixed)
                .map_err(|_| TokensError::value(format!(
                    "invalid thread setting: {other:?} (expected \"auto\", \"sequential\" or a count)"
                ))),
        }
    }
}

/// Per-object configuration
/// held by every `TokensObject` instead of process-wide globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokensConfig {
    #[serde(default)]
    pub threads: Threads,
}

impl TokensConfig {
    /// Environment variable read by `from_env`
    pub const THREADS_ENV: &'static str = "CORPUS_TOKENS_THREADS";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the degree of parallelism
    pub fn threads(mut self, threads: Threads) -> Self {
        self.threads = threads;
        self
    }

    /// Build a config from `CORPUS_TOKENS_THREADS`, falling back to the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(Self::THREADS_ENV) {
            config.threads = value.parse()?;
        }
        Ok(config)
    }
}
