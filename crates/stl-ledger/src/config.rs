//! Ledger gateway configuration.
//!
//! Defaults target a local gateway. Override through environment variables
//! or build the struct directly for tests.

use url::Url;
use zeroize::Zeroizing;

pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:3999";
pub const DEFAULT_CONTRACT: &str = "safe-traffic-ledger";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the ledger gateway.
///
/// `Debug` redacts the API token.
#[derive(Clone)]
pub struct LedgerConfig {
    pub base_url: Url,
    /// Contract name, used as a path segment.
    pub contract: String,
    /// Optional bearer token.
    pub api_token: Option<Zeroizing<String>>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("base_url", &self.base_url)
            .field("contract", &self.contract)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// - `STL_LEDGER_URL` (default `http://127.0.0.1:3999`)
    /// - `STL_CONTRACT` (default `safe-traffic-ledger`)
    /// - `STL_API_TOKEN` (optional)
    /// - `STL_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get("STL_LEDGER_URL").unwrap_or_else(|| DEFAULT_LEDGER_URL.to_string());
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("STL_LEDGER_URL".to_string(), e.to_string()))?;

        let contract = get("STL_CONTRACT").unwrap_or_else(|| DEFAULT_CONTRACT.to_string());
        if contract.is_empty() || contract.contains('/') {
            return Err(ConfigError::InvalidContract(contract));
        }

        let timeout_secs = match get("STL_TIMEOUT_SECS") {
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(s.clone()))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            contract,
            api_token: get("STL_API_TOKEN")
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            timeout_secs,
        })
    }

    /// Configuration for a gateway at `base_url` with defaults otherwise.
    pub fn local(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            contract: DEFAULT_CONTRACT.to_string(),
            api_token: None,
            timeout_secs: 5,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid contract name {0:?}")]
    InvalidContract(String),
    #[error("STL_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("API token contains characters not allowed in a header")]
    InvalidToken,
}
