//! Configuration management module.
//!
//! Handles loading configuration from environment variables and validating it
//! before any session is constructed.

use std::{env, fmt, path::PathBuf, time::Duration};

use crate::{
    error::AppError,
    ethereum::constants::{
        DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_REQUIRED_CONFIRMATIONS,
    },
};

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Private key for the signer (hex string, 0x prefix optional).
    pub private_key: String,
    /// Address of the contract to bind.
    pub contract_address: String,
    /// JSON ABI file. The built-in Counter interface is used when unset.
    pub abi_path: Option<PathBuf>,
    /// How long to wait for a transaction to be confirmed.
    pub confirmation_timeout: Duration,
    /// Interval between receipt polls.
    pub poll_interval: Duration,
    /// Number of blocks (including the inclusion block) before a receipt counts.
    pub required_confirmations: u64,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Create a configuration with the three required values and defaults for
    /// everything else.
    pub fn new(
        rpc_url: impl Into<String>,
        private_key: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: private_key.into(),
            contract_address: contract_address.into(),
            abi_path: None,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `RPC_URL`: Ethereum JSON-RPC endpoint
    /// - `PRIVATE_KEY`: Signer private key (hex)
    /// - `CONTRACT_ADDRESS`: Contract to interact with
    ///
    /// Optional environment variables:
    /// - `CONTRACT_ABI_PATH`: JSON ABI file (default: built-in Counter ABI)
    /// - `CONFIRMATION_TIMEOUT_SECS` (default: 120)
    /// - `RECEIPT_POLL_INTERVAL_MS` (default: 1000)
    /// - `REQUIRED_CONFIRMATIONS` (default: 1)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// All missing required keys are reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let rpc_url = get("RPC_URL");
        let private_key = get("PRIVATE_KEY");
        let contract_address = get("CONTRACT_ADDRESS");

        let missing: Vec<&str> = [
            ("RPC_URL", rpc_url.is_none()),
            ("PRIVATE_KEY", private_key.is_none()),
            ("CONTRACT_ADDRESS", contract_address.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let mut config = Self::new(
            rpc_url.unwrap_or_default(),
            private_key.unwrap_or_default(),
            contract_address.unwrap_or_default(),
        );

        config.abi_path = get("CONTRACT_ABI_PATH").map(PathBuf::from);

        if let Some(secs) = get("CONFIRMATION_TIMEOUT_SECS") {
            config.confirmation_timeout =
                Duration::from_secs(parse_number("CONFIRMATION_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = get("RECEIPT_POLL_INTERVAL_MS") {
            config.poll_interval =
                Duration::from_millis(parse_number("RECEIPT_POLL_INTERVAL_MS", &ms)?);
        }
        if let Some(n) = get("REQUIRED_CONFIRMATIONS") {
            config.required_confirmations = parse_number("REQUIRED_CONFIRMATIONS", &n)?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every required field is present and every knob is usable.
    ///
    /// This is the single validation step run before any session work.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if self.rpc_url.trim().is_empty() {
            problems.push("rpc_url is empty");
        }
        if self.private_key.trim().is_empty() {
            problems.push("private_key is empty");
        }
        if self.contract_address.trim().is_empty() {
            problems.push("contract_address is empty");
        }
        if self.poll_interval.is_zero() {
            problems.push("poll_interval must be greater than zero");
        }
        if self.required_confirmations == 0 {
            problems.push("required_confirmations must be at least 1");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(problems.join("; ")))
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, AppError> {
    value
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("{key} must be a non-negative integer: {e}")))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("contract_address", &self.contract_address)
            .field("abi_path", &self.abi_path)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("required_confirmations", &self.required_confirmations)
            .field("log_level", &self.log_level)
            .finish()
    }
}
