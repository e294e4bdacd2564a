//! Common utilities for integration tests.

use contract_session::{Config, ContractSession};

/// Helper to open a session against the node named by environment variables.
pub async fn create_test_session() -> Option<(ContractSession, Config)> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let mut config = Config::from_env().ok()?;
    config.log_level = "warn".to_string();

    let session = ContractSession::connect(&config).await.ok()?;
    Some((session, config))
}

/// Skip test if a session cannot be opened (missing env vars or node down).
#[macro_export]
macro_rules! skip_if_no_session {
    () => {
        match common::create_test_session().await {
            Some(pair) => pair,
            None => {
                eprintln!("Skipping test: RPC_URL, PRIVATE_KEY or CONTRACT_ADDRESS not usable");
                return;
            }
        }
    };
}
