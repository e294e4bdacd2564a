//! Contract Session demo
//!
//! Connects to a node, reads a Counter contract, increments it, waits for the
//! transaction to be confirmed, and reads it again.

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contract_session::{
    counter_abi, load_abi, types::format_ether, AppError, Config, ContractSession,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration; nothing touches the network before this succeeds
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("Copy .env.example to .env and fill in your values");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), AppError> {
    println!("Connecting to {} ...", config.rpc_url);
    let session = ContractSession::connect(config).await?;
    let block = session.block_number().await?;
    println!("Connected. Current block: {block}");

    println!("Wallet address: {}", session.signer_address());
    let balance = session.balance().await?;
    println!("Wallet balance: {} ETH", format_ether(balance));

    let abi = match &config.abi_path {
        Some(path) => load_abi(path)?,
        None => counter_abi()?,
    };
    let counter = session.bind_contract(&config.contract_address, abi)?;
    println!("Contract bound: {}", counter.address());

    println!("\nReading contract state...");
    let current = session.read(&counter, "number", &[]).await?;
    println!("Current number: {current}");

    println!("\nSending transaction...");
    let pending = session.write(&counter, "increment", &[]).await?;
    println!("Transaction sent: {}", pending.tx_hash);

    println!("Waiting for confirmation...");
    let receipt = session.await_confirmation(&pending, config.confirmation_timeout).await?;
    println!("Transaction confirmed in block {}", receipt.block_number);

    let updated = session.read(&counter, "number", &[]).await?;
    println!("New number: {updated}");

    Ok(())
}
