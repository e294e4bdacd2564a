//! Smart contract bindings and interface loading.

pub mod counter;

use std::path::Path;

use alloy::json_abi::JsonAbi;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Parse an interface definition from JSON.
///
/// Accepts a standard JSON ABI array, a compiler artifact object with an
/// `abi` field (Foundry, Hardhat), or an array of human-readable signatures.
pub fn parse_abi_json(json: &str) -> Result<JsonAbi> {
    let value: Value = serde_json::from_str(json)?;

    let abi = match value {
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| AppError::Abi("artifact object has no `abi` field".into()))?,
        other => other,
    };

    if let Some(items) = abi.as_array() {
        if !items.is_empty() && items.iter().all(Value::is_string) {
            let signatures: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            return Ok(JsonAbi::parse(signatures)?);
        }
    }

    Ok(serde_json::from_value(abi)?)
}

/// Load an interface definition from a file.
pub fn load_abi(path: &Path) -> Result<JsonAbi> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read ABI file {}: {e}", path.display()))
    })?;

    let abi = parse_abi_json(&json)?;
    tracing::debug!(path = %path.display(), functions = abi.functions().count(), "Loaded contract ABI");
    Ok(abi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER_JSON_ABI: &str = r#"[
        {"inputs":[],"name":"increment","outputs":[],"stateMutability":"nonpayable","type":"function"},
        {"inputs":[],"name":"number","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
        {"inputs":[{"internalType":"uint256","name":"newNumber","type":"uint256"}],"name":"setNumber","outputs":[],"stateMutability":"nonpayable","type":"function"}
    ]"#;

    #[test]
    fn test_parse_json_abi_array() {
        let abi = parse_abi_json(COUNTER_JSON_ABI).unwrap();
        assert_eq!(abi.functions().count(), 3);
        assert!(abi.function("setNumber").is_some());
    }

    #[test]
    fn test_parse_artifact_object() {
        let artifact = format!(r#"{{"contractName":"Counter","abi":{COUNTER_JSON_ABI}}}"#);
        let abi = parse_abi_json(&artifact).unwrap();
        assert!(abi.function("increment").is_some());
    }

    #[test]
    fn test_parse_human_readable() {
        let abi = parse_abi_json(r#"["function number() view returns (uint256)"]"#).unwrap();
        assert!(abi.function("number").is_some());
    }

    #[test]
    fn test_json_abi_matches_builtin_counter() {
        let abi = parse_abi_json(COUNTER_JSON_ABI).unwrap();
        let builtin = counter::counter_abi().unwrap();
        for name in ["number", "increment", "setNumber"] {
            assert_eq!(
                abi.function(name).unwrap()[0].selector(),
                builtin.function(name).unwrap()[0].selector()
            );
        }
    }

    #[test]
    fn test_artifact_without_abi() {
        let result = parse_abi_json(r#"{"bytecode":"0x00"}"#);
        assert!(matches!(result, Err(AppError::Abi(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_abi_json("not json"), Err(AppError::Abi(_))));
    }

    #[test]
    fn test_load_abi_missing_file() {
        let result = load_abi(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
