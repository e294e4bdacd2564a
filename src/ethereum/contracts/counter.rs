//! Counter contract bindings.
//!
//! The interface used by the demo flow when no ABI file is configured.

use alloy::{json_abi::JsonAbi, sol};

use crate::error::Result;

/// Human-readable Counter interface.
pub const COUNTER_SIGNATURES: [&str; 3] = [
    "function increment()",
    "function number() view returns (uint256)",
    "function setNumber(uint256 newNumber)",
];

// Counter interface
sol! {
    interface ICounter {
        function increment() external;
        function number() external view returns (uint256);
        function setNumber(uint256 newNumber) external;
    }
}

/// Build the Counter interface definition.
pub fn counter_abi() -> Result<JsonAbi> {
    Ok(JsonAbi::parse(COUNTER_SIGNATURES)?)
}
