//! Contract binding and call result types.

use std::fmt;

use alloy::{
    dyn_abi::{DynSolValue, Specifier},
    json_abi::{Function, JsonAbi, StateMutability},
    primitives::{Address, TxHash, B256, U256},
};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Validate and parse a contract address.
///
/// Accepts 40 hex characters with an optional `0x` prefix. All-lowercase and
/// all-uppercase input is accepted as is; mixed case must be a valid EIP-55
/// checksum.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::InvalidAddress(format!(
            "{input:?} is not a 20-byte hex address"
        )));
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None)
            .map_err(|e| AppError::InvalidAddress(format!("{input}: {e}")))
    } else {
        hex.parse::<Address>().map_err(|e| AppError::InvalidAddress(format!("{input}: {e}")))
    }
}

/// A contract address bound to its interface definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    address: Address,
    abi: JsonAbi,
}

impl ContractDescriptor {
    /// Bind an interface to an address string, validating the address.
    pub fn new(address: &str, abi: JsonAbi) -> Result<Self> {
        Ok(Self { address: parse_address(address)?, abi })
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Interface definition.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Full signatures of every function, in interface order.
    pub fn functions(&self) -> Vec<String> {
        self.abi.functions().map(Function::full_signature).collect()
    }

    /// Whether the interface declares a function with this name.
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.function(name).is_some()
    }

    /// Find the overload of `name` that accepts `args`.
    pub fn resolve_function(&self, name: &str, args: &[DynSolValue]) -> Result<&Function> {
        let overloads = self.abi.function(name).ok_or_else(|| {
            AppError::Call(format!("function `{name}` not found in contract interface"))
        })?;

        let mut arity_matched = None;
        for function in overloads.iter().filter(|f| f.inputs.len() == args.len()) {
            arity_matched = Some(function);
            let types_match = function
                .inputs
                .iter()
                .zip(args)
                .all(|(param, value)| param.resolve().map(|ty| ty.matches(value)).unwrap_or(false));
            if types_match {
                return Ok(function);
            }
        }

        Err(match arity_matched {
            Some(function) => AppError::Call(format!(
                "arguments do not match parameter types of `{}`",
                function.signature()
            )),
            None => AppError::Call(format!(
                "`{name}` takes {} argument(s), got {}",
                overloads.iter().map(|f| f.inputs.len().to_string()).collect::<Vec<_>>().join(" or "),
                args.len()
            )),
        })
    }

    /// Coerce string arguments into typed ABI values for `name`.
    ///
    /// The first overload with a matching arity is used.
    pub fn parse_args(&self, name: &str, args: &[&str]) -> Result<Vec<DynSolValue>> {
        let overloads = self.abi.function(name).ok_or_else(|| {
            AppError::Call(format!("function `{name}` not found in contract interface"))
        })?;
        let function = overloads.iter().find(|f| f.inputs.len() == args.len()).ok_or_else(|| {
            AppError::Call(format!("`{name}` has no overload taking {} argument(s)", args.len()))
        })?;

        function
            .inputs
            .iter()
            .zip(args)
            .map(|(param, raw)| {
                let ty = param
                    .resolve()
                    .map_err(|e| AppError::Abi(format!("parameter type {}: {e}", param.ty)))?;
                ty.coerce_str(raw).map_err(|e| {
                    AppError::Call(format!("argument {raw:?} is not a valid {}: {e}", param.ty))
                })
            })
            .collect()
    }
}

/// Whether a function can change state.
pub fn is_read_only(function: &Function) -> bool {
    matches!(function.state_mutability, StateMutability::View | StateMutability::Pure)
}

/// Decoded return values of a read-only call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutput {
    values: Vec<DynSolValue>,
}

impl CallOutput {
    pub fn new(values: Vec<DynSolValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[DynSolValue] {
        &self.values
    }

    /// First return value as an unsigned integer.
    pub fn as_uint(&self) -> Option<U256> {
        self.values.first().and_then(|v| v.as_uint()).map(|(value, _)| value)
    }
}

impl fmt::Display for CallOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.values.iter().map(format_value).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Render an ABI value for console output.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::Function(f) => format!("0x{}", alloy::hex::encode(f.as_slice())),
        DynSolValue::FixedBytes(word, size) => {
            format!("0x{}", alloy::hex::encode(&word.as_slice()[..*size]))
        }
        DynSolValue::Bytes(bytes) => format!("0x{}", alloy::hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            format!("[{}]", items.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        DynSolValue::Tuple(items) => {
            format!("({})", items.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}

/// Handle to a submitted, not yet confirmed transaction.
///
/// Must be passed to `ContractSession::await_confirmation` before relying on
/// the mutation.
#[must_use = "a submitted transaction is not complete until it is confirmed"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    /// Transaction hash returned by the node.
    pub tx_hash: TxHash,
    /// Contract the call targets.
    pub contract: Address,
    /// Signature of the invoked function.
    pub function: String,
}

/// Confirmation record of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Transaction hash.
    pub transaction_hash: TxHash,
    /// Number of the block containing the transaction.
    pub block_number: u64,
    /// Hash of the block containing the transaction.
    pub block_hash: B256,
    /// Gas consumed by execution.
    pub gas_used: u64,
    /// Whether execution succeeded.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethereum::contracts::counter::counter_abi;

    const COUNTER_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn counter() -> ContractDescriptor {
        ContractDescriptor::new(COUNTER_ADDRESS, counter_abi().unwrap()).unwrap()
    }

    #[test]
    fn test_parse_address_checksummed() {
        let addr = parse_address(COUNTER_ADDRESS).unwrap();
        assert_eq!(addr.to_checksum(None), COUNTER_ADDRESS);
    }

    #[test]
    fn test_parse_address_lowercase_and_unprefixed() {
        let lower = parse_address("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
        let bare = parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
        assert_eq!(lower, bare);
    }

    #[test]
    fn test_parse_address_bad_checksum() {
        let result = parse_address("0x5fbDB2315678afecb367f032d93F642f64180aa3");
        assert!(matches!(result, Err(AppError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_address_malformed() {
        let non_hex = format!("0x{}", "g".repeat(40));
        for input in ["", "0x", "0x1234", "not-an-address", non_hex.as_str()] {
            let result = parse_address(input);
            assert!(matches!(result, Err(AppError::InvalidAddress(_))), "{input:?} accepted");
        }
    }

    #[test]
    fn test_functions_listing() {
        let functions = counter().functions();
        assert_eq!(functions.len(), 3);
        assert!(functions.iter().any(|f| f.contains("number()")));
    }

    #[test]
    fn test_resolve_function_missing() {
        let descriptor = counter();
        let result = descriptor.resolve_function("decrement", &[]);
        assert!(matches!(result, Err(AppError::Call(ref m)) if m.contains("decrement")));
    }

    #[test]
    fn test_resolve_function_wrong_arity() {
        let descriptor = counter();
        let result = descriptor.resolve_function("setNumber", &[]);
        assert!(matches!(result, Err(AppError::Call(ref m)) if m.contains("takes 1")));
    }

    #[test]
    fn test_resolve_function_wrong_type() {
        let descriptor = counter();
        let result = descriptor.resolve_function("setNumber", &[DynSolValue::Bool(true)]);
        assert!(matches!(result, Err(AppError::Call(ref m)) if m.contains("setNumber(uint256)")));
    }

    #[test]
    fn test_resolve_function_overload() {
        let abi = JsonAbi::parse([
            "function store(uint256 value)",
            "function store(uint256 value, bool flag)",
        ])
        .unwrap();
        let descriptor = ContractDescriptor::new(COUNTER_ADDRESS, abi).unwrap();

        let args = [DynSolValue::Uint(U256::from(1), 256), DynSolValue::Bool(true)];
        let function = descriptor.resolve_function("store", &args).unwrap();
        assert_eq!(function.signature(), "store(uint256,bool)");
    }

    #[test]
    fn test_parse_args() {
        let args = counter().parse_args("setNumber", &["42"]).unwrap();
        assert_eq!(args, vec![DynSolValue::Uint(U256::from(42), 256)]);

        let bad = counter().parse_args("setNumber", &["forty-two"]);
        assert!(matches!(bad, Err(AppError::Call(_))));
    }

    #[test]
    fn test_is_read_only() {
        let descriptor = counter();
        assert!(is_read_only(descriptor.resolve_function("number", &[]).unwrap()));
        assert!(!is_read_only(descriptor.resolve_function("increment", &[]).unwrap()));
    }

    #[test]
    fn test_call_output_display() {
        let output = CallOutput::new(vec![
            DynSolValue::Uint(U256::from(5), 256),
            DynSolValue::Bool(true),
            DynSolValue::String("hi".into()),
        ]);
        assert_eq!(output.to_string(), "5, true, hi");
        assert_eq!(output.values().len(), 3);
        assert_eq!(output.as_uint(), Some(U256::from(5)));
    }

    #[test]
    fn test_receipt_serialization() {
        let receipt = Receipt {
            transaction_hash: B256::repeat_byte(1),
            block_number: 7,
            block_hash: B256::repeat_byte(2),
            gas_used: 26_000,
            success: true,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["block_number"], 7);
        assert_eq!(json["success"], true);
    }
}
