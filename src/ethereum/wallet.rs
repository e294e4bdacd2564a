//! Wallet management.

use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};

use crate::error::{AppError, Result};

/// Signer derived from a private key.
///
/// Holds the key material and nothing else; `Debug` only shows the address.
#[derive(Clone)]
pub struct WalletManager {
    /// The local signer.
    signer: PrivateKeySigner,
    /// Wallet address.
    address: Address,
}

impl WalletManager {
    /// Create a wallet manager from a private key string.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        if key.len() != 64 {
            return Err(AppError::InvalidKey(format!(
                "expected 32 bytes of hex, got {} characters",
                key.len()
            )));
        }

        let signer: PrivateKeySigner = key.parse()?;
        let address = signer.address();

        tracing::info!(address = %address, "Wallet initialized");

        Ok(Self { signer, address })
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the signer for transaction signing.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Wrap the signer for use in an alloy provider's wallet filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::network::NetworkWallet;
    use alloy::network::Ethereum;

    // Well-known Hardhat/Anvil development key (DO NOT use with real funds!)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_PRIVATE_KEY_NO_PREFIX: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key_with_prefix() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let addr_str = format!("{:?}", wallet.address()).to_lowercase();
        assert_eq!(addr_str, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn test_wallet_from_private_key_without_prefix() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY_NO_PREFIX).unwrap();
        let addr_str = format!("{:?}", wallet.address()).to_lowercase();
        assert_eq!(addr_str, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn test_wallet_surrounding_whitespace_ignored() {
        let wallet = WalletManager::from_private_key(&format!("  {TEST_PRIVATE_KEY}\n")).unwrap();
        let expected = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(wallet.address(), expected.address());
    }

    #[test]
    fn test_wallet_invalid_private_key() {
        for key in ["0x1234", "", "invalid_key"] {
            let result = WalletManager::from_private_key(key);
            assert!(matches!(result, Err(AppError::InvalidKey(_))), "{key:?} should be rejected");
        }
    }

    #[test]
    fn test_wallet_non_hex_key_of_right_length() {
        let key = format!("0x{}", "zz".repeat(32));
        let result = WalletManager::from_private_key(&key);
        assert!(matches!(result, Err(AppError::InvalidKey(_))));
    }

    #[test]
    fn test_wallet_zero_key_rejected() {
        // Zero is outside the secp256k1 scalar range
        let key = format!("0x{}", "00".repeat(32));
        assert!(WalletManager::from_private_key(&key).is_err());
    }

    #[test]
    fn test_wallet_signer_getter() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(wallet.signer().address(), wallet.address());
    }

    #[test]
    fn test_ethereum_wallet_uses_same_address() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let eth_wallet = wallet.ethereum_wallet();
        assert_eq!(
            <EthereumWallet as NetworkWallet<Ethereum>>::default_signer_address(&eth_wallet),
            wallet.address()
        );
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", wallet);

        assert!(debug_str.contains("WalletManager"));
        assert!(debug_str.contains("address"));
        assert!(!debug_str.contains(TEST_PRIVATE_KEY_NO_PREFIX));
    }

    #[test]
    fn test_wallet_different_keys_different_addresses() {
        // Second Hardhat test account
        let key2 = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

        let wallet1 = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let wallet2 = WalletManager::from_private_key(key2).unwrap();

        assert_ne!(wallet1.address(), wallet2.address());
    }
}
