/*
[INPUT]:  Wallet adapter identifiers and public keys
[OUTPUT]: Wallet kinds, asset keys, balance snapshots, connect events
[POS]:    Wallet layer - data model shared by state and synchronizer
[UPDATE]: When adding wallet kinds or tracked assets
*/

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::http::{Result, StablepayError};

/// Chains the synchronizer knows how to query balances on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceChain {
    Solana,
}

/// Wallet adapter the user connected with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Phantom,
    TerraStation,
}

impl WalletKind {
    /// Chain whose on-chain balances this wallet reports, if any
    pub fn balance_chain(&self) -> Option<BalanceChain> {
        match self {
            WalletKind::Phantom => Some(BalanceChain::Solana),
            WalletKind::TerraStation => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Native,
    Stablecoin,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Stablecoin => f.write_str("stablecoin"),
        }
    }
}

/// Asset -> display amount
pub type BalanceSnapshot = BTreeMap<Asset, Decimal>;

/// 32-byte ed25519 public key as emitted by wallet providers
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| StablepayError::Config(format!("Invalid base58 public key: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            StablepayError::Config(format!(
                "Invalid public key length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Payload of a provider "connect" event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectEvent {
    pub public_key: PublicKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_phantom_queries_chain() {
        assert_eq!(WalletKind::Phantom.balance_chain(), Some(BalanceChain::Solana));
        assert_eq!(WalletKind::TerraStation.balance_chain(), None);
    }

    #[test]
    fn test_public_key_base58() {
        let key = PublicKey::new([0u8; 32]);
        assert_eq!(key.to_base58(), "11111111111111111111111111111111");

        let parsed = PublicKey::from_base58("11111111111111111111111111111111").unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_public_key_from_ed25519_verifying_key() {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&[42u8; 32]);
        let verifying = signing_key.verifying_key();

        let key = PublicKey::new(verifying.to_bytes());
        let parsed = PublicKey::from_base58(&key.to_base58()).unwrap();
        assert_eq!(parsed.as_bytes(), verifying.as_bytes());
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert!(PublicKey::from_base58("bs58tooShort").is_err());
        assert!(PublicKey::from_base58("invalid_base58_!@#").is_err());
    }

    #[test]
    fn test_asset_keys_serialize() {
        let mut balances = BalanceSnapshot::new();
        balances.insert(Asset::Native, "2.5".parse().unwrap());
        let value = serde_json::to_value(&balances).unwrap();
        assert_eq!(value, serde_json::json!({"native": "2.5"}));
    }
}
