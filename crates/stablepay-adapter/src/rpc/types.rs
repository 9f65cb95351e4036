/*
[INPUT]:  Solana JSON-RPC schema
[OUTPUT]: Typed request envelope, responses and parsed token accounts
[POS]:    RPC layer - wire types for the chain endpoint
[UPDATE]: When RPC methods or parsed account shapes change
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

/// Base units (lamports) per native token
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// How finalized returned state must be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    /// Level that tolerates a single confirmation
    pub const SINGLE_CONFIRMATION: Commitment = Commitment::Confirmed;
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'a str,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// `{ context, value }` wrapper used by most account queries
#[derive(Debug, Clone, Deserialize)]
pub struct WithContext<T> {
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedTokenAccount {
    pub pubkey: String,
    pub account: ParsedAccount,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedAccount {
    pub data: ParsedAccountData,
    #[serde(default)]
    pub lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedAccountData {
    #[serde(default)]
    pub program: String,
    pub parsed: ParsedTokenData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedTokenData {
    pub info: TokenAccountInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountInfo {
    pub mint: String,
    #[serde(default)]
    pub owner: String,
    pub token_amount: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub ui_amount: Option<Decimal>,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl ParsedTokenAccount {
    pub fn mint(&self) -> &str {
        &self.account.data.parsed.info.mint
    }

    pub fn ui_amount(&self) -> Option<Decimal> {
        self.account.data.parsed.info.token_amount.ui_amount
    }
}

/// Convert base units to display units
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(2_500_000_000), "2.5".parse::<Decimal>().unwrap());
        assert_eq!(lamports_to_sol(0), Decimal::ZERO);
        assert_eq!(lamports_to_sol(1), "0.000000001".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_parse_token_account() {
        let account: ParsedTokenAccount = serde_json::from_value(json!({
            "pubkey": "TokenAcct1",
            "account": {
                "lamports": 2039280,
                "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                "executable": false,
                "rentEpoch": 361,
                "data": {
                    "program": "spl-token",
                    "space": 165,
                    "parsed": {
                        "type": "account",
                        "info": {
                            "isNative": false,
                            "mint": "MintA",
                            "owner": "Owner1",
                            "state": "initialized",
                            "tokenAmount": {
                                "amount": "10500000",
                                "decimals": 6,
                                "uiAmount": 10.5,
                                "uiAmountString": "10.5"
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(account.mint(), "MintA");
        assert_eq!(account.ui_amount(), Some("10.5".parse().unwrap()));
    }

    #[test]
    fn test_null_ui_amount() {
        let amount: TokenAmount = serde_json::from_value(json!({
            "amount": "0",
            "decimals": 6,
            "uiAmount": null
        }))
        .unwrap();
        assert!(amount.ui_amount.is_none());
    }

    #[test]
    fn test_envelope_with_error_and_no_result() {
        let response: RpcResponse<WithContext<u64>> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": {"code": -32602, "message": "Invalid param"}
        }))
        .unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32602);

        let response: RpcResponse<WithContext<u64>> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "result": {"context": {"slot": 1}, "value": 7}
        }))
        .unwrap();
        assert_eq!(response.result.unwrap().value, 7);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_commitment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Commitment::SINGLE_CONFIRMATION).unwrap(),
            json!("confirmed")
        );
    }
}
