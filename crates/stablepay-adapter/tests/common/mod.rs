/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for stablepay-adapter tests

#![allow(dead_code)]

use chrono::Utc;
use serde_json::{Value, json};
use stablepay_adapter::{AuthToken, CredentialStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Token expiring `offset_secs` from now
pub fn token_expiring_in(access: &str, offset_secs: i64) -> AuthToken {
    AuthToken {
        access_token: access.to_string(),
        refresh_token: format!("refresh-{access}"),
        expiry: Utc::now().timestamp() + offset_secs,
        api_key: "test-api-key".to_string(),
        user_id: "user-1".to_string(),
    }
}

/// Logged-in store holding `token`
pub fn store_with(token: AuthToken) -> CredentialStore {
    let store = CredentialStore::new();
    store.set_auth(token);
    store.set_is_logged_in(true);
    store
}

/// Successful refresh body carrying a new access token
pub fn refresh_success(access: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "token": {
                "accessToken": access,
                "refreshToken": format!("refresh-{access}"),
                "expiry": Utc::now().timestamp() + 3600,
                "apiKey": "test-api-key",
                "userId": "user-1",
            }
        }
    })
}

pub async fn mount_refresh(server: &MockServer, response: ResponseTemplate, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/user/auth/refresh"))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

/// JSON-RPC success envelope with a context-wrapped value
pub fn rpc_value(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": "1",
        "result": {"context": {"slot": 1}, "value": value},
    }))
}

pub async fn mount_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(response)
        .mount(server)
        .await;
}

/// jsonParsed SPL token account
pub fn token_account(mint: &str, ui_amount: f64) -> Value {
    json!({
        "pubkey": "TokenAcct",
        "account": {
            "lamports": 2039280,
            "data": {
                "program": "spl-token",
                "parsed": {
                    "type": "account",
                    "info": {
                        "mint": mint,
                        "owner": "Owner",
                        "tokenAmount": {
                            "amount": "0",
                            "decimals": 6,
                            "uiAmount": ui_amount,
                            "uiAmountString": ui_amount.to_string(),
                        }
                    }
                }
            }
        }
    })
}
