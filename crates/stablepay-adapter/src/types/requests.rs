/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::Blockchain;

/// Body of POST /v1/user/auth/refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub user_id: String,
    pub refresh_token: String,
    pub api_key: String,
}

/// Body of POST /v1/cart/create-tx
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub blockchain: Blockchain,
}

/// Body of POST /v1/order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_fee: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ust_price_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terra_tx: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solana_tx: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<OrderBlockchain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_card: Option<GiftCard>,
    #[serde(with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderBlockchain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCard {
    pub id: String,
}
