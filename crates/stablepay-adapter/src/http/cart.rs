/*
[INPUT]:  Cart, order and user identifiers
[OUTPUT]: Hosted API responses for checkout flows
[POS]:    HTTP layer - cart and order endpoints (require auth)
[UPDATE]: When adding new hosted endpoints or changing query parameters
*/

// ### Cart / Order Endpoints

use reqwest::Method;
use rust_decimal::Decimal;
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

use crate::http::{ApiClient, Result};
use crate::types::{Blockchain, CreateOrderRequest, CreateOrderResponse, CreateTransactionRequest};

impl ApiClient {
    /// Start a cart transaction on a chain
    ///
    /// POST /v1/cart/create-tx
    pub async fn create_transaction(&self, blockchain: Blockchain) -> Result<Value> {
        let body = serde_json::to_value(CreateTransactionRequest { blockchain })?;
        self.call_json("/v1/cart/create-tx", Method::POST, Some(&body))
            .await
    }

    /// GET /v1/cart/tx-status?address={address}
    pub async fn check_transaction_status(&self, address: &str) -> Result<Value> {
        let endpoint = format!("/v1/cart/tx-status?address={}", encode(address));
        self.call_json(&endpoint, Method::GET, None).await
    }

    /// Place an order
    ///
    /// POST /v1/order
    pub async fn create_order(&self, order: &CreateOrderRequest) -> Result<CreateOrderResponse> {
        let body = serde_json::to_value(order)?;
        self.call_as("/v1/order", Method::POST, Some(&body)).await
    }

    /// GET /v1/user/{user_id}/order/{amount}
    pub async fn get_transaction_by_amount(&self, user_id: &str, amount: Decimal) -> Result<Value> {
        let endpoint = format!("/v1/user/{}/order/{}", encode(user_id), amount.normalize());
        self.call_json(&endpoint, Method::GET, None).await
    }

    /// GET /v1/cart/sales-tax?zipcode={zipcode}
    pub async fn query_sales_tax(&self, zipcode: &str) -> Result<Value> {
        let endpoint = format!("/v1/cart/sales-tax?zipcode={}", encode(zipcode));
        self.call_json(&endpoint, Method::GET, None).await
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
