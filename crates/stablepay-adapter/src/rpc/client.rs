/*
[INPUT]:  Cluster RPC URL, owner addresses and mint filters
[OUTPUT]: Native balances (lamports) and parsed SPL token accounts
[POS]:    RPC layer - JSON-RPC 2.0 client for the chain endpoint
[UPDATE]: When adding RPC methods or changing request encoding
*/

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::config::{ClientConfig, Cluster};
use crate::http::{Result, StablepayError};

use super::types::{
    Commitment, JSONRPC_VERSION, ParsedTokenAccount, RpcRequest, RpcResponse, WithContext,
};

/// JSON-RPC client bound to one cluster endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    http_client: Client,
    url: Url,
}

impl RpcClient {
    pub fn new(url: Url) -> Result<Self> {
        Self::with_config(ClientConfig::default(), url)
    }

    pub fn with_config(config: ClientConfig, url: Url) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http_client, url })
    }

    /// Client for a cluster's public endpoint
    pub fn for_cluster(cluster: &Cluster) -> Result<Self> {
        Self::new(cluster.api_url()?)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// getBalance, in lamports
    pub async fn get_balance(&self, address: &str, commitment: Commitment) -> Result<u64> {
        let params = json!([address, {"commitment": commitment}]);
        let response: WithContext<u64> = self.request("getBalance", params).await?;
        Ok(response.value)
    }

    /// getTokenAccountsByOwner filtered to one mint, jsonParsed encoding
    pub async fn get_parsed_token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
        commitment: Commitment,
    ) -> Result<Vec<ParsedTokenAccount>> {
        let params = json!([
            owner,
            {"mint": mint},
            {"encoding": "jsonParsed", "commitment": commitment},
        ]);
        let response: WithContext<Vec<ParsedTokenAccount>> =
            self.request("getTokenAccountsByOwner", params).await?;
        Ok(response.value)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };

        let response = self
            .http_client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(method, status = status.as_u16(), "rpc response");

        let envelope: RpcResponse<T> = serde_json::from_slice(&bytes)?;
        if let Some(error) = envelope.error {
            return Err(StablepayError::rpc_error(error.code, error.message));
        }
        envelope
            .result
            .ok_or_else(|| StablepayError::InvalidResponse(format!("{method} returned no result")))
    }
}
