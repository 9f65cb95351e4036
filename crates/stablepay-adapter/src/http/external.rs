/*
[INPUT]:  Explorer, currency conversion and geolocation base URLs
[OUTPUT]: Transaction history, converted amounts, caller country
[POS]:    HTTP layer - third-party services (no auth, no security headers)
[UPDATE]: When adding new external services or changing response format
*/

use reqwest::{Client, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, ConversionConfig, GeolocationConfig, LedgerConfig, WidgetConfig};
use crate::http::{Result, StablepayError};
use crate::types::{Conversion, CountryInfo};

/// Client for services outside the hosted API
#[derive(Debug, Clone)]
pub struct ExternalClient {
    http_client: Client,
    ledger: LedgerConfig,
    conversion: ConversionConfig,
    geolocation: GeolocationConfig,
}

impl ExternalClient {
    pub fn new(config: &WidgetConfig) -> Result<Self> {
        Self::with_config(
            config.api.client_config(),
            config.ledger.clone(),
            config.conversion.clone(),
            config.geolocation.clone(),
        )
    }

    pub fn with_config(
        client_config: ClientConfig,
        ledger: LedgerConfig,
        conversion: ConversionConfig,
        geolocation: GeolocationConfig,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(client_config.timeout)
            .connect_timeout(client_config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            ledger,
            conversion,
            geolocation,
        })
    }

    /// Caller's country from the IP geolocation service
    pub async fn get_country(&self) -> Result<CountryInfo> {
        let url = Url::parse(&self.geolocation.url)?;
        self.get_json(url).await
    }

    /// GET {terra_url}/v1/txs?offset=0&limit=100&account={account}
    pub async fn get_terra_transactions(&self, account: &str) -> Result<Value> {
        let mut url = join(&self.ledger.terra_url, "/v1/txs")?;
        url.query_pairs_mut()
            .append_pair("offset", "0")
            .append_pair("limit", "100")
            .append_pair("account", account);
        self.get_json(url).await
    }

    /// GET {solana_url}/account/token/txs?address={address}
    pub async fn get_solana_transactions(&self, address: &str) -> Result<Value> {
        let mut url = join(&self.ledger.solana_url, "/account/token/txs")?;
        url.query_pairs_mut().append_pair("address", address);
        self.get_json(url).await
    }

    /// Convert `amount` between currencies.
    ///
    /// The amount is rounded to 2 decimal places, the rate to 4.
    pub async fn currency_conversion(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Conversion> {
        let pair = format!("{from_currency}_{to_currency}");
        let mut url = join(&self.conversion.base_url, "/api/v7/convert")?;
        url.query_pairs_mut()
            .append_pair("q", &pair)
            .append_pair("compact", "ultra")
            .append_pair("apiKey", &self.conversion.currency_api_key);

        let body: Value = self.get_json(url).await?;
        let rate = body
            .get(&pair)
            .and_then(Value::as_f64)
            .and_then(Decimal::from_f64)
            .ok_or_else(|| {
                StablepayError::InvalidResponse(format!("conversion response missing rate for {pair}"))
            })?;

        debug!(pair = %pair, %rate, "currency rate fetched");
        Ok(Conversion {
            amount: (rate * amount).round_dp(2),
            rate: rate.round_dp(4),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.http_client.get(url).send().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn join(base: &str, path: &str) -> Result<Url> {
    if base.trim().is_empty() {
        return Err(StablepayError::Config(format!("no base url configured for {path}")));
    }
    let base = base.trim_end_matches('/');
    Ok(Url::parse(&format!("{base}{path}"))?)
}
