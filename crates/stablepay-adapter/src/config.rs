/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed widget configuration and network -> cluster resolution
[POS]:    Configuration layer - API base URLs, chain settings, org networks
[UPDATE]: When adding new configuration options
*/

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::http::{Result, StablepayError};

const DEFAULT_CONVERSION_URL: &str = "https://api.currconv.com";
const DEFAULT_GEOLOCATION_URL: &str = "https://get.geojs.io/v1/ip/country.json";
const DEFAULT_SOLANA_NETWORK: &str = "solana";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level configuration for the widget backend plumbing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WidgetConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    pub solana: SolanaConfig,
    #[serde(default)]
    pub org: OrgConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

/// Hosted order API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// Ledger explorer base URLs (transaction history)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub terra_url: String,
    #[serde(default)]
    pub solana_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolanaConfig {
    /// Network name handed to the org cluster resolver
    #[serde(default = "default_solana_network")]
    pub network: String,
    /// Stablecoin (USDC) mint address
    pub usdc_mint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    #[serde(default = "default_conversion_url")]
    pub base_url: String,
    #[serde(default)]
    pub currency_api_key: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_url: default_conversion_url(),
            currency_api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_geolocation_url")]
    pub url: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            url: default_geolocation_url(),
        }
    }
}

/// Organization settings: which cluster each network name runs on
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrgConfig {
    #[serde(default)]
    pub networks: HashMap<String, Cluster>,
}

/// Resolves a network name to the cluster its RPC queries go to
pub trait ClusterResolver: Send + Sync {
    fn cluster_for_network(&self, network: &str) -> Cluster;
}

impl ClusterResolver for OrgConfig {
    fn cluster_for_network(&self, network: &str) -> Cluster {
        match self.networks.get(network) {
            Some(cluster) => cluster.clone(),
            None => {
                warn!(network, "no cluster configured for network, using devnet");
                Cluster::Devnet
            }
        }
    }
}

/// Named blockchain network endpoint group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cluster {
    MainnetBeta,
    Testnet,
    Devnet,
    Custom(Url),
}

impl Cluster {
    /// Public JSON-RPC URL for this cluster
    pub fn api_url(&self) -> Result<Url> {
        let raw = match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Custom(url) => return Ok(url.clone()),
        };
        Ok(Url::parse(raw)?)
    }
}

impl FromStr for Cluster {
    type Err = StablepayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "testnet" => Ok(Cluster::Testnet),
            "devnet" => Ok(Cluster::Devnet),
            other if other.starts_with("http://") || other.starts_with("https://") => {
                Ok(Cluster::Custom(Url::parse(other)?))
            }
            other => Err(StablepayError::Config(format!("Unknown cluster: {other}"))),
        }
    }
}

impl TryFrom<String> for Cluster {
    type Error = StablepayError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Cluster> for String {
    fn from(cluster: Cluster) -> Self {
        cluster.to_string()
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::MainnetBeta => f.write_str("mainnet-beta"),
            Cluster::Testnet => f.write_str("testnet"),
            Cluster::Devnet => f.write_str("devnet"),
            Cluster::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StablepayError::Config(format!("Failed to read {path}: {e}")))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| StablepayError::Config(format!("Invalid config YAML: {e}")))
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(StablepayError::Config("api.base_url cannot be empty".to_string()));
        }
        Url::parse(&self.api.base_url)?;

        let mint = self.solana.usdc_mint.trim();
        if mint.is_empty() {
            return Err(StablepayError::Config("solana.usdc_mint cannot be empty".to_string()));
        }
        let decoded = bs58::decode(mint).into_vec().map_err(|e| {
            StablepayError::Config(format!("solana.usdc_mint is not base58: {e}"))
        })?;
        if decoded.len() != 32 {
            return Err(StablepayError::Config(format!(
                "solana.usdc_mint must decode to 32 bytes, got {}",
                decoded.len()
            )));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_solana_network() -> String {
    DEFAULT_SOLANA_NETWORK.to_string()
}

fn default_conversion_url() -> String {
    DEFAULT_CONVERSION_URL.to_string()
}

fn default_geolocation_url() -> String {
    DEFAULT_GEOLOCATION_URL.to_string()
}
