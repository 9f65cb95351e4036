/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Stablepay adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod config;
pub mod http;
pub mod rpc;
pub mod types;
pub mod wallet;

// Re-export commonly used types from auth
pub use auth::{AuthPersistence, AuthToken, CredentialStore, JsonFilePersistence, MemoryPersistence};

// Re-export config
pub use config::{ClientConfig, Cluster, ClusterResolver, WidgetConfig};

// Re-export commonly used types from http
pub use http::{ApiClient, ExternalClient, REFRESH_BUFFER_SECS, Result, StablepayError};

pub use rpc::{Commitment, RpcClient};

// Re-export all types
pub use types::*;

// Re-export commonly used types from wallet
pub use wallet::{
    Asset,
    BalanceSnapshot,
    BalanceSource,
    BalanceSynchronizer,
    ChannelProvider,
    PublicKey,
    SolanaBalanceSource,
    WalletKind,
    WalletProvider,
    WalletState,
};
