/*
[INPUT]:  Wallet adapter events, wallet UI selections, chain RPC
[OUTPUT]: Observable wallet state with synchronized balances
[POS]:    Wallet layer - connected wallet and its balances
[UPDATE]: When adding wallet kinds, providers or balance sources
*/

pub mod provider;
pub mod state;
pub mod sync;
pub mod types;

pub use provider::{ChannelProvider, ProviderId, ProviderRef, WalletProvider};
pub use state::{WalletConnection, WalletSnapshot, WalletState};
pub use sync::{BalanceSource, BalanceSynchronizer, SolanaBalanceSource};
pub use types::{Asset, BalanceChain, BalanceSnapshot, ConnectEvent, PublicKey, WalletKind};
