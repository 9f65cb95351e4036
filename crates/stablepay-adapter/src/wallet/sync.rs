/*
[INPUT]:  Wallet state changes, provider connect events, chain RPC balances
[OUTPUT]: Native and stablecoin balances merged into wallet state
[POS]:    Wallet layer - event-driven balance synchronizer
[UPDATE]: When adding balance sources or changing trigger rules
*/

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ClusterResolver, WidgetConfig};
use crate::rpc::{Commitment, RpcClient, lamports_to_sol};

use super::provider::{ProviderId, ProviderRef};
use super::state::{WalletSnapshot, WalletState};
use super::types::{Asset, BalanceChain, WalletKind};

/// Queries one chain's balances for an address and merges them into state.
///
/// Results must be written with [`WalletState::merge_balance_if_current`]
/// under the given `generation`, so a wallet change made while the query
/// was in flight discards them.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn sync(&self, address: &str, generation: u64, state: &WalletState);
}

/// Native SOL plus a single SPL stablecoin mint
pub struct SolanaBalanceSource {
    resolver: Arc<dyn ClusterResolver>,
    network: String,
    stablecoin_mint: String,
    client_config: ClientConfig,
}

impl SolanaBalanceSource {
    pub fn new(
        resolver: Arc<dyn ClusterResolver>,
        network: impl Into<String>,
        stablecoin_mint: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            network: network.into(),
            stablecoin_mint: stablecoin_mint.into(),
            client_config: ClientConfig::default(),
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        let mut source = Self::new(
            Arc::new(config.org.clone()),
            config.solana.network.clone(),
            config.solana.usdc_mint.clone(),
        );
        source.client_config = config.api.client_config();
        source
    }

    fn connection(&self) -> Option<RpcClient> {
        let cluster = self.resolver.cluster_for_network(&self.network);
        let client = cluster
            .api_url()
            .and_then(|url| RpcClient::with_config(self.client_config.clone(), url));
        match client {
            Ok(client) => Some(client),
            Err(err) => {
                warn!(network = %self.network, %cluster, error = %err, "cannot build rpc client");
                None
            }
        }
    }

    async fn sync_native(&self, rpc: &RpcClient, address: &str, generation: u64, state: &WalletState) {
        match rpc.get_balance(address, Commitment::Confirmed).await {
            Ok(lamports) => {
                let amount = lamports_to_sol(lamports);
                if state.merge_balance_if_current(generation, Asset::Native, amount) {
                    debug!(address, %amount, "native balance updated");
                } else {
                    debug!(address, generation, "discarding stale native balance");
                }
            }
            Err(err) => warn!(address, error = %err, "failed to get native balance"),
        }
    }

    async fn sync_stablecoin(
        &self,
        rpc: &RpcClient,
        address: &str,
        generation: u64,
        state: &WalletState,
    ) {
        let accounts = match rpc
            .get_parsed_token_accounts_by_owner(
                address,
                &self.stablecoin_mint,
                Commitment::SINGLE_CONFIRMATION,
            )
            .await
        {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(address, error = %err, "failed to get stablecoin token accounts");
                return;
            }
        };

        // One write per matching account; the last one iterated wins.
        for account in &accounts {
            if account.mint() != self.stablecoin_mint {
                continue;
            }
            let Some(amount) = account.ui_amount() else {
                continue;
            };
            if !state.merge_balance_if_current(generation, Asset::Stablecoin, amount) {
                debug!(address, generation, "discarding stale stablecoin balance");
                return;
            }
        }
    }
}

#[async_trait]
impl BalanceSource for SolanaBalanceSource {
    async fn sync(&self, address: &str, generation: u64, state: &WalletState) {
        let Some(rpc) = self.connection() else {
            return;
        };
        join(
            self.sync_native(&rpc, address, generation, state),
            self.sync_stablecoin(&rpc, address, generation, state),
        )
        .await;
    }
}

/// Keeps wallet balances in step with the connected wallet.
///
/// Cheap to clone; clones share the same state and sources.
#[derive(Clone)]
pub struct BalanceSynchronizer {
    state: WalletState,
    sources: Arc<HashMap<BalanceChain, Arc<dyn BalanceSource>>>,
}

impl BalanceSynchronizer {
    pub fn new(state: WalletState) -> Self {
        Self {
            state,
            sources: Arc::new(HashMap::new()),
        }
    }

    /// Synchronizer with the Solana source built from config
    pub fn from_config(state: WalletState, config: &WidgetConfig) -> Self {
        Self::new(state).with_source(
            BalanceChain::Solana,
            Arc::new(SolanaBalanceSource::from_config(config)),
        )
    }

    pub fn with_source(mut self, chain: BalanceChain, source: Arc<dyn BalanceSource>) -> Self {
        Arc::make_mut(&mut self.sources).insert(chain, source);
        self
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    /// Run the synchronizer until `shutdown` is cancelled
    pub fn spawn(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.run(shutdown).await })
    }

    /// Query balances for the current wallet now.
    ///
    /// Returns the query task, or `None` when nothing is connected or the
    /// wallet kind has no on-chain source.
    pub fn refresh_now(&self) -> Option<JoinHandle<()>> {
        let snapshot = self.state.snapshot();
        let address = snapshot.address()?.to_string();
        let kind = snapshot.kind()?;
        self.spawn_query(address, kind, snapshot.generation)
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut rx = self.state.subscribe();
        let mut listener: Option<JoinHandle<()>> = None;
        let mut seen_provider: Option<ProviderId> = None;
        let mut seen_generation: Option<u64> = None;

        info!("balance synchronizer started");
        loop {
            let snapshot = rx.borrow_and_update().clone();

            if snapshot.provider_id() != seen_provider {
                seen_provider = snapshot.provider_id();
                if let Some(old) = listener.take() {
                    old.abort();
                }
                listener = snapshot
                    .connection
                    .provider
                    .as_ref()
                    .and_then(|provider| self.listen_for_connect(provider));
            }

            if seen_generation != Some(snapshot.generation) {
                seen_generation = Some(snapshot.generation);
                self.on_wallet_changed(&snapshot);
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(listener) = listener {
            listener.abort();
        }
        info!("balance synchronizer stopped");
    }

    fn on_wallet_changed(&self, snapshot: &WalletSnapshot) {
        let Some(address) = snapshot.address() else {
            self.state.replace_balances(Default::default());
            return;
        };
        let Some(kind) = snapshot.kind() else {
            return;
        };
        // Detached: a later wallet change does not abort it, the generation
        // check drops its results instead.
        let _ = self.spawn_query(address.to_string(), kind, snapshot.generation);
    }

    fn spawn_query(&self, address: String, kind: WalletKind, generation: u64) -> Option<JoinHandle<()>> {
        let Some(source) = kind
            .balance_chain()
            .and_then(|chain| self.sources.get(&chain))
            .cloned()
        else {
            debug!(?kind, "wallet kind has no on-chain balance source");
            return None;
        };

        let state = self.state.clone();
        debug!(address = %address, ?kind, generation, "querying balances");
        Some(tokio::spawn(async move {
            source.sync(&address, generation, &state).await;
        }))
    }

    /// Install a connect listener; the provider itself is not retained
    fn listen_for_connect(&self, provider: &ProviderRef) -> Option<JoinHandle<()>> {
        let Some(handle) = provider.upgrade() else {
            debug!(provider = %provider.id(), "provider dropped before subscribing");
            return None;
        };
        let mut events = handle.subscribe_connect();
        drop(handle);

        let state = self.state.clone();
        let provider_id = provider.id();
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let address = event.public_key.to_base58();
                        info!(provider = %provider_id, address = %address, "wallet connected");
                        state.update_address(Some(address));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(provider = %provider_id, skipped, "connect events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }
}
