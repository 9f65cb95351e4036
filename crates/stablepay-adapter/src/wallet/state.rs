/*
[INPUT]:  Wallet UI actions, provider connect events, balance query results
[OUTPUT]: Latest wallet snapshot via `watch` for the UI and the synchronizer
[POS]:    Wallet layer - shared wallet state container
[UPDATE]: When adding wallet fields or changing invalidation rules
*/

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::debug;

use super::provider::{ProviderId, ProviderRef, WalletProvider};
use super::types::{Asset, BalanceSnapshot, WalletKind};

/// Who is connected, and through which provider
#[derive(Debug, Clone, Default)]
pub struct WalletConnection {
    pub kind: Option<WalletKind>,
    /// Always `None` while `kind` is `None`
    pub address: Option<String>,
    pub provider: Option<ProviderRef>,
}

#[derive(Debug, Clone, Default)]
pub struct WalletSnapshot {
    pub connection: WalletConnection,
    pub balances: BalanceSnapshot,
    /// Bumped whenever `(address, kind)` changes
    pub generation: u64,
}

impl WalletSnapshot {
    pub fn kind(&self) -> Option<WalletKind> {
        self.connection.kind
    }

    pub fn address(&self) -> Option<&str> {
        self.connection.address.as_deref()
    }

    pub fn provider_id(&self) -> Option<ProviderId> {
        self.connection.provider.as_ref().map(ProviderRef::id)
    }
}

/// Shared wallet state.
///
/// Every mutation is a single `watch` update, so subscribers never see a
/// snapshot where only part of a change has been applied.
#[derive(Debug, Clone)]
pub struct WalletState {
    tx: Arc<watch::Sender<WalletSnapshot>>,
}

impl WalletState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WalletSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.tx.borrow().clone()
    }

    pub fn balances(&self) -> BalanceSnapshot {
        self.tx.borrow().balances.clone()
    }

    /// Select the wallet kind; `None` disconnects and clears the address
    pub fn set_wallet_kind(&self, kind: Option<WalletKind>) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.connection.kind == kind {
                return false;
            }
            snapshot.connection.kind = kind;
            if kind.is_none() {
                snapshot.connection.address = None;
                snapshot.balances.clear();
            }
            snapshot.generation += 1;
            true
        });
    }

    /// Attach the provider the current wallet kind connects through
    pub fn attach_provider<P: WalletProvider + 'static>(&self, provider: &Arc<P>) {
        let provider = ProviderRef::new(provider);
        self.tx.send_if_modified(|snapshot| {
            if snapshot.provider_id() == Some(provider.id()) {
                return false;
            }
            snapshot.connection.provider = Some(provider);
            true
        });
    }

    pub fn detach_provider(&self) {
        self.tx.send_if_modified(|snapshot| snapshot.connection.provider.take().is_some());
    }

    /// Set or clear the public address; clearing empties the balances.
    ///
    /// An address is only accepted while a wallet kind is selected.
    pub fn update_address(&self, address: Option<String>) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.connection.address == address {
                return false;
            }
            if address.is_some() && snapshot.connection.kind.is_none() {
                debug!("ignoring address while no wallet kind is selected");
                return false;
            }
            if address.is_none() {
                snapshot.balances.clear();
            }
            snapshot.connection.address = address;
            snapshot.generation += 1;
            true
        });
    }

    /// Merge `update` into the current balances
    pub fn update_balance(&self, update: BalanceSnapshot) {
        self.tx.send_modify(|snapshot| snapshot.balances.extend(update));
    }

    /// Replace the whole balance map
    pub fn replace_balances(&self, balances: BalanceSnapshot) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.balances == balances {
                return false;
            }
            snapshot.balances = balances;
            true
        });
    }

    /// Write one asset amount if no wallet change happened since `generation`.
    ///
    /// Returns false when the result is stale and was dropped.
    pub fn merge_balance_if_current(&self, generation: u64, asset: Asset, amount: Decimal) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.balances.insert(asset, amount);
            true
        })
    }
}

impl Default for WalletState {
    fn default() -> Self {
        Self::new()
    }
}
