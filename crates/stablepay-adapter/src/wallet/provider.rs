/*
[INPUT]:  Wallet adapter connect notifications
[OUTPUT]: Subscribable connect events keyed by provider identity
[POS]:    Wallet layer - boundary to the external wallet adapter
[UPDATE]: When adding provider events or adapter integrations
*/

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::broadcast;
use uuid::Uuid;

use super::types::{ConnectEvent, PublicKey};

const CONNECT_CHANNEL_CAPACITY: usize = 16;

/// Identity of a provider instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(Uuid);

impl ProviderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet adapter capability the synchronizer relies on
pub trait WalletProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// New receiver of future "connect" events
    fn subscribe_connect(&self) -> broadcast::Receiver<ConnectEvent>;
}

/// Non-owning handle to a provider, tagged with its identity
#[derive(Clone)]
pub struct ProviderRef {
    id: ProviderId,
    handle: Weak<dyn WalletProvider>,
}

impl ProviderRef {
    pub fn new<P: WalletProvider + 'static>(provider: &Arc<P>) -> Self {
        let weak: Weak<P> = Arc::downgrade(provider);
        let handle: Weak<dyn WalletProvider> = weak;
        Self {
            id: provider.id(),
            handle,
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// The provider, while its owner still keeps it alive
    pub fn upgrade(&self) -> Option<Arc<dyn WalletProvider>> {
        self.handle.upgrade()
    }
}

impl fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRef")
            .field("id", &self.id)
            .field("alive", &(self.handle.strong_count() > 0))
            .finish()
    }
}

/// In-process provider backed by a broadcast channel
#[derive(Debug)]
pub struct ChannelProvider {
    id: ProviderId,
    connect_tx: broadcast::Sender<ConnectEvent>,
}

impl ChannelProvider {
    pub fn new() -> Self {
        let (connect_tx, _) = broadcast::channel(CONNECT_CHANNEL_CAPACITY);
        Self {
            id: ProviderId::new(),
            connect_tx,
        }
    }

    /// Announce a connection; returns how many subscribers received it
    pub fn emit_connect(&self, public_key: PublicKey) -> usize {
        self.connect_tx
            .send(ConnectEvent { public_key })
            .unwrap_or(0)
    }

    /// Live connect subscribers
    pub fn receiver_count(&self) -> usize {
        self.connect_tx.receiver_count()
    }
}

impl Default for ChannelProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletProvider for ChannelProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn subscribe_connect(&self) -> broadcast::Receiver<ConnectEvent> {
        self.connect_tx.subscribe()
    }
}
