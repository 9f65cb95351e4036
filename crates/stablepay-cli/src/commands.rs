/*
[INPUT]:  Loaded widget configuration and subcommand arguments
[OUTPUT]: Balances, transaction status, conversions and geolocation results
[POS]:    Command layer - wires adapter clients for each subcommand
[UPDATE]: When adding subcommands or changing their outputs
*/

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use stablepay_adapter::{
    ApiClient, BalanceSnapshot, BalanceSynchronizer, Conversion, CountryInfo, CredentialStore,
    ExternalClient, JsonFilePersistence, PublicKey, WalletKind, WalletState, WidgetConfig,
};

pub fn validate(config: &WidgetConfig) -> Result<()> {
    config.validate().context("validate config")?;
    info!(
        base_url = %config.api.base_url,
        network = %config.solana.network,
        networks = config.org.networks.len(),
        "configuration valid"
    );
    Ok(())
}

/// Query the balances of a Phantom wallet once
pub async fn balance(config: &WidgetConfig, address: &str) -> Result<BalanceSnapshot> {
    let state = connected_state(address)?;
    let sync = BalanceSynchronizer::from_config(state.clone(), config);

    let Some(query) = sync.refresh_now() else {
        bail!("no balance source for a phantom wallet");
    };
    query.await.context("balance query task")?;
    Ok(state.balances())
}

/// Keep balances in sync until `shutdown`, reporting every distinct snapshot
pub async fn watch_balance<F>(
    config: &WidgetConfig,
    address: &str,
    shutdown: CancellationToken,
    mut on_update: F,
) -> Result<()>
where
    F: FnMut(&BalanceSnapshot) -> Result<()>,
{
    PublicKey::from_base58(address).context("invalid wallet address")?;

    let state = WalletState::new();
    let mut rx = state.subscribe();
    let handle = BalanceSynchronizer::from_config(state.clone(), config).spawn(shutdown.clone());

    state.set_wallet_kind(Some(WalletKind::Phantom));
    state.update_address(Some(address.to_string()));

    let mut last: Option<BalanceSnapshot> = None;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let balances = rx.borrow_and_update().balances.clone();
                if balances.is_empty() || last.as_ref() == Some(&balances) {
                    continue;
                }
                on_update(&balances)?;
                last = Some(balances);
            }
        }
    }

    shutdown.cancel();
    handle.await.context("balance synchronizer task")?;
    Ok(())
}

/// Cart transaction status, authenticated with saved credentials
pub async fn tx_status(config: &WidgetConfig, address: &str, auth_file: Option<&Path>) -> Result<Value> {
    let credentials = match auth_file {
        Some(path) => {
            debug!(path = %path.display(), "restoring credentials");
            CredentialStore::restore(Arc::new(JsonFilePersistence::new(path)))
                .context("restore credentials")?
        }
        None => CredentialStore::new(),
    };

    let client = ApiClient::with_config(config.api.client_config(), &config.api.base_url, credentials)
        .context("build api client")?;
    client
        .check_transaction_status(address)
        .await
        .context("check transaction status")
}

pub async fn convert(config: &WidgetConfig, amount: Decimal, from: &str, to: &str) -> Result<Conversion> {
    let client = ExternalClient::new(config).context("build external client")?;
    client
        .currency_conversion(amount, from, to)
        .await
        .with_context(|| format!("convert {from} to {to}"))
}

pub async fn country(config: &WidgetConfig) -> Result<CountryInfo> {
    let client = ExternalClient::new(config).context("build external client")?;
    client.get_country().await.context("geolocate caller")
}

fn connected_state(address: &str) -> Result<WalletState> {
    PublicKey::from_base58(address).context("invalid wallet address")?;
    let state = WalletState::new();
    state.set_wallet_kind(Some(WalletKind::Phantom));
    state.update_address(Some(address.to_string()));
    Ok(state)
}
