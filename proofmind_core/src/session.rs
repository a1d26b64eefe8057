// Wallet session manager
//
// Owns the single active wallet adapter. Everything after construction goes
// through the `WalletProvider` trait; only `wallet::create_provider` looks at
// the provider kind.

use crate::error::{CoreError, CoreResult};
use crate::models::{ProviderKind, WalletInfo};
use crate::network_provider::NetworkProvider;
use crate::settings::WalletSettings;
use crate::storage_trait::{keys, StorageBackend};
use crate::wallet::{create_provider, WalletBridge, WalletProvider};
use log::{debug, info, warn};
use std::rc::Rc;

pub struct WalletSessionManager {
    network: Rc<dyn NetworkProvider>,
    settings: WalletSettings,
    provider: Option<Box<dyn WalletProvider>>,
    wallet: Option<WalletInfo>,
}

impl WalletSessionManager {
    pub fn new(network: Rc<dyn NetworkProvider>, settings: WalletSettings) -> Self {
        Self {
            network,
            settings,
            provider: None,
            wallet: None,
        }
    }

    /// Log in through `kind` and return the connected wallet with its
    /// balance. An already active session is torn down first.
    pub async fn connect(
        &mut self,
        kind: ProviderKind,
        bridge: Rc<dyn WalletBridge>,
    ) -> CoreResult<WalletInfo> {
        if self.provider.is_some() {
            info!("Replacing active wallet session with {}", kind);
            if let Err(e) = self.disconnect().await {
                warn!("Previous wallet session did not log out cleanly: {}", e);
            }
        }

        let mut provider = create_provider(kind, bridge, self.network.clone(), &self.settings);
        let logged_in = match provider.login().await {
            Ok(ok) => ok,
            Err(CoreError::Connection(msg)) => return Err(CoreError::Connection(msg)),
            Err(e) => return Err(CoreError::Connection(e.to_string())),
        };
        if !logged_in {
            return Err(CoreError::Connection(format!(
                "{} wallet login was not completed",
                kind
            )));
        }
        let address = provider
            .address()
            .ok_or_else(|| CoreError::Connection(format!("{} wallet returned no address", kind)))?
            .to_string();

        let balance = match self.network.get_account(&address).await {
            Ok(account) => account.balance,
            Err(e) => {
                if let Err(logout_err) = provider.logout().await {
                    warn!("Logout after failed balance fetch also failed: {}", logout_err);
                }
                return Err(CoreError::Connection(format!(
                    "Failed to fetch balance for {}: {}",
                    address, e
                )));
            }
        };

        let info = WalletInfo {
            address,
            balance,
            is_connected: true,
            provider: kind,
        };
        info!("Wallet connected via {}: {}", kind, info.address);
        self.provider = Some(provider);
        self.wallet = Some(info.clone());
        Ok(info)
    }

    /// Log out of the active adapter. No-op when nothing is connected. The
    /// handle is cleared even if the adapter's logout fails.
    pub async fn disconnect(&mut self) -> CoreResult<()> {
        let Some(mut provider) = self.provider.take() else {
            debug!("disconnect: no active wallet session");
            return Ok(());
        };
        self.wallet = None;
        let kind = provider.kind();
        let result = provider.logout().await;
        info!("Wallet disconnected ({})", kind);
        result
    }

    /// Re-attach to the session described by the durable record without a
    /// login prompt. Stale or rejected records are deleted and `None` is
    /// returned.
    pub async fn restore<S: StorageBackend>(
        &mut self,
        storage: &S,
        bridge: Rc<dyn WalletBridge>,
    ) -> CoreResult<Option<WalletInfo>> {
        let Some(record) = load_session(storage).await? else {
            return Ok(None);
        };
        if !record.is_connected {
            return Ok(None);
        }

        if self.provider.is_some() {
            if let Err(e) = self.disconnect().await {
                warn!("Previous wallet session did not log out cleanly: {}", e);
            }
        }

        let mut provider = create_provider(record.provider, bridge, self.network.clone(), &self.settings);
        match provider.resume(&record.address).await {
            Ok(true) => {}
            Ok(false) => {
                info!("Stored {} session for {} is no longer authorized", record.provider, record.address);
                forget(storage).await?;
                return Ok(None);
            }
            Err(e) => {
                warn!("Could not restore {} session: {}", record.provider, e);
                forget(storage).await?;
                return Ok(None);
            }
        }

        let balance = match self.network.get_account(&record.address).await {
            Ok(account) => account.balance,
            Err(e) => {
                warn!("Balance refresh failed during restore, keeping stored value: {}", e);
                record.balance.clone()
            }
        };
        let info = WalletInfo { balance, ..record };
        info!("Restored {} session for {}", info.provider, info.address);
        self.provider = Some(provider);
        self.wallet = Some(info.clone());
        Ok(Some(info))
    }

    /// Re-read the balance of the connected account.
    pub async fn refresh_balance(&mut self) -> CoreResult<Option<WalletInfo>> {
        let Some(wallet) = self.wallet.as_mut() else {
            return Ok(None);
        };
        let account = self.network.get_account(&wallet.address).await?;
        wallet.balance = account.balance;
        Ok(Some(wallet.clone()))
    }

    pub fn active_provider(&self) -> Option<&dyn WalletProvider> {
        self.provider.as_deref()
    }

    pub fn wallet(&self) -> Option<&WalletInfo> {
        self.wallet.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.wallet.as_ref().map(|w| w.address.as_str())
    }

    pub fn is_connected(&self) -> bool {
        self.provider.is_some()
    }
}

/// Write the durable session record.
pub async fn persist<S: StorageBackend>(storage: &S, wallet: &WalletInfo) -> CoreResult<()> {
    storage.save(keys::WALLET_SESSION, wallet).await
}

/// Delete the durable session record.
pub async fn forget<S: StorageBackend>(storage: &S) -> CoreResult<()> {
    storage.remove(keys::WALLET_SESSION).await
}

/// Read the durable session record. A record that no longer parses is
/// treated as absent.
pub async fn load_session<S: StorageBackend>(storage: &S) -> CoreResult<Option<WalletInfo>> {
    match storage.load::<WalletInfo>(keys::WALLET_SESSION).await {
        Ok(record) => Ok(record),
        Err(CoreError::Json(e)) => {
            warn!("Ignoring unreadable session record: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
