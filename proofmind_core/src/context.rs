// Application context
//
// Built once at startup and handed to whatever drives the application (the
// browser bindings or the CLI). Owns the session manager, the contract
// gateway and the certificate store.

use crate::error::{CoreError, CoreResult};
use crate::gateway::ContractGateway;
use crate::models::{
    Certificate, CategoryStats, CertificateCategory, CreateCertificateRequest, DashboardStats,
    ProviderKind, TransactionStatus, UpdateCertificateRequest, WalletInfo,
};
use crate::network_provider::NetworkProvider;
use crate::session::WalletSessionManager;
use crate::settings::NetworkConfig;
use crate::storage_trait::StorageBackend;
use crate::store::CertificateStore;
use crate::validation::{normalize_tags, validate_create, validate_update};
use crate::wallet::WalletBridge;
use log::info;
use std::rc::Rc;

pub struct ProofMindContext {
    config: Rc<NetworkConfig>,
    session: WalletSessionManager,
    gateway: ContractGateway,
    store: CertificateStore,
}

impl ProofMindContext {
    pub fn new(config: NetworkConfig, network: Rc<dyn NetworkProvider>) -> Self {
        let config = Rc::new(config);
        let session = WalletSessionManager::new(network.clone(), config.wallets.clone());
        let gateway = ContractGateway::new(config.clone(), network);
        Self {
            config,
            session,
            gateway,
            store: CertificateStore::new(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn session(&self) -> &WalletSessionManager {
        &self.session
    }

    pub fn gateway(&self) -> &ContractGateway {
        &self.gateway
    }

    pub fn store(&self) -> &CertificateStore {
        &self.store
    }

    pub fn wallet(&self) -> Option<&WalletInfo> {
        self.session.wallet()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub async fn connect(
        &mut self,
        kind: ProviderKind,
        bridge: Rc<dyn WalletBridge>,
    ) -> CoreResult<WalletInfo> {
        let info = self.session.connect(kind, bridge).await?;
        self.store.refresh(&self.gateway, &info.address).await;
        Ok(info)
    }

    /// Re-read the connected account's balance; `None` when disconnected.
    pub async fn refresh_balance(&mut self) -> CoreResult<Option<WalletInfo>> {
        self.session.refresh_balance().await
    }

    pub async fn disconnect(&mut self) -> CoreResult<()> {
        self.store.clear();
        self.session.disconnect().await
    }

    /// Silent restore from the durable session record.
    pub async fn restore_session<S: StorageBackend>(
        &mut self,
        storage: &S,
        bridge: Rc<dyn WalletBridge>,
    ) -> CoreResult<Option<WalletInfo>> {
        let restored = self.session.restore(storage, bridge).await?;
        if let Some(info) = &restored {
            self.store.refresh(&self.gateway, &info.address).await;
        }
        Ok(restored)
    }

    /// Validate, submit `certifyAction`, then reload the owner's list.
    pub async fn create_certificate(&mut self, request: CreateCertificateRequest) -> CoreResult<String> {
        validate_create(&request)?;
        if !self.session.is_connected() {
            return Err(CoreError::NotConnected);
        }
        let request = CreateCertificateRequest {
            ai_tags: request.ai_tags.map(|tags| normalize_tags(&tags)),
            ..request
        };
        let tx_hash = self.gateway.create_certificate(&self.session, &request).await?;
        self.refresh().await;
        Ok(tx_hash)
    }

    /// Validate, submit `updateProof`, then reload the owner's list.
    pub async fn update_certificate(&mut self, request: UpdateCertificateRequest) -> CoreResult<String> {
        validate_update(&request)?;
        if !self.session.is_connected() {
            return Err(CoreError::NotConnected);
        }
        let request = UpdateCertificateRequest {
            new_ai_tags: request.new_ai_tags.map(|tags| normalize_tags(&tags)),
            ..request
        };
        let tx_hash = self.gateway.update_certificate(&self.session, &request).await?;
        self.refresh().await;
        Ok(tx_hash)
    }

    /// Reload the connected owner's certificates; no-op when disconnected.
    pub async fn refresh(&mut self) -> &[Certificate] {
        match self.session.address().map(str::to_string) {
            Some(address) => self.store.refresh(&self.gateway, &address).await,
            None => {
                self.store.clear();
                self.store.certificates()
            }
        }
    }

    pub async fn get_certificate(&self, address: &str, proof_id: &str) -> Option<Certificate> {
        self.gateway.get_certificate(address, proof_id).await
    }

    pub async fn get_user_certificates(&self, address: &str) -> Vec<Certificate> {
        self.gateway.get_user_certificates(address).await
    }

    pub async fn get_total_certificates(&self) -> u64 {
        self.gateway.get_total_certificates().await
    }

    pub async fn get_category_stats(&self, category: &CertificateCategory) -> u64 {
        self.gateway.get_category_stats(category).await
    }

    pub async fn transaction_status(&self, tx_hash: &str) -> CoreResult<TransactionStatus> {
        self.gateway.transaction_status(tx_hash).await
    }

    pub fn dashboard(&self) -> DashboardStats {
        let stats = self.store.stats();
        info!(
            "Dashboard: {} certificates ({} verified, {} pending)",
            stats.total_certificates, stats.verified_certificates, stats.pending_certificates
        );
        stats
    }

    pub fn category_breakdown(&self) -> Vec<CategoryStats> {
        self.store.category_breakdown()
    }
}
