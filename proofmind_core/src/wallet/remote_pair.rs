// Remote pairing (QR code / deep link) wallet

use super::{LoginRequest, ProviderCore, SignRequest, WalletProvider};
use crate::error::{CoreError, CoreResult};
use crate::models::ProviderKind;
use crate::settings::{DappMetadata, WalletSettings};
use crate::transaction::Transaction;
use async_trait::async_trait;
use rand::RngCore;

pub struct RemotePairProvider {
    core: ProviderCore,
    project_id: String,
    relay_url: String,
    metadata: DappMetadata,
}

impl RemotePairProvider {
    pub(crate) fn new(core: ProviderCore, settings: &WalletSettings) -> Self {
        Self {
            core,
            project_id: settings.remote_pair_project_id.clone(),
            relay_url: settings.remote_pair_relay_url.clone(),
            metadata: settings.dapp.clone(),
        }
    }

    /// `wc:{topic}@2?relay-protocol=irn&symKey={key}` with fresh random
    /// topic and symmetric key.
    pub fn new_pairing_uri() -> String {
        let mut rng = rand::thread_rng();
        let mut topic = [0u8; 32];
        let mut sym_key = [0u8; 32];
        rng.fill_bytes(&mut topic);
        rng.fill_bytes(&mut sym_key);
        format!(
            "wc:{}@2?relay-protocol=irn&symKey={}",
            hex::encode(topic),
            hex::encode(sym_key)
        )
    }
}

#[async_trait(?Send)]
impl WalletProvider for RemotePairProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RemotePair
    }

    async fn login(&mut self) -> CoreResult<bool> {
        if self.project_id.trim().is_empty() {
            return Err(CoreError::Connection(
                "Remote pairing requires remote_pair_project_id".to_string(),
            ));
        }
        let request = LoginRequest::Pairing {
            uri: Self::new_pairing_uri(),
            relay_url: self.relay_url.clone(),
            project_id: self.project_id.clone(),
            metadata: self.metadata.clone(),
        };
        self.core.login(ProviderKind::RemotePair, &request).await
    }

    async fn resume(&mut self, address: &str) -> CoreResult<bool> {
        self.core.resume(ProviderKind::RemotePair, address).await
    }

    async fn logout(&mut self) -> CoreResult<()> {
        self.core.logout().await
    }

    fn address(&self) -> Option<&str> {
        self.core.address()
    }

    async fn sign_and_send_transaction(&self, transaction: Transaction) -> CoreResult<String> {
        self.core
            .sign_and_broadcast(SignRequest {
                transaction,
                hook_url: None,
            })
            .await
    }
}
