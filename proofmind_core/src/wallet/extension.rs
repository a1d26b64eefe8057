// Browser extension wallet

use super::{LoginRequest, ProviderCore, SignRequest, WalletProvider};
use crate::error::CoreResult;
use crate::models::ProviderKind;
use crate::transaction::Transaction;
use async_trait::async_trait;
use rand::RngCore;

pub struct ExtensionProvider {
    core: ProviderCore,
}

impl ExtensionProvider {
    pub(crate) fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Random token the extension signs to prove account ownership.
    fn login_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[async_trait(?Send)]
impl WalletProvider for ExtensionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Extension
    }

    async fn login(&mut self) -> CoreResult<bool> {
        let request = LoginRequest::Extension {
            token: Some(Self::login_token()),
        };
        self.core.login(ProviderKind::Extension, &request).await
    }

    async fn resume(&mut self, address: &str) -> CoreResult<bool> {
        self.core.resume(ProviderKind::Extension, address).await
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
