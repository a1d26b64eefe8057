// Hardware device wallet (Ledger app, coin type 508)

use super::{LoginRequest, ProviderCore, SignRequest, WalletProvider};
use crate::error::CoreResult;
use crate::models::ProviderKind;
use crate::settings::WalletSettings;
use crate::transaction::Transaction;
use async_trait::async_trait;

pub const COIN_TYPE: u32 = 508;

pub struct HardwareProvider {
    core: ProviderCore,
    account_index: u32,
    address_index: u32,
}

impl HardwareProvider {
    pub(crate) fn new(core: ProviderCore, settings: &WalletSettings) -> Self {
        Self {
            core,
            account_index: settings.hardware_account_index,
            address_index: settings.hardware_address_index,
        }
    }

    pub fn derivation_path(&self) -> String {
        derivation_path(self.account_index, self.address_index)
    }
}

/// `m/44'/508'/{account}'/0'/{index}'`
pub fn derivation_path(account_index: u32, address_index: u32) -> String {
    format!("m/44'/{}'/{}'/0'/{}'", COIN_TYPE, account_index, address_index)
}

#[async_trait(?Send)]
impl WalletProvider for HardwareProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Hardware
    }

    async fn login(&mut self) -> CoreResult<bool> {
        let request = LoginRequest::Device {
            derivation_path: self.derivation_path(),
            account_index: self.account_index,
            address_index: self.address_index,
        };
        self.core.login(ProviderKind::Hardware, &request).await
    }

    async fn resume(&mut self, address: &str) -> CoreResult<bool> {
        self.core.resume(ProviderKind::Hardware, address).await
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_path() {
        assert_eq!(derivation_path(0, 0), "m/44'/508'/0'/0'/0'");
        assert_eq!(derivation_path(2, 5), "m/44'/508'/2'/0'/5'");
    }
}
