// Hosted web wallet: login and signing go through redirect hooks

use super::{LoginRequest, ProviderCore, SignRequest, WalletProvider};
use crate::codec::decode_base64;
use crate::error::{CoreError, CoreResult};
use crate::models::ProviderKind;
use crate::settings::WalletSettings;
use crate::transaction::Transaction;
use async_trait::async_trait;
use url::Url;

pub struct WebWalletProvider {
    core: ProviderCore,
    wallet_url: String,
    callback_url: String,
}

impl WebWalletProvider {
    pub(crate) fn new(core: ProviderCore, settings: &WalletSettings) -> Self {
        Self {
            core,
            wallet_url: settings.web_wallet_url.clone(),
            callback_url: settings
                .callback_url
                .clone()
                .unwrap_or_else(|| settings.dapp.url.clone()),
        }
    }

    fn hook(&self, name: &str) -> CoreResult<Url> {
        let base = format!("{}/hook/{}", self.wallet_url.trim_end_matches('/'), name);
        Url::parse(&base).map_err(|e| CoreError::InvalidInput(format!("Invalid web wallet URL: {}", e)))
    }

    /// `{walletUrl}/hook/login?callbackUrl=...`
    pub fn login_url(&self) -> CoreResult<String> {
        let mut url = self.hook("login")?;
        url.query_pairs_mut().append_pair("callbackUrl", &self.callback_url);
        Ok(url.into())
    }

    /// `{walletUrl}/hook/sign?...&callbackUrl=...` carrying the plain call data.
    pub fn sign_url(&self, transaction: &Transaction) -> CoreResult<String> {
        let mut url = self.hook("sign")?;
        let data = match &transaction.data {
            Some(b64) => String::from_utf8_lossy(&decode_base64(b64)?).into_owned(),
            None => String::new(),
        };
        url.query_pairs_mut()
            .append_pair("nonce", &transaction.nonce.to_string())
            .append_pair("receiver", &transaction.receiver)
            .append_pair("value", &transaction.value)
            .append_pair("gasLimit", &transaction.gas_limit.to_string())
            .append_pair("gasPrice", &transaction.gas_price.to_string())
            .append_pair("data", &data)
            .append_pair("chainID", &transaction.chain_id)
            .append_pair("version", &transaction.version.to_string())
            .append_pair("callbackUrl", &self.callback_url);
        Ok(url.into())
    }
}

#[async_trait(?Send)]
impl WalletProvider for WebWalletProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Web
    }

    async fn login(&mut self) -> CoreResult<bool> {
        let request = LoginRequest::Redirect {
            url: self.login_url().map_err(|e| CoreError::Connection(e.to_string()))?,
        };
        self.core.login(ProviderKind::Web, &request).await
    }

    async fn resume(&mut self, address: &str) -> CoreResult<bool> {
        self.core.resume(ProviderKind::Web, address).await
    }

    async fn logout(&mut self) -> CoreResult<()> {
        self.core.logout().await
    }

    fn address(&self) -> Option<&str> {
        self.core.address()
    }

    async fn sign_and_send_transaction(&self, transaction: Transaction) -> CoreResult<String> {
        let hook_url = self.sign_url(&transaction).map_err(super::as_transaction_error)?;
        self.core
            .sign_and_broadcast(SignRequest {
                transaction,
                hook_url: Some(hook_url),
            })
            .await
    }
}
