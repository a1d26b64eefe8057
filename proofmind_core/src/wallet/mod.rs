// Wallet provider adapters
//
// Every connection backend (hosted web wallet, browser extension, remote
// pairing, hardware device) implements `WalletProvider`. The external wallet
// itself is reached through a `WalletBridge`: a JS object in the browser, a
// local key in native builds and tests.

mod extension;
mod hardware;
mod local_key;
mod remote_pair;
mod web;

pub use extension::ExtensionProvider;
pub use hardware::HardwareProvider;
pub use local_key::LocalKeyBridge;
pub use remote_pair::RemotePairProvider;
pub use web::WebWalletProvider;

use crate::address::decode_bech32;
use crate::error::{CoreError, CoreResult};
use crate::models::ProviderKind;
use crate::network_provider::NetworkProvider;
use crate::settings::{DappMetadata, WalletSettings};
use crate::transaction::Transaction;
use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// What a provider asks the external wallet to do during login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LoginRequest {
    /// Navigate to the hosted wallet; it calls back with the address.
    Redirect { url: String },
    /// Ask the browser extension for an account, optionally signing `token`.
    Extension { token: Option<String> },
    /// Show `uri` (usually as a QR code) and wait for a remote wallet to pair.
    #[serde(rename_all = "camelCase")]
    Pairing {
        uri: String,
        relay_url: String,
        project_id: String,
        metadata: DappMetadata,
    },
    /// Read the address at `derivation_path` from the device.
    #[serde(rename_all = "camelCase")]
    Device {
        derivation_path: String,
        account_index: u32,
        address_index: u32,
    },
}

/// Result of a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub address: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Transaction handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub transaction: Transaction,
    /// Hosted-wallet hook the user is sent to, when signing happens off-page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_url: Option<String>,
}

/// The external mechanism that authorizes and signs on the user's behalf.
#[async_trait(?Send)]
pub trait WalletBridge {
    /// Run the login handshake. `Ok(None)` means the wallet declined.
    async fn login(&self, request: &LoginRequest) -> CoreResult<Option<LoginOutcome>>;

    /// Re-attach to an already authorized account without prompting.
    async fn resume(&self, _kind: ProviderKind, _address: &str) -> CoreResult<bool> {
        Ok(true)
    }

    /// Sign the transaction, returning the hex signature.
    async fn sign_transaction(&self, request: &SignRequest) -> CoreResult<String>;

    async fn logout(&self) -> CoreResult<()>;
}

/// Uniform capability set shared by every connection backend.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn kind(&self) -> ProviderKind;

    /// Run the backend's login handshake. `Ok(false)` when the user or wallet
    /// declined.
    async fn login(&mut self) -> CoreResult<bool>;

    /// Restore a previously authorized session for `address`.
    async fn resume(&mut self, address: &str) -> CoreResult<bool>;

    async fn logout(&mut self) -> CoreResult<()>;

    fn address(&self) -> Option<&str>;

    /// Sign through the wallet and broadcast, returning the transaction hash.
    async fn sign_and_send_transaction(&self, transaction: Transaction) -> CoreResult<String>;
}

/// Build the adapter for `kind`. This is the only place that branches on the
/// provider kind.
pub fn create_provider(
    kind: ProviderKind,
    bridge: Rc<dyn WalletBridge>,
    network: Rc<dyn NetworkProvider>,
    settings: &WalletSettings,
) -> Box<dyn WalletProvider> {
    let core = ProviderCore::new(bridge, network);
    match kind {
        ProviderKind::Web => Box::new(WebWalletProvider::new(core, settings)),
        ProviderKind::Extension => Box::new(ExtensionProvider::new(core)),
        ProviderKind::RemotePair => Box::new(RemotePairProvider::new(core, settings)),
        ProviderKind::Hardware => Box::new(HardwareProvider::new(core, settings)),
    }
}

/// State and plumbing common to all adapters.
pub(crate) struct ProviderCore {
    bridge: Rc<dyn WalletBridge>,
    network: Rc<dyn NetworkProvider>,
    address: Option<String>,
}

impl ProviderCore {
    pub(crate) fn new(bridge: Rc<dyn WalletBridge>, network: Rc<dyn NetworkProvider>) -> Self {
        Self {
            bridge,
            network,
            address: None,
        }
    }

    pub(crate) fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub(crate) async fn login(&mut self, kind: ProviderKind, request: &LoginRequest) -> CoreResult<bool> {
        debug!("{} provider: starting login handshake", kind);
        let outcome = self
            .bridge
            .login(request)
            .await
            .map_err(|e| CoreError::Connection(format!("{} login failed: {}", kind, e)))?;
        let Some(outcome) = outcome else {
            info!("{} provider: login declined", kind);
            return Ok(false);
        };
        let public_key = decode_bech32(&outcome.address).map_err(|e| {
            CoreError::Connection(format!("{} wallet returned an invalid address: {}", kind, e))
        })?;
        if let LoginRequest::Extension { token: Some(token) } = request {
            let signature = outcome.signature.as_deref().ok_or_else(|| {
                CoreError::Connection(format!("{} wallet did not sign the login token", kind))
            })?;
            verify_login_signature(&public_key, token, signature).map_err(|reason| {
                CoreError::Connection(format!("{} login token signature rejected: {}", kind, reason))
            })?;
        }
        info!("{} provider: logged in as {}", kind, outcome.address);
        self.address = Some(outcome.address);
        Ok(true)
    }

    pub(crate) async fn resume(&mut self, kind: ProviderKind, address: &str) -> CoreResult<bool> {
        decode_bech32(address)
            .map_err(|e| CoreError::Connection(format!("Stored address is invalid: {}", e)))?;
        let resumed = self
            .bridge
            .resume(kind, address)
            .await
            .map_err(|e| CoreError::Connection(format!("{} resume failed: {}", kind, e)))?;
        if resumed {
            self.address = Some(address.to_string());
        }
        Ok(resumed)
    }

    pub(crate) async fn logout(&mut self) -> CoreResult<()> {
        if self.address.is_none() {
            return Ok(());
        }
        let result = self.bridge.logout().await;
        self.address = None;
        result
    }

    /// Ensure `transaction` is sent from the logged-in account.
    pub(crate) fn check_sender(&self, transaction: &Transaction) -> CoreResult<()> {
        match self.address.as_deref() {
            None => Err(CoreError::NotConnected),
            Some(addr) if addr != transaction.sender => Err(CoreError::Transaction(format!(
                "Transaction sender {} does not match connected account {}",
                transaction.sender, addr
            ))),
            Some(_) => Ok(()),
        }
    }

    pub(crate) async fn sign_and_broadcast(&self, request: SignRequest) -> CoreResult<String> {
        self.check_sender(&request.transaction)?;
        let signature = self
            .bridge
            .sign_transaction(&request)
            .await
            .map_err(as_transaction_error)?;
        let signed = request.transaction.with_signature(signature);
        let tx_hash = self
            .network
            .send_transaction(&signed)
            .await
            .map_err(as_transaction_error)?;
        info!("Transaction broadcast: {}", tx_hash);
        Ok(tx_hash)
    }
}

/// Check that `signature_hex` is the ed25519 signature of `token` by the
/// account key.
pub(crate) fn verify_login_signature(
    public_key: &[u8; 32],
    token: &str,
    signature_hex: &str,
) -> Result<(), String> {
    let verifying_key = VerifyingKey::from_bytes(public_key).map_err(|e| e.to_string())?;
    let sig_bytes: [u8; 64] = hex::decode(signature_hex)
        .map_err(|e| e.to_string())?
        .try_into()
        .map_err(|_| "signature must be 64 bytes".to_string())?;
    verifying_key
        .verify(token.as_bytes(), &Signature::from_bytes(&sig_bytes))
        .map_err(|_| "signature does not match the account key".to_string())
}

/// Signing and broadcast failures surface as `Transaction` errors carrying
/// the underlying message.
pub(crate) fn as_transaction_error(err: CoreError) -> CoreError {
    match err {
        CoreError::Transaction(_) | CoreError::NotConnected => err,
        other => CoreError::Transaction(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serializes_with_kind_tag() {
        let req = LoginRequest::Device {
            derivation_path: "m/44'/508'/0'/0'/0'".to_string(),
            account_index: 0,
            address_index: 0,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["kind"], "device");
        assert_eq!(json["derivationPath"], "m/44'/508'/0'/0'/0'");
    }

    #[test]
    fn test_login_signature_checked_against_account_key() {
        let key = LocalKeyBridge::from_secret_bytes(&[12u8; 32]).unwrap();
        let other = LocalKeyBridge::from_secret_bytes(&[13u8; 32]).unwrap();
        let token = "3f1a9c0e";

        assert!(verify_login_signature(key.public_key(), token, &key.sign_hex(token.as_bytes())).is_ok());
        assert!(verify_login_signature(key.public_key(), "another-token", &key.sign_hex(token.as_bytes())).is_err());
        assert!(verify_login_signature(key.public_key(), token, &other.sign_hex(token.as_bytes())).is_err());
        assert!(verify_login_signature(key.public_key(), token, "abcd").is_err());
        assert!(verify_login_signature(key.public_key(), token, "not hex").is_err());
    }

    #[test]
    fn test_transaction_error_mapping_keeps_message() {
        let err = as_transaction_error(CoreError::Rpc("nonce too low".to_string()));
        match err {
            CoreError::Transaction(msg) => assert!(msg.contains("nonce too low")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
