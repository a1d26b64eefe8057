// Browser facade over the core context

use crate::convert::{self, js_error, to_json};
use log::info;
use proofmind_core::session;
use proofmind_core::wasm::{JsWalletBridge, LocalStorageBackend, WasmProxyProvider};
use proofmind_core::{NetworkConfig, ProofMindContext};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_MAX_POLLS: u32 = 30;

#[wasm_bindgen]
pub struct ProofMind {
    inner: Rc<RefCell<ProofMindContext>>,
    storage: Rc<LocalStorageBackend>,
}

impl ProofMind {
    fn context(&self) -> Result<Ref<'_, ProofMindContext>, JsValue> {
        self.inner
            .try_borrow()
            .map_err(|_| JsValue::from_str("Another wallet operation is in progress"))
    }

    fn context_mut(&self) -> Result<RefMut<'_, ProofMindContext>, JsValue> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Another wallet operation is in progress"))
    }
}

// The context lives on the single browser thread; overlapping calls fail
// through try_borrow instead of panicking.
#[allow(clippy::await_holding_refcell_ref)]
#[wasm_bindgen]
impl ProofMind {
    /// Build from a JSON `NetworkConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ProofMind, JsValue> {
        let config = NetworkConfig::from_json(config_json).map_err(js_error)?;
        config.validate().map_err(js_error)?;
        info!("ProofMind ready on chain {} via {}", config.chain_id, config.api_url);
        let network = Rc::new(WasmProxyProvider::new(&config.api_url));
        Ok(Self {
            inner: Rc::new(RefCell::new(ProofMindContext::new(config, network))),
            storage: Rc::new(LocalStorageBackend::unprefixed()),
        })
    }

    /// Connect with `kind` ("web", "extension", "remote-pair", "hardware").
    /// `handler` is the JavaScript wallet object. Returns the wallet JSON.
    #[wasm_bindgen]
    pub async fn connect(&self, kind: String, handler: JsValue) -> Result<String, JsValue> {
        let kind = convert::parse_kind(&kind).map_err(|e| JsValue::from_str(&e))?;
        let bridge = Rc::new(JsWalletBridge::new(handler).map_err(js_error)?);
        let info = self.context_mut()?.connect(kind, bridge).await.map_err(js_error)?;
        session::persist(self.storage.as_ref(), &info).await.map_err(js_error)?;
        to_json(&info)
    }

    #[wasm_bindgen]
    pub async fn disconnect(&self) -> Result<(), JsValue> {
        let result = self.context_mut()?.disconnect().await;
        session::forget(self.storage.as_ref()).await.map_err(js_error)?;
        result.map_err(js_error)
    }

    /// Resume the stored session, if any. Returns the wallet JSON or `null`.
    #[wasm_bindgen]
    pub async fn restore_session(&self, handler: JsValue) -> Result<JsValue, JsValue> {
        let bridge = Rc::new(JsWalletBridge::new(handler).map_err(js_error)?);
        let restored = self
            .context_mut()?
            .restore_session(self.storage.as_ref(), bridge)
            .await
            .map_err(js_error)?;
        match restored {
            Some(info) => {
                session::persist(self.storage.as_ref(), &info).await.map_err(js_error)?;
                Ok(JsValue::from_str(&to_json(&info)?))
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Re-read the balance and update the stored session. Returns the
    /// wallet JSON or `null` when disconnected.
    #[wasm_bindgen]
    pub async fn refresh_balance(&self) -> Result<JsValue, JsValue> {
        let refreshed = self.context_mut()?.refresh_balance().await.map_err(js_error)?;
        match refreshed {
            Some(info) => {
                session::persist(self.storage.as_ref(), &info).await.map_err(js_error)?;
                Ok(JsValue::from_str(&to_json(&info)?))
            }
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub fn wallet(&self) -> Result<JsValue, JsValue> {
        match self.context()?.wallet() {
            Some(info) => Ok(JsValue::from_str(&to_json(info)?)),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub fn is_connected(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|ctx| ctx.is_connected())
            .unwrap_or(false)
    }

    /// Submit `certifyAction`; returns the transaction hash.
    #[wasm_bindgen]
    pub async fn create_certificate(&self, request_json: String) -> Result<String, JsValue> {
        let request = convert::parse_create_request(&request_json).map_err(|e| JsValue::from_str(&e))?;
        self.context_mut()?
            .create_certificate(request)
            .await
            .map_err(js_error)
    }

    /// Submit `updateProof`; returns the transaction hash.
    #[wasm_bindgen]
    pub async fn update_certificate(&self, request_json: String) -> Result<String, JsValue> {
        let request = convert::parse_update_request(&request_json).map_err(|e| JsValue::from_str(&e))?;
        self.context_mut()?
            .update_certificate(request)
            .await
            .map_err(js_error)
    }

    /// Reload the connected owner's certificates and return them as JSON.
    #[wasm_bindgen]
    pub async fn refresh(&self) -> Result<String, JsValue> {
        let mut ctx = self.context_mut()?;
        let certificates = ctx.refresh().await;
        to_json(&certificates)
    }

    #[wasm_bindgen]
    pub fn certificates(&self) -> Result<String, JsValue> {
        to_json(&self.context()?.store().certificates())
    }

    #[wasm_bindgen]
    pub async fn get_certificate(&self, address: String, proof_id: String) -> Result<JsValue, JsValue> {
        match self.context()?.get_certificate(&address, &proof_id).await {
            Some(cert) => Ok(JsValue::from_str(&to_json(&cert)?)),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub async fn get_user_certificates(&self, address: String) -> Result<String, JsValue> {
        let certificates = self.context()?.get_user_certificates(&address).await;
        to_json(&certificates)
    }

    /// Returned as a decimal string so large counts survive the trip to JS.
    #[wasm_bindgen]
    pub async fn get_total_certificates(&self) -> Result<String, JsValue> {
        Ok(self.context()?.get_total_certificates().await.to_string())
    }

    #[wasm_bindgen]
    pub async fn get_category_stats(&self, category: String) -> Result<String, JsValue> {
        let category = convert::parse_category(&category).map_err(|e| JsValue::from_str(&e))?;
        Ok(self.context()?.get_category_stats(&category).await.to_string())
    }

    #[wasm_bindgen]
    pub async fn transaction_status(&self, tx_hash: String) -> Result<String, JsValue> {
        let status = self.context()?.transaction_status(&tx_hash).await.map_err(js_error)?;
        to_json(&status)
    }

    /// Poll until the transaction is final. Zero arguments fall back to a
    /// 2s interval and 30 polls.
    #[wasm_bindgen]
    pub async fn wait_for_transaction(
        &self,
        tx_hash: String,
        interval_ms: u32,
        max_polls: u32,
    ) -> Result<String, JsValue> {
        let interval_ms = if interval_ms == 0 {
            DEFAULT_POLL_INTERVAL_MS
        } else {
            u64::from(interval_ms)
        };
        let max_polls = if max_polls == 0 { DEFAULT_MAX_POLLS } else { max_polls };
        let status = self
            .context()?
            .gateway()
            .wait_for_transaction(&tx_hash, interval_ms, max_polls)
            .await
            .map_err(js_error)?;
        to_json(&status)
    }

    #[wasm_bindgen]
    pub fn dashboard(&self) -> Result<String, JsValue> {
        to_json(&self.context()?.dashboard())
    }

    #[wasm_bindgen]
    pub fn category_breakdown(&self) -> Result<String, JsValue> {
        to_json(&self.context()?.category_breakdown())
    }

    #[wasm_bindgen]
    pub fn transaction_url(&self, tx_hash: &str) -> Result<String, JsValue> {
        Ok(self.context()?.gateway().transaction_url(tx_hash))
    }

    #[wasm_bindgen]
    pub fn account_url(&self, address: &str) -> Result<String, JsValue> {
        Ok(self.context()?.gateway().account_url(address))
    }
}
