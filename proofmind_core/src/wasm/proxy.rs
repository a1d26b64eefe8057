// WASM proxy API client using the browser fetch API

use crate::error::CoreError;
use crate::models::{Account, TransactionStatus};
use crate::network_provider::{
    parse_account, parse_query_response, parse_send_response, parse_status_response, routes,
    ContractQuery, NetworkProvider, NetworkResult, QueryResponse,
};
use crate::transaction::Transaction;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

pub struct WasmProxyProvider {
    base_url: String,
}

impl WasmProxyProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_json(&self, method: &str, route: &str, body: Option<String>) -> NetworkResult<Value> {
        let url = format!("{}{}", self.base_url, route);
        debug!("{} {} via fetch", method, url);

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| CoreError::Rpc(format!("Failed to create request: {:?}", e)))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| CoreError::Rpc(format!("Failed to set headers: {:?}", e)))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| CoreError::Init("No window object available".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| CoreError::Rpc(format!("Fetch failed: {:?}", e)))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| CoreError::Rpc("Failed to cast response".to_string()))?;

        let status = resp.status();
        let text_promise = resp
            .text()
            .map_err(|e| CoreError::Rpc(format!("Failed to get text: {:?}", e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| CoreError::Rpc(format!("Failed to await text: {:?}", e)))?
            .as_string()
            .ok_or_else(|| CoreError::Rpc("Response text is not a string".to_string()))?;

        serde_json::from_str(&text).map_err(|_| CoreError::Rpc(format!("HTTP error: {}", status)))
    }
}

#[async_trait(?Send)]
impl NetworkProvider for WasmProxyProvider {
    async fn get_account(&self, address: &str) -> NetworkResult<Account> {
        parse_account(&self.fetch_json("GET", &routes::account(address), None).await?)
    }

    async fn query_contract(&self, query: &ContractQuery) -> NetworkResult<QueryResponse> {
        let body = serde_json::to_string(query)?;
        parse_query_response(&self.fetch_json("POST", routes::VM_QUERY, Some(body)).await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> NetworkResult<String> {
        let body = serde_json::to_string(transaction)?;
        let response = self
            .fetch_json("POST", routes::SEND_TRANSACTION, Some(body))
            .await
            .map_err(|e| CoreError::Transaction(e.to_string()))?;
        parse_send_response(&response)
    }

    async fn get_transaction_status(&self, tx_hash: &str) -> NetworkResult<TransactionStatus> {
        parse_status_response(
            &self
                .fetch_json("GET", &routes::transaction_status(tx_hash), None)
                .await?,
        )
    }
}
