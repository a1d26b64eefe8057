// Native proxy API client using reqwest

use crate::error::CoreError;
use crate::models::{Account, TransactionStatus};
use crate::network_provider::{
    parse_account, parse_query_response, parse_send_response, parse_status_response, routes,
    ContractQuery, NetworkProvider, NetworkResult, QueryResponse,
};
use crate::transaction::Transaction;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde_json::Value;

/// MultiversX proxy (gateway or API) client for native builds
pub struct NativeProxyProvider {
    client: Client,
    base_url: String,
}

impl NativeProxyProvider {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Reuse a preconfigured client (timeouts, proxies, headers).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn read_body(response: Response) -> NetworkResult<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CoreError::Rpc(format!("Failed to read response body: {}", e)))?;
        serde_json::from_str(&text).map_err(|_| {
            CoreError::Rpc(format!("HTTP {}: {}", status, text.chars().take(200).collect::<String>()))
        })
    }

    async fn get(&self, route: &str) -> NetworkResult<Value> {
        let url = self.url(route);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Rpc(format!("HTTP request failed: {}", e)))?;
        Self::read_body(response).await
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, route: &str, body: &T) -> NetworkResult<Value> {
        let url = self.url(route);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::Rpc(format!("HTTP request failed: {}", e)))?;
        Self::read_body(response).await
    }
}

#[async_trait(?Send)]
impl NetworkProvider for NativeProxyProvider {
    async fn get_account(&self, address: &str) -> NetworkResult<Account> {
        parse_account(&self.get(&routes::account(address)).await?)
    }

    async fn query_contract(&self, query: &ContractQuery) -> NetworkResult<QueryResponse> {
        debug!("Native proxy: query {}", query.func_name);
        parse_query_response(&self.post(routes::VM_QUERY, query).await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> NetworkResult<String> {
        let body = self
            .post(routes::SEND_TRANSACTION, transaction)
            .await
            .map_err(|e| CoreError::Transaction(e.to_string()))?;
        parse_send_response(&body)
    }

    async fn get_transaction_status(&self, tx_hash: &str) -> NetworkResult<TransactionStatus> {
        parse_status_response(&self.get(&routes::transaction_status(tx_hash)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_join_without_double_slash() {
        let provider = NativeProxyProvider::new("https://devnet-gateway.multiversx.com/");
        assert_eq!(
            provider.url(&routes::account("erd1abc")),
            "https://devnet-gateway.multiversx.com/address/erd1abc"
        );
        assert_eq!(
            provider.url(routes::VM_QUERY),
            "https://devnet-gateway.multiversx.com/vm-values/query"
        );
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_rpc_error() {
        let provider = NativeProxyProvider::new("http://127.0.0.1:1");
        let err = provider.get_transaction_status("00").await.unwrap_err();
        assert!(matches!(err, CoreError::Rpc(_)));
    }
}
