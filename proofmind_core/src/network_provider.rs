// Network provider abstraction - allows both native and WASM implementations
// of the MultiversX proxy REST API

use crate::codec::decode_base64;
use crate::error::CoreError;
use crate::models::{Account, TransactionStatus};
use crate::transaction::Transaction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, CoreError>;

/// Read-only view function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub sc_address: String,
    pub func_name: String,
    /// Hex-encoded arguments.
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

impl ContractQuery {
    pub fn new(sc_address: &str, func_name: &str, args: &[Vec<u8>]) -> Self {
        Self {
            sc_address: sc_address.to_string(),
            func_name: func_name.to_string(),
            args: args.iter().map(hex::encode).collect(),
            caller: None,
        }
    }
}

/// Decoded view function output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResponse {
    pub return_code: String,
    pub return_message: String,
    pub return_data: Vec<Vec<u8>>,
}

impl QueryResponse {
    pub fn is_ok(&self) -> bool {
        self.return_code == "ok"
    }

    pub fn first(&self) -> Option<&[u8]> {
        self.return_data.first().map(|v| v.as_slice())
    }
}

/// Abstract network provider trait that can be implemented for both native and WASM
#[async_trait(?Send)]
pub trait NetworkProvider {
    /// Account nonce and balance
    async fn get_account(&self, address: &str) -> NetworkResult<Account>;

    /// Execute a read-only contract query
    async fn query_contract(&self, query: &ContractQuery) -> NetworkResult<QueryResponse>;

    /// Broadcast a signed transaction, returning its hash
    async fn send_transaction(&self, transaction: &Transaction) -> NetworkResult<String>;

    /// Processing status of a transaction
    async fn get_transaction_status(&self, tx_hash: &str) -> NetworkResult<TransactionStatus>;
}

/// Proxy API routes shared by the HTTP implementations.
pub mod routes {
    pub fn account(address: &str) -> String {
        format!("/address/{}", address)
    }

    pub const VM_QUERY: &str = "/vm-values/query";
    pub const SEND_TRANSACTION: &str = "/transaction/send";

    pub fn transaction_status(tx_hash: &str) -> String {
        format!("/transaction/{}/status", tx_hash)
    }
}

/// Unwrap the proxy's `{data, error, code}` envelope.
pub fn unwrap_envelope(body: &Value) -> NetworkResult<&Value> {
    let code = body.get("code").and_then(|c| c.as_str()).unwrap_or("");
    if code != "successful" {
        let error = body
            .get("error")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("unexpected proxy response");
        return Err(CoreError::Rpc(format!("{} ({})", error, code)));
    }
    body.get("data")
        .ok_or_else(|| CoreError::ParseError("Proxy response has no data".to_string()))
}

pub fn parse_account(body: &Value) -> NetworkResult<Account> {
    let data = unwrap_envelope(body)?;
    let account = data
        .get("account")
        .ok_or_else(|| CoreError::ParseError("No account in response".to_string()))?;
    let balance = match account.get("balance") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    };
    Ok(Account {
        address: account
            .get("address")
            .and_then(|a| a.as_str())
            .unwrap_or_default()
            .to_string(),
        nonce: account.get("nonce").and_then(|n| n.as_u64()).unwrap_or(0),
        balance,
    })
}

pub fn parse_query_response(body: &Value) -> NetworkResult<QueryResponse> {
    let data = unwrap_envelope(body)?;
    // The gateway nests the VM output one level deeper than the API does.
    let output = data.get("data").filter(|d| d.is_object()).unwrap_or(data);

    let return_data = match output.get("returnData") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(s) => decode_base64(s),
                None => Ok(Vec::new()),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(QueryResponse {
        return_code: output
            .get("returnCode")
            .and_then(|c| c.as_str())
            .unwrap_or("ok")
            .to_string(),
        return_message: output
            .get("returnMessage")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string(),
        return_data,
    })
}

pub fn parse_send_response(body: &Value) -> NetworkResult<String> {
    let data = unwrap_envelope(body).map_err(|e| CoreError::Transaction(e.to_string()))?;
    data.get("txHash")
        .and_then(|h| h.as_str())
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
        .ok_or_else(|| CoreError::Transaction("Broadcast response has no txHash".to_string()))
}

pub fn parse_status_response(body: &Value) -> NetworkResult<TransactionStatus> {
    let data = unwrap_envelope(body)?;
    let status = data
        .get("status")
        .and_then(|s| s.as_str())
        .ok_or_else(|| CoreError::ParseError("No status in response".to_string()))?;
    Ok(TransactionStatus::from_name(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gateway_query() {
        let body = json!({
            "data": { "data": { "returnData": ["AQI=", ""], "returnCode": "ok", "returnMessage": "" } },
            "error": "",
            "code": "successful"
        });
        let resp = parse_query_response(&body).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.return_data, vec![vec![1, 2], Vec::new()]);
    }

    #[test]
    fn test_parse_api_style_query() {
        let body = json!({
            "data": { "returnData": null, "returnCode": "user error", "returnMessage": "storage decode error" },
            "code": "successful"
        });
        let resp = parse_query_response(&body).unwrap();
        assert!(!resp.is_ok());
        assert!(resp.return_data.is_empty());
        assert_eq!(resp.return_message, "storage decode error");
    }

    #[test]
    fn test_envelope_error_surfaces_message() {
        let body = json!({ "data": null, "error": "invalid address", "code": "bad_request" });
        match parse_account(&body) {
            Err(CoreError::Rpc(msg)) => assert!(msg.contains("invalid address")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_account_and_send() {
        let body = json!({
            "data": { "account": { "address": "erd1abc", "nonce": 12, "balance": "1500" } },
            "code": "successful"
        });
        let account = parse_account(&body).unwrap();
        assert_eq!(account.nonce, 12);
        assert_eq!(account.balance, "1500");

        let sent = json!({ "data": { "txHash": "deadbeef" }, "code": "successful" });
        assert_eq!(parse_send_response(&sent).unwrap(), "deadbeef");
        let rejected = json!({ "data": null, "error": "insufficient funds", "code": "internal_issue" });
        assert!(matches!(parse_send_response(&rejected), Err(CoreError::Transaction(_))));
    }

    #[test]
    fn test_query_args_are_hex() {
        let q = ContractQuery::new("erd1sc", "getCategoryStats", &[b"EDUCATION".to_vec()]);
        assert_eq!(q.args, vec![hex::encode("EDUCATION")]);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["funcName"], "getCategoryStats");
        assert!(json.get("caller").is_none());
    }
}
