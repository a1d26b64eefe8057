// Contract gateway - builds ProofMind contract calls and queries
//
// Writes go through the session's active wallet adapter and surface every
// failure. Reads are best effort: transport failures are logged and degrade
// to "not found", an empty list or zero.

use crate::address::decode_bech32;
use crate::codec::{top_decode_u64, top_encode_buffer_list};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    Certificate, CertificateCategory, CreateCertificateRequest, TransactionStatus,
    UpdateCertificateRequest,
};
use crate::network_provider::{ContractQuery, NetworkProvider, QueryResponse};
use crate::proof_decoder::{decode_certificate, decode_certificate_list};
use crate::session::WalletSessionManager;
use crate::settings::NetworkConfig;
use crate::transaction::ContractCall;
use crate::wallet::as_transaction_error;
use log::{debug, error, info};
use std::rc::Rc;

/// Contract endpoint names.
pub mod endpoints {
    pub const CERTIFY_ACTION: &str = "certifyAction";
    pub const UPDATE_PROOF: &str = "updateProof";
    pub const GET_PROOF: &str = "getProof";
    pub const GET_USER_PROOFS: &str = "getUserProofs";
    pub const GET_TOTAL_PROOFS: &str = "getTotalProofs";
    pub const GET_CATEGORY_STATS: &str = "getCategoryStats";
}

pub const DEFAULT_METADATA: &str = "{}";

pub struct ContractGateway {
    config: Rc<NetworkConfig>,
    network: Rc<dyn NetworkProvider>,
}

impl ContractGateway {
    pub fn new(config: Rc<NetworkConfig>, network: Rc<dyn NetworkProvider>) -> Self {
        Self { config, network }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Submit `certifyAction`. Does not validate `request`.
    pub async fn create_certificate(
        &self,
        session: &WalletSessionManager,
        request: &CreateCertificateRequest,
    ) -> CoreResult<String> {
        let call = certify_call(request, self.config.gas_limit);
        let tx_hash = self.submit(session, call).await?;
        info!("certifyAction {} submitted: {}", request.proof_id, tx_hash);
        Ok(tx_hash)
    }

    /// Submit `updateProof`. Omitted fields are left to the contract.
    pub async fn update_certificate(
        &self,
        session: &WalletSessionManager,
        request: &UpdateCertificateRequest,
    ) -> CoreResult<String> {
        let call = update_call(request, self.config.gas_limit);
        let tx_hash = self.submit(session, call).await?;
        info!("updateProof {} submitted: {}", request.proof_id, tx_hash);
        Ok(tx_hash)
    }

    async fn submit(&self, session: &WalletSessionManager, call: ContractCall) -> CoreResult<String> {
        let provider = session.active_provider().ok_or(CoreError::NotConnected)?;
        let sender = provider.address().ok_or(CoreError::NotConnected)?.to_string();
        let account = self
            .network
            .get_account(&sender)
            .await
            .map_err(as_transaction_error)?;
        debug!("Building {} for {} at nonce {}", call.function, sender, account.nonce);
        let tx = call.into_transaction(&self.config, &sender, account.nonce);
        provider.sign_and_send_transaction(tx).await
    }

    /// `getProof(owner, proof_id)`. `None` covers both "not found" and read
    /// failures.
    pub async fn get_certificate(&self, address: &str, proof_id: &str) -> Option<Certificate> {
        let owner = match decode_bech32(address) {
            Ok(key) => key,
            Err(e) => {
                error!("getProof: {}", e);
                return None;
            }
        };
        let args = [owner.to_vec(), proof_id.as_bytes().to_vec()];
        match self.query(endpoints::GET_PROOF, &args).await {
            Ok(response) if response.is_ok() => response.first().and_then(decode_certificate),
            Ok(response) => {
                debug!(
                    "getProof {} for {}: {} {}",
                    proof_id, address, response.return_code, response.return_message
                );
                None
            }
            Err(e) => {
                error!("getProof {} for {} failed: {}", proof_id, address, e);
                None
            }
        }
    }

    /// `getUserProofs(owner)` in contract order.
    pub async fn get_user_certificates(&self, address: &str) -> Vec<Certificate> {
        let owner = match decode_bech32(address) {
            Ok(key) => key,
            Err(e) => {
                error!("getUserProofs: {}", e);
                return Vec::new();
            }
        };
        match self.checked_query(endpoints::GET_USER_PROOFS, &[owner.to_vec()]).await {
            Ok(response) => response
                .return_data
                .iter()
                .flat_map(|item| decode_certificate_list(item))
                .collect(),
            Err(e) => {
                error!("getUserProofs for {} failed: {}", address, e);
                Vec::new()
            }
        }
    }

    pub async fn get_total_certificates(&self) -> u64 {
        self.count_query(endpoints::GET_TOTAL_PROOFS, &[]).await
    }

    pub async fn get_category_stats(&self, category: &CertificateCategory) -> u64 {
        self.count_query(endpoints::GET_CATEGORY_STATS, &[category.as_str().as_bytes().to_vec()])
            .await
    }

    pub async fn transaction_status(&self, tx_hash: &str) -> CoreResult<TransactionStatus> {
        self.network.get_transaction_status(tx_hash).await
    }

    /// Poll until the transaction reaches a final status or `max_polls` runs
    /// out, returning the last status seen.
    #[cfg(any(feature = "native", all(feature = "wasm", target_arch = "wasm32")))]
    pub async fn wait_for_transaction(
        &self,
        tx_hash: &str,
        interval_ms: u64,
        max_polls: u32,
    ) -> CoreResult<TransactionStatus> {
        let mut status = TransactionStatus::Pending;
        for attempt in 0..max_polls {
            if attempt > 0 {
                crate::sleep_ms(interval_ms).await;
            }
            status = self.network.get_transaction_status(tx_hash).await?;
            debug!("Transaction {} status (poll {}): {:?}", tx_hash, attempt + 1, status);
            if status.is_final() {
                break;
            }
        }
        Ok(status)
    }

    pub fn transaction_url(&self, tx_hash: &str) -> String {
        self.config.transaction_url(tx_hash)
    }

    pub fn account_url(&self, address: &str) -> String {
        self.config.account_url(address)
    }

    async fn query(&self, function: &str, args: &[Vec<u8>]) -> CoreResult<QueryResponse> {
        let query = ContractQuery::new(&self.config.contract_address, function, args);
        self.network.query_contract(&query).await
    }

    async fn checked_query(&self, function: &str, args: &[Vec<u8>]) -> CoreResult<QueryResponse> {
        let response = self.query(function, args).await?;
        if !response.is_ok() {
            return Err(CoreError::Query(format!(
                "{} returned {}: {}",
                function, response.return_code, response.return_message
            )));
        }
        Ok(response)
    }

    async fn count_query(&self, function: &str, args: &[Vec<u8>]) -> u64 {
        let result = self
            .checked_query(function, args)
            .await
            .and_then(|r| top_decode_u64(r.first().unwrap_or_default()));
        match result {
            Ok(count) => count,
            Err(e) => {
                error!("{} failed: {}", function, e);
                0
            }
        }
    }
}

/// Blank metadata is submitted as `{}` by both write calls.
fn metadata_arg(metadata: Option<&str>) -> &str {
    metadata
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_METADATA)
}

/// `certifyAction@proof_text@proof_id@category@metadata@tags`
pub fn certify_call(request: &CreateCertificateRequest, gas_limit: u64) -> ContractCall {
    let category = request.category.clone().unwrap_or_default();
    let tags = request.ai_tags.as_deref().unwrap_or_default();
    let args = vec![
        request.proof_text.as_bytes().to_vec(),
        request.proof_id.as_bytes().to_vec(),
        category.as_str().as_bytes().to_vec(),
        metadata_arg(request.metadata.as_deref()).as_bytes().to_vec(),
        top_encode_buffer_list(tags),
    ];
    ContractCall::new(endpoints::CERTIFY_ACTION, args, gas_limit)
}

/// `updateProof@proof_id[@text[@category[@metadata[@tags]]]]`.
///
/// The contract reads every argument it receives as a new value, so only a
/// leading run of present fields can be sent. Encoding stops at the first
/// omitted field; `validate_update` rejects requests that skip one.
pub fn update_call(request: &UpdateCertificateRequest, gas_limit: u64) -> ContractCall {
    let optionals: [Option<Vec<u8>>; 4] = [
        request.new_proof_text.as_ref().map(|t| t.as_bytes().to_vec()),
        request
            .new_category
            .as_ref()
            .map(|c| c.as_str().as_bytes().to_vec()),
        request
            .new_metadata
            .as_deref()
            .map(|m| metadata_arg(Some(m)).as_bytes().to_vec()),
        request.new_ai_tags.as_deref().map(top_encode_buffer_list),
    ];

    let mut args = vec![request.proof_id.as_bytes().to_vec()];
    args.extend(optionals.into_iter().map_while(|arg| arg));
    ContractCall::new(endpoints::UPDATE_PROOF, args, gas_limit)
}
