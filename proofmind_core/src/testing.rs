// Test doubles: an in-memory ProofMind contract behind the network provider
// trait, a memory storage backend and a scriptable wallet bridge.

use crate::address::decode_bech32;
use crate::codec::{decode_call_data, top_decode_buffer_list, top_encode_u64};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    Account, Certificate, CertificateCategory, ProviderKind, TransactionStatus, VerificationStatus,
};
use crate::network_provider::{ContractQuery, NetworkProvider, NetworkResult, QueryResponse};
use crate::proof_decoder::encode_certificate;
use crate::storage_trait::{StorageBackend, StorageResult};
use crate::transaction::Transaction;
use crate::wallet::{LocalKeyBridge, LoginOutcome, LoginRequest, SignRequest, WalletBridge};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Address of the simulated contract (a smart contract style key).
pub fn contract_address() -> String {
    let mut key = [0u8; 32];
    key[8] = 0x05;
    key[31] = 0x2a;
    crate::address::encode_bech32(&key).expect("valid key")
}

#[derive(Default)]
struct ChainState {
    accounts: HashMap<String, Account>,
    /// (owner, certificate) in insertion order.
    proofs: Vec<(String, Certificate)>,
    sent: Vec<Transaction>,
    statuses: HashMap<String, TransactionStatus>,
    queries: Vec<ContractQuery>,
    clock: u64,
}

/// In-memory stand-in for the proxy API and the ProofMind contract.
#[derive(Default)]
pub struct MockChain {
    state: RefCell<ChainState>,
    pub fail_queries: Cell<bool>,
    pub fail_accounts: Cell<bool>,
    pub fail_sends: Cell<bool>,
}

impl MockChain {
    pub fn new() -> Self {
        let chain = Self::default();
        chain.state.borrow_mut().clock = 1_700_000_000;
        chain
    }

    pub fn fund(&self, address: &str, balance: &str) {
        self.state.borrow_mut().accounts.insert(
            address.to_string(),
            Account {
                address: address.to_string(),
                nonce: 0,
                balance: balance.to_string(),
            },
        );
    }

    pub fn insert(&self, owner: &str, certificate: Certificate) {
        self.state
            .borrow_mut()
            .proofs
            .push((owner.to_string(), certificate));
    }

    pub fn set_status(&self, owner: &str, proof_id: &str, status: VerificationStatus) {
        let mut state = self.state.borrow_mut();
        if let Some((_, cert)) = state
            .proofs
            .iter_mut()
            .find(|(o, c)| o == owner && c.proof_id == proof_id)
        {
            cert.verification_status = status;
        }
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.state.borrow().sent.clone()
    }

    /// Number of calls that reached the chain in any form.
    pub fn network_calls(&self) -> usize {
        let state = self.state.borrow();
        state.queries.len() + state.sent.len()
    }

    fn execute(state: &mut ChainState, tx: &Transaction) -> Result<(), String> {
        let data = tx
            .call_data()
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "missing call data".to_string())?;
        let (function, args) = decode_call_data(&data).map_err(|e| e.to_string())?;
        let arg_str = |i: usize| {
            args.get(i)
                .map(|a| String::from_utf8_lossy(a).into_owned())
                .unwrap_or_default()
        };
        match function.as_str() {
            "certifyAction" => {
                if args.len() != 5 {
                    return Err(format!("wrong number of arguments: {}", args.len()));
                }
                let proof_id = arg_str(1);
                if state
                    .proofs
                    .iter()
                    .any(|(o, c)| o == &tx.sender && c.proof_id == proof_id)
                {
                    return Err("Proof ID already exists".to_string());
                }
                let tags = top_decode_buffer_list(&args[4])
                    .map_err(|e| e.to_string())?
                    .into_iter()
                    .map(|t| String::from_utf8_lossy(&t).into_owned())
                    .collect();
                state.clock += 6;
                let cert = Certificate {
                    proof_id,
                    proof_text: arg_str(0),
                    category: CertificateCategory::from(arg_str(2)),
                    metadata: arg_str(3),
                    ai_tags: tags,
                    timestamp: state.clock,
                    confidence_score: 100,
                    verification_status: VerificationStatus::Pending,
                    created_by: tx.sender.clone(),
                };
                state.proofs.push((tx.sender.clone(), cert));
                Ok(())
            }
            "updateProof" => {
                let proof_id = arg_str(0);
                let (_, cert) = state
                    .proofs
                    .iter_mut()
                    .find(|(o, c)| o == &tx.sender && c.proof_id == proof_id && !c.proof_text.is_empty())
                    .ok_or_else(|| "Certificate not found".to_string())?;
                // Every argument that is present overwrites its field, empty or not.
                if let Some(text) = args.get(1) {
                    cert.proof_text = String::from_utf8_lossy(text).into_owned();
                }
                if let Some(category) = args.get(2) {
                    cert.category = CertificateCategory::from(String::from_utf8_lossy(category).into_owned());
                }
                if let Some(metadata) = args.get(3) {
                    cert.metadata = String::from_utf8_lossy(metadata).into_owned();
                }
                if let Some(tags) = args.get(4) {
                    cert.ai_tags = top_decode_buffer_list(tags)
                        .map_err(|e| e.to_string())?
                        .into_iter()
                        .map(|t| String::from_utf8_lossy(&t).into_owned())
                        .collect();
                }
                Ok(())
            }
            other => Err(format!("invalid function: {}", other)),
        }
    }

    fn owner_arg(query: &ContractQuery, index: usize) -> Option<(String, [u8; 32])> {
        let bytes = hex::decode(query.args.get(index)?).ok()?;
        let key: [u8; 32] = bytes.try_into().ok()?;
        Some((crate::address::encode_bech32(&key).ok()?, key))
    }

    fn text_arg(query: &ContractQuery, index: usize) -> String {
        query
            .args
            .get(index)
            .and_then(|a| hex::decode(a).ok())
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    }
}

fn ok_response(return_data: Vec<Vec<u8>>) -> QueryResponse {
    QueryResponse {
        return_code: "ok".to_string(),
        return_message: String::new(),
        return_data,
    }
}

#[async_trait(?Send)]
impl NetworkProvider for MockChain {
    async fn get_account(&self, address: &str) -> NetworkResult<Account> {
        if self.fail_accounts.get() {
            return Err(CoreError::Rpc("account endpoint unavailable".to_string()));
        }
        decode_bech32(address)?;
        Ok(self
            .state
            .borrow()
            .accounts
            .get(address)
            .cloned()
            .unwrap_or(Account {
                address: address.to_string(),
                nonce: 0,
                balance: "0".to_string(),
            }))
    }

    async fn query_contract(&self, query: &ContractQuery) -> NetworkResult<QueryResponse> {
        let mut state = self.state.borrow_mut();
        state.queries.push(query.clone());
        if self.fail_queries.get() {
            return Err(CoreError::Rpc("connection refused".to_string()));
        }
        if query.sc_address != contract_address() {
            return Ok(QueryResponse {
                return_code: "contract not found".to_string(),
                ..Default::default()
            });
        }
        let response = match query.func_name.as_str() {
            "getProof" => {
                let owner = Self::owner_arg(query, 0);
                let proof_id = Self::text_arg(query, 1);
                match owner.and_then(|(addr, key)| {
                    state
                        .proofs
                        .iter()
                        .find(|(o, c)| o == &addr && c.proof_id == proof_id)
                        .map(|(_, c)| encode_certificate(c, &key))
                }) {
                    Some(bytes) => ok_response(vec![bytes]),
                    None => QueryResponse {
                        return_code: "user error".to_string(),
                        return_message: "Proof not found".to_string(),
                        return_data: vec![],
                    },
                }
            }
            "getUserProofs" => {
                let mut list = Vec::new();
                if let Some((addr, key)) = Self::owner_arg(query, 0) {
                    for (_, cert) in state
                        .proofs
                        .iter()
                        .filter(|(o, c)| o == &addr && !c.proof_text.is_empty())
                    {
                        list.extend(encode_certificate(cert, &key));
                    }
                }
                ok_response(vec![list])
            }
            "getTotalProofs" => ok_response(vec![top_encode_u64(state.proofs.len() as u64)]),
            "getCategoryStats" => {
                let category = Self::text_arg(query, 0);
                let count = state
                    .proofs
                    .iter()
                    .filter(|(_, c)| c.category.as_str() == category)
                    .count();
                ok_response(vec![top_encode_u64(count as u64)])
            }
            other => QueryResponse {
                return_code: "function not found".to_string(),
                return_message: format!("invalid function: {}", other),
                return_data: vec![],
            },
        };
        Ok(response)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> NetworkResult<String> {
        if self.fail_sends.get() {
            return Err(CoreError::Rpc("transaction rejected by proxy".to_string()));
        }
        let mut state = self.state.borrow_mut();
        if transaction.signature.is_none() {
            return Err(CoreError::Transaction("transaction is not signed".to_string()));
        }
        let expected = state
            .accounts
            .get(&transaction.sender)
            .map(|a| a.nonce)
            .unwrap_or(0);
        if transaction.nonce != expected {
            return Err(CoreError::Transaction(format!(
                "invalid nonce: expected {}, got {}",
                expected, transaction.nonce
            )));
        }
        let account = state
            .accounts
            .entry(transaction.sender.clone())
            .or_insert_with(|| Account {
                address: transaction.sender.clone(),
                nonce: 0,
                balance: "0".to_string(),
            });
        account.nonce += 1;

        let status = match Self::execute(&mut state, transaction) {
            Ok(()) => TransactionStatus::Success,
            Err(_) => TransactionStatus::Fail,
        };
        state.sent.push(transaction.clone());
        let hash = format!("{:064x}", state.sent.len());
        state.statuses.insert(hash.clone(), status);
        Ok(hash)
    }

    async fn get_transaction_status(&self, tx_hash: &str) -> NetworkResult<TransactionStatus> {
        self.state
            .borrow()
            .statuses
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| CoreError::Rpc(format!("transaction not found: {}", tx_hash)))
    }
}

/// Storage backend over a map of JSON strings.
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorage {
    async fn save<T: Serialize>(&self, key: &str, data: &T) -> StorageResult<()> {
        let json = serde_json::to_string(data)?;
        self.items.borrow_mut().insert(key.to_string(), json);
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.items.borrow().get(key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.items.borrow().contains_key(key))
    }
}

/// Local key bridge that records what it was asked and can be told to
/// decline or fail.
pub struct ScriptedBridge {
    pub key: LocalKeyBridge,
    pub decline_login: Cell<bool>,
    pub fail_login: Cell<bool>,
    /// Sign the login token with a different key.
    pub forge_login: Cell<bool>,
    pub fail_sign: Cell<bool>,
    pub logins: RefCell<Vec<LoginRequest>>,
    pub logouts: Cell<usize>,
    pub signed: RefCell<Vec<SignRequest>>,
}

impl ScriptedBridge {
    pub fn new(seed: u8) -> Self {
        Self {
            key: LocalKeyBridge::from_secret_bytes(&[seed; 32]).expect("valid key"),
            decline_login: Cell::new(false),
            fail_login: Cell::new(false),
            forge_login: Cell::new(false),
            fail_sign: Cell::new(false),
            logins: RefCell::new(Vec::new()),
            logouts: Cell::new(0),
            signed: RefCell::new(Vec::new()),
        }
    }

    pub fn address(&self) -> &str {
        self.key.address()
    }
}

#[async_trait(?Send)]
impl WalletBridge for ScriptedBridge {
    async fn login(&self, request: &LoginRequest) -> CoreResult<Option<LoginOutcome>> {
        self.logins.borrow_mut().push(request.clone());
        if self.fail_login.get() {
            return Err(CoreError::Connection("wallet unreachable".to_string()));
        }
        if self.decline_login.get() {
            return Ok(None);
        }
        if self.forge_login.get() {
            let impostor = LocalKeyBridge::from_secret_bytes(&[0xee; 32])?;
            let signature = impostor
                .login(request)
                .await?
                .and_then(|outcome| outcome.signature);
            return Ok(Some(LoginOutcome {
                address: self.address().to_string(),
                signature,
            }));
        }
        self.key.login(request).await
    }

    async fn resume(&self, kind: ProviderKind, address: &str) -> CoreResult<bool> {
        self.key.resume(kind, address).await
    }

    async fn sign_transaction(&self, request: &SignRequest) -> CoreResult<String> {
        self.signed.borrow_mut().push(request.clone());
        if self.fail_sign.get() {
            return Err(CoreError::Transaction("user rejected signing".to_string()));
        }
        self.key.sign_transaction(request).await
    }

    async fn logout(&self) -> CoreResult<()> {
        self.logouts.set(self.logouts.get() + 1);
        Ok(())
    }
}
