//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mpt_demo::config::DemoConfig;
use mpt_demo::ledger::transaction::{Amount, SignedTransaction, TransactionKind};
use mpt_demo::ledger::types::{
    AccountInfo, EngineResult, LedgerError, LedgerResult, MptIssuanceId, SubmitResult,
    TransactionMeta, TransactionStatus, TxHash,
};
use mpt_demo::ledger::{AccountId, Ledger};

pub const ISSUER_SECRET: &str = "sEd7HFg4UKpa4UA6CJAxNLZcMF4kYbE";
pub const ISSUER_ADDRESS: &str = "rsNnw5i5tbgyjedDRNSmBk2Jw7PHHziPJ5";
pub const HOLDER_SECRET: &str = "sEdTKevpT15jdZBRgLcT3Ye8rvkrY8P";
pub const HOLDER_ADDRESS: &str = "rDirbKUBmzJnqNzFEo9KaqLzpz62B4PmJY";

/// Default config with polling delays removed.
pub fn fast_config() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.confirmation.max_attempts = 3;
    config.confirmation.base_delay_ms = 0;
    config.confirmation.max_delay_ms = 0;
    config
}

pub fn account(address: &str) -> AccountId {
    address.parse().unwrap()
}

#[derive(Default)]
struct LedgerState {
    sequences: HashMap<AccountId, u32>,
    account_info_calls: Vec<(AccountId, u32)>,
    submitted: Vec<SignedTransaction>,
    results: HashMap<TxHash, TransactionMeta>,
    kinds: HashMap<TxHash, &'static str>,
    polls: HashMap<TxHash, u32>,
    issuances: HashMap<MptIssuanceId, AccountId>,
    holdings: HashMap<(AccountId, MptIssuanceId), u64>,
}

/// In-memory ledger that applies the three demo transaction types.
///
/// Issuance IDs are cut from the transaction hash, so a client can only
/// learn one from validated metadata.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    /// Leave `mpt_issuance_id` out of issuance metadata.
    pub omit_issuance_id: bool,
    /// Transaction types reported as validated without metadata.
    pub omit_metadata_for: Vec<&'static str>,
    /// Lookups answered with `Pending` before a transaction validates.
    pub pending_polls: u32,
    /// Engine result forced per transaction type name.
    pub forced_results: HashMap<&'static str, &'static str>,
}

impl MockLedger {
    /// Ledger with both demo accounts funded at the given sequences.
    pub fn funded(issuer_sequence: u32, holder_sequence: u32) -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.state.lock().unwrap();
            state.sequences.insert(account(ISSUER_ADDRESS), issuer_sequence);
            state.sequences.insert(account(HOLDER_ADDRESS), holder_sequence);
        }
        ledger
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// `(account, sequence returned)` for every `account_info` call, in order.
    pub fn account_info_calls(&self) -> Vec<(AccountId, u32)> {
        self.state.lock().unwrap().account_info_calls.clone()
    }

    /// Metadata recorded for a validated transaction.
    pub fn meta(&self, hash: &TxHash) -> Option<TransactionMeta> {
        self.state.lock().unwrap().results.get(hash).cloned()
    }

    fn apply(&self, state: &mut LedgerState, tx: &SignedTransaction) -> (String, Option<MptIssuanceId>) {
        let t = &tx.transaction;
        if let Some(forced) = self.forced_results.get(t.kind.name()) {
            return (forced.to_string(), None);
        }

        match &t.kind {
            TransactionKind::MptIssuanceCreate(_) => {
                let mut id = [0u8; 24];
                id.copy_from_slice(&tx.hash.0[..24]);
                let id = MptIssuanceId(id);
                state.issuances.insert(id, t.account);
                ("tesSUCCESS".into(), Some(id))
            }
            TransactionKind::MptAuthorize { issuance_id } => {
                if !state.issuances.contains_key(issuance_id) {
                    return ("tecOBJECT_NOT_FOUND".into(), None);
                }
                state.holdings.entry((t.account, *issuance_id)).or_insert(0);
                ("tesSUCCESS".into(), None)
            }
            TransactionKind::Payment {
                destination,
                amount: Amount::Mpt(mpt),
            } => {
                let issued_by_sender = state.issuances.get(&mpt.issuance_id) == Some(&t.account);
                match state.holdings.get_mut(&(*destination, mpt.issuance_id)) {
                    Some(balance) if issued_by_sender => {
                        *balance += mpt.value;
                        ("tesSUCCESS".into(), None)
                    }
                    _ => ("tecNO_AUTH".into(), None),
                }
            }
            TransactionKind::Payment { .. } => ("tesSUCCESS".into(), None),
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn account_info(&self, account: &AccountId) -> LedgerResult<AccountInfo> {
        let mut state = self.state.lock().unwrap();
        let sequence = *state.sequences.get(account).ok_or_else(|| LedgerError::Node {
            error: "actNotFound".into(),
            message: "Account not found.".into(),
        })?;
        state.account_info_calls.push((*account, sequence));
        Ok(AccountInfo {
            address: account.to_address(),
            sequence,
            balance_drops: 100_000_000,
        })
    }

    async fn submit(&self, tx: &SignedTransaction) -> LedgerResult<SubmitResult> {
        let mut state = self.state.lock().unwrap();
        let t = &tx.transaction;
        let expected = state.sequences.get(&t.account).copied().unwrap_or(0);
        if t.sequence != expected {
            let code = if t.sequence < expected { "tefPAST_SEQ" } else { "terPRE_SEQ" };
            return Ok(SubmitResult {
                engine_result: EngineResult::new(code),
                engine_result_message: String::new(),
                hash: Some(tx.hash),
            });
        }

        state.submitted.push(tx.clone());
        let (result, issuance_id) = self.apply(&mut state, tx);
        let engine_result = EngineResult::new(result);
        if engine_result.may_validate() {
            state.sequences.insert(t.account, expected + 1);
            let meta = TransactionMeta {
                result: Some(engine_result.clone()),
                mpt_issuance_id: if self.omit_issuance_id { None } else { issuance_id },
            };
            state.results.insert(tx.hash, meta);
            state.kinds.insert(tx.hash, t.kind.name());
        }

        Ok(SubmitResult {
            engine_result,
            engine_result_message: String::new(),
            hash: Some(tx.hash),
        })
    }

    async fn transaction(&self, hash: &TxHash) -> LedgerResult<TransactionStatus> {
        let mut state = self.state.lock().unwrap();
        let Some(meta) = state.results.get(hash).cloned() else {
            return Ok(TransactionStatus::NotFound);
        };
        let polls = state.polls.entry(*hash).or_insert(0);
        *polls += 1;
        if *polls <= self.pending_polls {
            return Ok(TransactionStatus::Pending);
        }
        let kind = state.kinds.get(hash).copied().unwrap_or_default();
        if self.omit_metadata_for.contains(&kind) {
            return Ok(TransactionStatus::Validated(TransactionMeta {
                result: None,
                mpt_issuance_id: None,
            }));
        }
        Ok(TransactionStatus::Validated(meta))
    }

    async fn mpt_balance(
        &self,
        holder: &AccountId,
        issuance_id: &MptIssuanceId,
    ) -> LedgerResult<u64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .holdings
            .get(&(*holder, *issuance_id))
            .copied()
            .unwrap_or(0))
    }
}

type Responder = dyn Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct NodeState {
    respond: Arc<Responder>,
    requests: Arc<Mutex<Vec<Value>>>,
    delay: Duration,
}

/// A running mock JSON-RPC node.
pub struct MockNode {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Request bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock node on an ephemeral port. `f(method, params)` returns the
/// HTTP status and the `result` object.
pub async fn start_mock_node<F>(f: F) -> MockNode
where
    F: Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync + 'static,
{
    start_mock_node_with_delay(Duration::ZERO, f).await
}

/// Like `start_mock_node`, sleeping `delay` before every answer.
pub async fn start_mock_node_with_delay<F>(delay: Duration, f: F) -> MockNode
where
    F: Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let state = NodeState {
        respond: Arc::new(f),
        requests: requests.clone(),
        delay,
    };
    let app = Router::new().route("/", post(handle)).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, requests }
}

async fn handle(State(state): State<NodeState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body.clone());
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let (status, result) = (state.respond)(&method, &body["params"][0]);
    (status, Json(json!({ "result": result })))
}
