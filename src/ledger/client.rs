//! Ledger JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Query account state (sequence, balances, MPT holdings)
//! - Submit signed transaction blobs
//! - Look up transactions by hash for validation and metadata
//! - Map node error responses to `LedgerError`

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::config::LedgerConfig;
use crate::ledger::keys::AccountId;
use crate::ledger::transaction::SignedTransaction;
use crate::ledger::types::{
    AccountInfo, EngineResult, LedgerError, LedgerResult, MptIssuanceId, SubmitResult,
    TransactionMeta, TransactionStatus, TxHash,
};
use crate::observability::metrics;

/// Operations the demo needs from a ledger node.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current account state, including the next sequence number.
    async fn account_info(&self, account: &AccountId) -> LedgerResult<AccountInfo>;

    /// Submit a signed transaction and return the preliminary result.
    async fn submit(&self, tx: &SignedTransaction) -> LedgerResult<SubmitResult>;

    /// Look up a transaction by hash.
    async fn transaction(&self, hash: &TxHash) -> LedgerResult<TransactionStatus>;

    /// Validated MPT balance of `holder` for `issuance_id`; zero when the
    /// holder has no entry for it.
    async fn mpt_balance(
        &self,
        holder: &AccountId,
        issuance_id: &MptIssuanceId,
    ) -> LedgerResult<u64>;
}

/// JSON-RPC client for a single ledger node.
#[derive(Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: url::Url,
    timeout_duration: Duration,
}

impl JsonRpcClient {
    /// Create a new client.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        tracing::info!(rpc_url = %url, timeout_secs = config.rpc_timeout_secs, "Ledger client initialized");

        Ok(Self {
            http: reqwest::Client::new(),
            url,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    async fn post(&self, method: &str, body: &Value) -> LedgerResult<Value> {
        let response = self
            .http
            .post(self.url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Rpc(format!("{} returned HTTP {}", method, status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("{}: {}", method, e)))
    }

    /// Issue one JSON-RPC call and return its `result` object.
    async fn call(&self, method: &'static str, params: Value) -> LedgerResult<Value> {
        let request_id = uuid::Uuid::new_v4();
        let body = json!({
            "method": method,
            "params": [params],
            "id": request_id.to_string(),
        });

        tracing::debug!(method, %request_id, "RPC request");

        let outcome = match timeout(self.timeout_duration, self.post(method, &body)).await {
            Ok(result) => result.and_then(|body| extract_result(method, body)),
            Err(_) => Err(LedgerError::Timeout(self.timeout_duration.as_secs())),
        };

        match &outcome {
            Ok(_) => metrics::record_rpc(method, "ok"),
            Err(LedgerError::Node { error, .. }) => {
                tracing::debug!(method, %request_id, error = %error, "RPC node error");
                metrics::record_rpc(method, "node_error");
            }
            Err(e) => {
                tracing::warn!(method, %request_id, error = %e, "RPC failed");
                metrics::record_rpc(method, "transport_error");
            }
        }

        outcome
    }
}

/// Unwrap `result`, turning `status: "error"` into `LedgerError::Node`.
fn extract_result(method: &str, mut body: Value) -> LedgerResult<Value> {
    let result = body
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{}: missing result", method)))?;

    if result.get("status").and_then(Value::as_str) == Some("error") {
        let error = result
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let message = result
            .get("error_message")
            .or_else(|| result.get("error_exception"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(LedgerError::Node { error, message });
    }

    Ok(result)
}

fn str_field<'a>(value: &'a Value, method: &str, field: &str) -> LedgerResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{}: missing {}", method, field)))
}

pub(crate) fn parse_account_info(result: &Value) -> LedgerResult<AccountInfo> {
    let data = result
        .get("account_data")
        .ok_or_else(|| LedgerError::InvalidResponse("account_info: missing account_data".into()))?;

    let sequence = data
        .get("Sequence")
        .and_then(Value::as_u64)
        .and_then(|s| u32::try_from(s).ok())
        .ok_or_else(|| LedgerError::InvalidResponse("account_info: missing Sequence".into()))?;

    let balance_drops = str_field(data, "account_info", "Balance")?
        .parse()
        .map_err(|_| LedgerError::InvalidResponse("account_info: invalid Balance".into()))?;

    Ok(AccountInfo {
        address: str_field(data, "account_info", "Account")?.to_string(),
        sequence,
        balance_drops,
    })
}

pub(crate) fn parse_submit(result: &Value) -> LedgerResult<SubmitResult> {
    let hash = match result.pointer("/tx_json/hash").and_then(Value::as_str) {
        Some(h) => Some(h.parse::<TxHash>()?),
        None => None,
    };

    Ok(SubmitResult {
        engine_result: EngineResult::new(str_field(result, "submit", "engine_result")?),
        engine_result_message: result
            .get("engine_result_message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        hash,
    })
}

pub(crate) fn parse_transaction(result: &Value) -> LedgerResult<TransactionStatus> {
    if !result.get("validated").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(TransactionStatus::Pending);
    }

    let meta = match result.get("meta") {
        Some(meta) if meta.is_object() => meta,
        _ => {
            return Ok(TransactionStatus::Validated(TransactionMeta {
                result: None,
                mpt_issuance_id: None,
            }))
        }
    };

    let mpt_issuance_id = match meta.get("mpt_issuance_id").and_then(Value::as_str) {
        Some(id) => Some(id.parse::<MptIssuanceId>()?),
        None => None,
    };

    Ok(TransactionStatus::Validated(TransactionMeta {
        result: meta
            .get("TransactionResult")
            .and_then(Value::as_str)
            .map(EngineResult::new),
        mpt_issuance_id,
    }))
}

/// Sum of `MPTAmount` over the holder's entries for `issuance_id`.
pub(crate) fn parse_mpt_holdings(result: &Value, issuance_id: &MptIssuanceId) -> LedgerResult<u64> {
    let objects = result
        .get("account_objects")
        .and_then(Value::as_array)
        .ok_or_else(|| LedgerError::InvalidResponse("account_objects: missing list".into()))?;

    let wanted = issuance_id.to_string();
    let mut total = 0u64;
    for object in objects {
        let matches = object
            .get("MPTokenIssuanceID")
            .and_then(Value::as_str)
            .is_some_and(|id| id.eq_ignore_ascii_case(&wanted));
        if !matches {
            continue;
        }
        // Absent when the holder is authorized but holds nothing.
        if let Some(amount) = object.get("MPTAmount").and_then(Value::as_str) {
            let amount: u64 = amount.parse().map_err(|_| {
                LedgerError::InvalidResponse(format!("account_objects: invalid MPTAmount '{}'", amount))
            })?;
            total = total.saturating_add(amount);
        }
    }
    Ok(total)
}

#[async_trait]
impl Ledger for JsonRpcClient {
    async fn account_info(&self, account: &AccountId) -> LedgerResult<AccountInfo> {
        let result = self
            .call(
                "account_info",
                json!({ "account": account.to_address(), "ledger_index": "current" }),
            )
            .await?;
        parse_account_info(&result)
    }

    async fn submit(&self, tx: &SignedTransaction) -> LedgerResult<SubmitResult> {
        let result = self.call("submit", json!({ "tx_blob": tx.tx_blob() })).await?;
        let mut submitted = parse_submit(&result)?;
        // Older nodes omit tx_json.hash; the locally computed ID is equivalent.
        submitted.hash.get_or_insert(tx.hash);
        metrics::record_submission(tx.transaction.kind.name(), submitted.engine_result.as_str());
        Ok(submitted)
    }

    async fn transaction(&self, hash: &TxHash) -> LedgerResult<TransactionStatus> {
        match self
            .call("tx", json!({ "transaction": hash.to_string(), "binary": false }))
            .await
        {
            Ok(result) => parse_transaction(&result),
            Err(LedgerError::Node { error, .. }) if error == "txnNotFound" => {
                Ok(TransactionStatus::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn mpt_balance(
        &self,
        holder: &AccountId,
        issuance_id: &MptIssuanceId,
    ) -> LedgerResult<u64> {
        let mut total = 0u64;
        let mut marker: Option<Value> = None;
        loop {
            let mut params = json!({
                "account": holder.to_address(),
                "type": "mptoken",
                "ledger_index": "validated",
            });
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }
            let result = self.call("account_objects", params).await?;
            total = total.saturating_add(parse_mpt_holdings(&result, issuance_id)?);

            match result.get("marker") {
                Some(m) if !m.is_null() => marker = Some(m.clone()),
                _ => return Ok(total),
            }
        }
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("rpc_url", &self.url.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_bad_url() {
        let config = LedgerConfig {
            rpc_url: "::not a url::".to_string(),
            ..LedgerConfig::default()
        };
        let err = JsonRpcClient::new(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_client_exposes_parsed_url() {
        let config = LedgerConfig {
            rpc_url: "http://127.0.0.1:5005".to_string(),
            ..LedgerConfig::default()
        };
        let client = JsonRpcClient::new(&config).unwrap();
        assert_eq!(client.url().as_str(), "http://127.0.0.1:5005/");
    }

    #[test]
    fn test_node_error_extracted() {
        let body = json!({
            "result": {
                "status": "error",
                "error": "actNotFound",
                "error_message": "Account not found."
            }
        });
        match extract_result("account_info", body) {
            Err(LedgerError::Node { error, message }) => {
                assert_eq!(error, "actNotFound");
                assert_eq!(message, "Account not found.");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_is_invalid() {
        let err = extract_result("tx", json!({ "oops": true })).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_account_info() {
        let result = json!({
            "account_data": {
                "Account": "rsNnw5i5tbgyjedDRNSmBk2Jw7PHHziPJ5",
                "Balance": "99999964",
                "Sequence": 4821993
            },
            "status": "success"
        });
        let info = parse_account_info(&result).unwrap();
        assert_eq!(info.sequence, 4821993);
        assert_eq!(info.balance_drops, 99999964);
    }

    #[test]
    fn test_parse_submit_with_hash() {
        let result = json!({
            "engine_result": "tesSUCCESS",
            "engine_result_message": "The transaction was applied.",
            "tx_json": {
                "hash": "E08D6E9754025BA2534A78707605E0601F03ACF83C9F1A8CA1F9D03DA05A2FF5"
            }
        });
        let submitted = parse_submit(&result).unwrap();
        assert!(submitted.engine_result.is_success());
        assert!(submitted.hash.is_some());
    }

    #[test]
    fn test_parse_pending_and_validated_tx() {
        let pending = parse_transaction(&json!({ "validated": false })).unwrap();
        assert_eq!(pending, TransactionStatus::Pending);

        let validated = parse_transaction(&json!({
            "validated": true,
            "meta": {
                "TransactionResult": "tesSUCCESS",
                "mpt_issuance_id": "0000012FFD9EE5DA93AC614B4DB94D7E0FCE415CA51BED47"
            }
        }))
        .unwrap();
        match validated {
            TransactionStatus::Validated(meta) => {
                assert!(meta.result.unwrap().is_success());
                assert!(meta.mpt_issuance_id.is_some());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_validated_without_meta() {
        let status = parse_transaction(&json!({ "validated": true })).unwrap();
        assert_eq!(
            status,
            TransactionStatus::Validated(TransactionMeta {
                result: None,
                mpt_issuance_id: None
            })
        );
    }

    #[test]
    fn test_parse_holdings_filters_issuance() {
        let id: MptIssuanceId = "0000012FFD9EE5DA93AC614B4DB94D7E0FCE415CA51BED47".parse().unwrap();
        let result = json!({
            "account_objects": [
                { "MPTokenIssuanceID": "0000012FFD9EE5DA93AC614B4DB94D7E0FCE415CA51BED47", "MPTAmount": "5" },
                { "MPTokenIssuanceID": "000000000000000000000000000000000000000000000001", "MPTAmount": "9" },
                { "MPTokenIssuanceID": "0000012ffd9ee5da93ac614b4db94d7e0fce415ca51bed47" }
            ]
        });
        assert_eq!(parse_mpt_holdings(&result, &id).unwrap(), 5);
    }
}
