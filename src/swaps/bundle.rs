/// Private relay (Jito block engine) settlement path
///
/// Bundles are submitted over the relay's JSON-RPC bundle endpoint and
/// polled to a terminal status. A bundle id has no persistence: if the
/// process dies mid-poll the bundle's fate is unknown, which is why the
/// timeout error is worded as indeterminate rather than failed.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::config::{
    API_TIMEOUT_SECS, BUNDLE_POLL_INTERVAL_MS, BUNDLE_POLL_TIMEOUT_SECS, JITO_BUNDLES_PATH,
};
use crate::swaps::types::{BundleOutcome, BundleStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use solana_sdk::transaction::VersionedTransaction;
use std::time::Duration;

/// Anything that can report inflight bundle statuses
///
/// Split out from the client so polling logic can be driven by scripted
/// sequences in tests.
#[async_trait]
pub trait BundleStatusSource: Send + Sync {
    async fn fetch_statuses(&self, bundle_ids: &[String]) -> Result<Vec<BundleStatus>, SwapError>;
}

/// JSON-RPC client for the relay's bundle endpoint
pub struct JitoClient {
    http: Client,
    bundles_url: String,
}

impl JitoClient {
    pub fn new(block_engine_url: &str) -> Self {
        Self {
            http: Client::new(),
            bundles_url: format!(
                "{}{}",
                block_engine_url.trim_end_matches('/'),
                JITO_BUNDLES_PATH
            ),
        }
    }

    /// One JSON-RPC round trip against the bundle endpoint
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, SwapError> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.bundles_url)
            .json(&envelope)
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| SwapError::Rpc(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::Rpc(format!(
                "{} returned HTTP {}: {}",
                method, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SwapError::Rpc(format!("{} malformed response: {}", method, e)))?;

        if let Some(error) = body.get("error") {
            return Err(SwapError::Rpc(format!("{} error: {}", method, error)));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| SwapError::Rpc(format!("{} response carries no result", method)))
    }

    /// Tip accounts the relay currently advertises
    pub async fn get_tip_accounts(&self) -> Result<Vec<String>, SwapError> {
        let result = self.rpc_call("getTipAccounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| SwapError::Rpc(format!("getTipAccounts malformed result: {}", e)))
    }

    /// Pre-submission simulation; an error result aborts the bundle
    pub async fn simulate_bundle(&self, transactions: &[String]) -> Result<(), SwapError> {
        let result = self
            .rpc_call("simulateBundle", json!([transactions]))
            .await
            .map_err(|e| SwapError::BundleFailed(format!("simulation failed: {}", e)))?;
        logger::debug(LogTag::Bundle, &format!("simulation result: {}", result));
        Ok(())
    }

    /// Submit one bundle of base58-encoded signed transactions
    pub async fn send_bundle(&self, transactions: &[String]) -> Result<String, SwapError> {
        let result = self
            .rpc_call("sendBundle", json!([transactions]))
            .await
            .map_err(|e| SwapError::BundleFailed(format!("submission failed: {}", e)))?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SwapError::BundleFailed("sendBundle returned no bundle id".to_string()))
    }
}

#[async_trait]
impl BundleStatusSource for JitoClient {
    async fn fetch_statuses(&self, bundle_ids: &[String]) -> Result<Vec<BundleStatus>, SwapError> {
        let result = self
            .rpc_call("getInflightBundleStatuses", json!([bundle_ids]))
            .await?;
        let value = result.get("value").cloned().unwrap_or(Value::Null);
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| {
            SwapError::Rpc(format!("getInflightBundleStatuses malformed result: {}", e))
        })
    }
}

/// Poll a bundle to a terminal status
///
/// State machine: `Landed` succeeds with the landing slot as finality
/// evidence; `Failed` aborts immediately with the relay's error;
/// `Pending`/`Processed` keep polling; any unrecognized status is logged
/// and treated as non-terminal. Transient fetch errors are swallowed and
/// retried on the next tick. Hitting the deadline without a terminal
/// status means the bundle's fate is unknown - that ambiguity is the
/// caller's to resolve before retrying.
pub async fn poll_bundle_status<S: BundleStatusSource + ?Sized>(
    source: &S,
    bundle_id: &str,
) -> Result<BundleOutcome, SwapError> {
    let started = tokio::time::Instant::now();
    let timeout = Duration::from_secs(BUNDLE_POLL_TIMEOUT_SECS);
    let ids = vec![bundle_id.to_string()];
    let mut last_status = String::new();

    loop {
        if started.elapsed() >= timeout {
            return Err(SwapError::BundlePollTimeout {
                elapsed_secs: started.elapsed().as_secs(),
            });
        }

        match source.fetch_statuses(&ids).await {
            Ok(statuses) => {
                if let Some(status) = statuses.first() {
                    if status.status != last_status {
                        logger::info(
                            LogTag::Bundle,
                            &format!("bundle {} status: {}", bundle_id, status.status),
                        );
                        last_status = status.status.clone();
                    }

                    match status.status.as_str() {
                        "Landed" => {
                            logger::info(
                                LogTag::Bundle,
                                &format!(
                                    "bundle {} landed at slot {:?}",
                                    bundle_id, status.landed_slot
                                ),
                            );
                            return Ok(BundleOutcome {
                                bundle_id: bundle_id.to_string(),
                                landed_slot: status.landed_slot,
                            });
                        }
                        "Failed" => {
                            return Err(SwapError::BundleFailed(
                                status
                                    .error
                                    .clone()
                                    .unwrap_or_else(|| "relay reported Failed".to_string()),
                            ));
                        }
                        "Pending" | "Processed" => {}
                        other => {
                            logger::warning(
                                LogTag::Bundle,
                                &format!("unknown bundle status '{}', still polling", other),
                            );
                        }
                    }
                } else {
                    logger::debug(LogTag::Bundle, "no status reported yet");
                }
            }
            Err(e) => {
                // Transient poll failure; the deadline check above bounds us
                logger::warning(LogTag::Bundle, &format!("status poll error: {}", e));
            }
        }

        tokio::time::sleep(Duration::from_millis(BUNDLE_POLL_INTERVAL_MS)).await;
    }
}

/// Relay settlement path: submit the signed transaction as a one-element
/// bundle and poll it to a terminal status
pub async fn submit_bundle_and_await(
    jito: &JitoClient,
    transaction: &VersionedTransaction,
    simulate_first: bool,
) -> Result<BundleOutcome, SwapError> {
    let bytes = bincode::serialize(transaction)
        .map_err(|e| SwapError::BundleFailed(format!("cannot serialize transaction: {}", e)))?;
    let encoded = bs58::encode(bytes).into_string();
    let bundle = vec![encoded];

    if simulate_first {
        jito.simulate_bundle(&bundle).await?;
    }

    let bundle_id = jito.send_bundle(&bundle).await?;
    logger::info(LogTag::Bundle, &format!("bundle sent: {}", bundle_id));

    poll_bundle_status(jito, &bundle_id).await
}
