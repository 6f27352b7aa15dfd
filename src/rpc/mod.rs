/// Solana RPC access for the swap pipeline
///
/// One long-lived nonblocking client shared read-only across requests.
/// Methods cover exactly what the pipeline needs: freshness anchors,
/// account reads for lookup tables, token decimals, raw broadcast, and
/// signature status polling for confirmation.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::config::{BROADCAST_MAX_RETRIES, RPC_TIMEOUT_SECS};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::TransactionStatus;
use std::time::Duration;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Converts lamports to a SOL amount
pub fn lamports_to_sol(lamports: u64) -> f64 {
    (lamports as f64) / (LAMPORTS_PER_SOL as f64)
}

/// Converts a SOL amount to lamports
pub fn sol_to_lamports(sol_amount: f64) -> u64 {
    (sol_amount * (LAMPORTS_PER_SOL as f64)) as u64
}

/// Shared handle to the network RPC endpoint
pub struct RpcHandle {
    client: RpcClient,
    url: String,
}

impl RpcHandle {
    pub fn new(url: &str) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            url.to_string(),
            Duration::from_secs(RPC_TIMEOUT_SECS),
            CommitmentConfig::confirmed(),
        );
        Self {
            client,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Basic liveness probe used during startup
    pub async fn get_health(&self) -> Result<(), SwapError> {
        self.client
            .get_health()
            .await
            .map_err(|e| SwapError::Rpc(format!("health check failed for {}: {}", self.url, e)))
    }

    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, SwapError> {
        self.client
            .get_balance(pubkey)
            .await
            .map_err(|e| SwapError::Rpc(format!("getBalance failed: {}", e)))
    }

    /// Fetch a fresh recent blockhash bounding transaction validity
    pub async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::Rpc(format!("getLatestBlockhash failed: {}", e)))
    }

    /// Decimal precision of a token mint, read from its on-chain supply
    pub async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError> {
        let supply = self
            .client
            .get_token_supply(mint)
            .await
            .map_err(|e| SwapError::Rpc(format!("getTokenSupply failed for {}: {}", mint, e)))?;
        Ok(supply.decimals)
    }

    pub async fn get_multiple_accounts(
        &self,
        pubkeys: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, SwapError> {
        self.client
            .get_multiple_accounts(pubkeys)
            .await
            .map_err(|e| SwapError::Rpc(format!("getMultipleAccounts failed: {}", e)))
    }

    /// Broadcast a signed transaction, skipping preflight and letting the
    /// transport retry submission a fixed small number of times
    pub async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, SwapError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            max_retries: Some(BROADCAST_MAX_RETRIES),
            ..RpcSendTransactionConfig::default()
        };

        let signature = self
            .client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::Rpc(format!("sendTransaction failed: {}", e)))?;

        logger::debug(
            LogTag::Rpc,
            &format!("broadcast {} via {}", signature, self.url),
        );
        Ok(signature)
    }

    pub async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>, SwapError> {
        let response = self
            .client
            .get_signature_statuses(signatures)
            .await
            .map_err(|e| SwapError::Rpc(format!("getSignatureStatuses failed: {}", e)))?;
        Ok(response.value)
    }
}
