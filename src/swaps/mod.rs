/// Swap execution pipeline
///
/// The orchestrator sequences quote acquisition, instruction assembly,
/// transaction composition, and settlement, and owns the two
/// cross-cutting concerns: converting human amounts to native units and
/// normalizing component failures into the caller-facing error taxonomy.
pub mod bundle;
pub mod config;
pub mod instructions;
pub mod quote;
pub mod transaction;
pub mod types;

#[cfg(test)]
mod tests;

use crate::configs::Configs;
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::rpc::{sol_to_lamports, RpcHandle};
use crate::swaps::bundle::JitoClient;
use crate::swaps::config::SOL_MINT;
use crate::swaps::quote::{short_mint, QuoteClient};
use crate::swaps::transaction::TipTransfer;
use crate::swaps::types::{InstructionSet, SwapRequest, SwapResult};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Convert a human-denominated amount to the asset's native integer unit
pub fn to_native_units(amount: f64, decimals: u8) -> Result<u64, SwapError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SwapError::AmountConversion(format!(
            "amount {} is not a valid quantity",
            amount
        )));
    }
    let scaled = amount * 10f64.powi(decimals as i32);
    if scaled > u64::MAX as f64 {
        return Err(SwapError::AmountConversion(format!(
            "amount {} overflows native units at {} decimals",
            amount, decimals
        )));
    }
    Ok(scaled.round() as u64)
}

/// Map component failures onto the caller-facing taxonomy
///
/// Pattern-matched specializations first (they can hide inside any
/// component's message), then plumbing variants collapse into the
/// catch-all; already-typed pipeline errors pass through unchanged.
pub fn normalize_error(error: SwapError) -> SwapError {
    let message = error.to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("insufficient funds") || lowered.contains("insufficient lamports") {
        return SwapError::InsufficientFunds(message);
    }
    if lowered.contains("invalid quote") {
        return SwapError::InvalidQuote(message);
    }

    match error {
        SwapError::Config(msg) | SwapError::Rpc(msg) => SwapError::SwapFailed(msg),
        other => other,
    }
}

/// Explicitly constructed execution context for swaps
///
/// Owns the long-lived collaborators (RPC handle, relay client, route
/// client) and the process-wide signing identity. Built once at startup
/// and injected wherever swaps are triggered; request handling never
/// reaches into ambient state.
pub struct SwapEngine {
    rpc: Arc<RpcHandle>,
    keypair: Arc<Keypair>,
    signer_pubkey: Pubkey,
    quote_client: QuoteClient,
    jito: JitoClient,
    fee_recipient: Pubkey,
    fee_percentage: f64,
    jito_enabled: bool,
    jito_simulate: bool,
    tip_lamports: u64,
    /// Concurrent webhook requests share one signing identity; composing
    /// and settling are serialized behind this lock so two in-flight
    /// swaps cannot race on freshness anchors
    submit_lock: Mutex<()>,
}

impl SwapEngine {
    pub fn new(
        configs: &Configs,
        rpc: Arc<RpcHandle>,
        keypair: Arc<Keypair>,
    ) -> Result<Self, SwapError> {
        let fee_recipient = Pubkey::from_str(&configs.fee_address)
            .map_err(|e| SwapError::Config(format!("invalid fee_address: {}", e)))?;
        let signer_pubkey = keypair.pubkey();

        Ok(Self {
            rpc,
            keypair,
            signer_pubkey,
            quote_client: QuoteClient::new(configs.priority_fee_lamports),
            jito: JitoClient::new(&configs.jito_block_engine_url),
            fee_recipient,
            fee_percentage: configs.fee_percentage,
            jito_enabled: configs.jito_enabled,
            jito_simulate: configs.jito_simulate,
            tip_lamports: sol_to_lamports(configs.jito_tip_sol),
            submit_lock: Mutex::new(()),
        })
    }

    pub fn wallet_address(&self) -> String {
        self.signer_pubkey.to_string()
    }

    pub fn jito_enabled(&self) -> bool {
        self.jito_enabled
    }

    pub(crate) async fn submit_guard(&self) -> MutexGuard<'_, ()> {
        self.submit_lock.lock().await
    }

    /// Execute one swap end to end
    ///
    /// Quote and assembly failures are not retried here; a fresh
    /// client-initiated request is the retry path.
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapResult, SwapError> {
        let started = std::time::Instant::now();
        logger::info(
            LogTag::Swap,
            &format!(
                "swap start: {} {} -> {} (wallet {})",
                request.amount,
                short_mint(&request.input_mint),
                short_mint(&request.output_mint),
                self.wallet_address()
            ),
        );

        match self.execute(request).await {
            Ok(result) => {
                logger::info(
                    LogTag::Swap,
                    &format!("swap settled in {:.2}s", started.elapsed().as_secs_f64()),
                );
                Ok(result)
            }
            Err(e) => {
                logger::error(LogTag::Swap, &format!("swap failed: {}", e));
                Err(normalize_error(e))
            }
        }
    }

    async fn execute(&self, request: &SwapRequest) -> Result<SwapResult, SwapError> {
        validate_request(request)?;

        let parsed_amount = self
            .parsed_amount(&request.input_mint, request.amount)
            .await?;

        let quote = self
            .quote_client
            .get_quote(
                &request.input_mint,
                &request.output_mint,
                parsed_amount,
                request.max_slippage_bps,
            )
            .await?;

        let response = self
            .quote_client
            .get_swap_instructions(&quote, &self.signer_pubkey)
            .await?;
        let set = instructions::decode_instruction_set(response)?;

        // One composed transaction in flight per identity at a time
        let _guard = self.submit_guard().await;

        let tx = self.compose_transaction(&set, parsed_amount).await?;

        if self.jito_enabled {
            let outcome =
                bundle::submit_bundle_and_await(&self.jito, &tx, self.jito_simulate).await?;
            Ok(SwapResult {
                signature: None,
                bundle_id: Some(outcome.bundle_id),
                landed_slot: outcome.landed_slot,
                quote,
                wallet_address: self.wallet_address(),
            })
        } else {
            let signature = transaction::send_and_confirm(&self.rpc, &tx).await?;
            Ok(SwapResult {
                signature: Some(signature.to_string()),
                bundle_id: None,
                landed_slot: None,
                quote,
                wallet_address: self.wallet_address(),
            })
        }
    }

    /// Convert the request's human amount into the input asset's native
    /// unit, querying on-chain decimals for non-SOL assets
    async fn parsed_amount(&self, mint: &str, amount: f64) -> Result<u64, SwapError> {
        if mint == SOL_MINT {
            return to_native_units(amount, 9);
        }
        let mint_key = Pubkey::from_str(mint)
            .map_err(|e| SwapError::AmountConversion(format!("invalid mint {}: {}", mint, e)))?;
        let decimals = self
            .rpc
            .get_token_decimals(&mint_key)
            .await
            .map_err(|e| SwapError::AmountConversion(e.to_string()))?;
        to_native_units(amount, decimals)
    }

    /// Compose the atomic transaction: swap instructions, protocol fee,
    /// optional relay tip, resolved lookup tables, fresh blockhash, one
    /// signature. Any failure aborts with no partial transaction.
    async fn compose_transaction(
        &self,
        set: &InstructionSet,
        parsed_amount: u64,
    ) -> Result<VersionedTransaction, SwapError> {
        let tip = if self.jito_enabled {
            let accounts = self.jito.get_tip_accounts().await.map_err(|e| {
                SwapError::TransactionComposition(format!("tip account fetch failed: {}", e))
            })?;
            let selected = transaction::select_tip_account(&accounts, &mut rand::thread_rng())?;
            let account = Pubkey::from_str(selected).map_err(|e| {
                SwapError::TransactionComposition(format!(
                    "invalid tip account {}: {}",
                    selected, e
                ))
            })?;
            Some(TipTransfer {
                account,
                lamports: self.tip_lamports,
            })
        } else {
            None
        };

        let instruction_list = transaction::build_instruction_list(
            set,
            &self.signer_pubkey,
            &self.fee_recipient,
            parsed_amount,
            self.fee_percentage,
            tip.as_ref(),
        );

        let tables = instructions::resolve_lookup_tables(&self.rpc, &set.lookup_table_addresses)
            .await?;
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::TransactionComposition(e.to_string()))?;

        logger::debug(
            LogTag::Transaction,
            &format!(
                "composing: {} instructions, {} tables, fee {} lamports, tip {}",
                instruction_list.len(),
                tables.len(),
                transaction::fee_lamports(parsed_amount, self.fee_percentage),
                tip.as_ref().map(|t| t.lamports).unwrap_or(0)
            ),
        );

        transaction::compile_and_sign(&instruction_list, &tables, &self.keypair, blockhash)
    }
}

fn validate_request(request: &SwapRequest) -> Result<(), SwapError> {
    if request.input_mint.is_empty() {
        return Err(SwapError::SwapFailed("input mint cannot be empty".to_string()));
    }
    if request.output_mint.is_empty() {
        return Err(SwapError::SwapFailed("output mint cannot be empty".to_string()));
    }
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(SwapError::AmountConversion(format!(
            "amount must be a positive number, got {}",
            request.amount
        )));
    }
    Ok(())
}
