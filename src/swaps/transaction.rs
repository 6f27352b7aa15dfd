/// Transaction composition and direct-path settlement
///
/// Composition merges the decoded swap instructions with the protocol fee
/// transfer and, in relay mode, a priority tip transfer, then compiles a
/// v0 message against freshly resolved lookup tables and a fresh
/// blockhash and signs it exactly once. The pure pieces are free
/// functions so they stay testable without a network.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::rpc::RpcHandle;
use crate::swaps::config::{CONFIRMATION_POLL_INTERVAL_MS, CONFIRMATION_TIMEOUT_SECS};
use crate::swaps::types::InstructionSet;
use rand::Rng;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::system_instruction;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::TransactionStatus;
use std::time::Duration;

/// Priority tip destination and size, chosen before composition
#[derive(Debug, Clone)]
pub struct TipTransfer {
    pub account: Pubkey,
    pub lamports: u64,
}

/// Protocol fee in native units, truncated toward zero
///
/// The fee is charged whenever a transaction is composed, independent of
/// the swap's economic outcome.
pub fn fee_lamports(parsed_amount: u64, fee_percentage: f64) -> u64 {
    (parsed_amount as f64 * fee_percentage) as u64
}

/// Pick one tip account uniformly at random from the relay's advertised
/// set. The rng is injected so selection is testable.
pub fn select_tip_account<'a, R: Rng>(
    accounts: &'a [String],
    rng: &mut R,
) -> Result<&'a str, SwapError> {
    if accounts.is_empty() {
        return Err(SwapError::TransactionComposition(
            "relay advertised no tip accounts".to_string(),
        ));
    }
    let index = rng.gen_range(0..accounts.len());
    Ok(&accounts[index])
}

/// Assemble the full instruction list in its fixed execution order:
/// compute budget, setup, swap, cleanup, protocol fee, optional tip
pub fn build_instruction_list(
    set: &InstructionSet,
    signer: &Pubkey,
    fee_recipient: &Pubkey,
    parsed_amount: u64,
    fee_percentage: f64,
    tip: Option<&TipTransfer>,
) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(
        set.compute_budget.len() + set.setup.len() + 3 + usize::from(tip.is_some()),
    );

    instructions.extend(set.compute_budget.iter().cloned());
    instructions.extend(set.setup.iter().cloned());
    instructions.push(set.swap.clone());
    if let Some(cleanup) = &set.cleanup {
        instructions.push(cleanup.clone());
    }

    instructions.push(system_instruction::transfer(
        signer,
        fee_recipient,
        fee_lamports(parsed_amount, fee_percentage),
    ));

    if let Some(tip) = tip {
        instructions.push(system_instruction::transfer(
            signer,
            &tip.account,
            tip.lamports,
        ));
    }

    instructions
}

/// Compile instructions and resolved tables into a signed v0 transaction
///
/// The single signature happens here, immediately before submission.
pub fn compile_and_sign(
    instructions: &[Instruction],
    tables: &[AddressLookupTableAccount],
    keypair: &Keypair,
    recent_blockhash: Hash,
) -> Result<VersionedTransaction, SwapError> {
    use solana_sdk::signer::Signer;

    let message = v0::Message::try_compile(
        &keypair.pubkey(),
        instructions,
        tables,
        recent_blockhash,
    )
    .map_err(|e| SwapError::TransactionComposition(format!("message compile failed: {}", e)))?;

    VersionedTransaction::try_new(VersionedMessage::V0(message), &[keypair])
        .map_err(|e| SwapError::TransactionComposition(format!("signing failed: {}", e)))
}

/// Interpret one confirmation status: `Ok(true)` when confirmed clean,
/// `Ok(false)` when still below the confirmed commitment, error when the
/// chain executed the transaction and it failed
pub fn confirmation_outcome(status: &TransactionStatus) -> Result<bool, SwapError> {
    if let Some(err) = &status.err {
        return Err(SwapError::SettlementFailed(format!(
            "transaction failed on-chain: {}",
            err
        )));
    }
    Ok(status.satisfies_commitment(CommitmentConfig::confirmed()))
}

/// Direct settlement path: broadcast raw bytes, then block until the
/// network reports the transaction confirmed
///
/// Submission retries are the transport's job (fixed small count inside
/// `RpcHandle::send_transaction`); an on-chain execution error in the
/// confirmed result is terminal and never retried here.
pub async fn send_and_confirm(
    rpc: &RpcHandle,
    transaction: &VersionedTransaction,
) -> Result<Signature, SwapError> {
    let signature = rpc
        .send_transaction(transaction)
        .await
        .map_err(|e| SwapError::SettlementFailed(e.to_string()))?;

    logger::info(
        LogTag::Transaction,
        &format!("broadcast {}, waiting for confirmation", signature),
    );

    let deadline =
        tokio::time::Instant::now() + Duration::from_secs(CONFIRMATION_TIMEOUT_SECS);

    loop {
        if tokio::time::Instant::now() >= deadline {
            return Err(SwapError::SettlementFailed(format!(
                "confirmation timeout after {}s for {}",
                CONFIRMATION_TIMEOUT_SECS, signature
            )));
        }

        match rpc.get_signature_statuses(&[signature]).await {
            Ok(statuses) => {
                if let Some(status) = statuses.into_iter().flatten().next() {
                    if confirmation_outcome(&status)? {
                        logger::info(
                            LogTag::Transaction,
                            &format!(
                                "confirmed {} (https://solscan.io/tx/{})",
                                signature, signature
                            ),
                        );
                        return Ok(signature);
                    }
                }
            }
            Err(e) => {
                // Status lookups can fail transiently; the deadline bounds us
                logger::warning(
                    LogTag::Transaction,
                    &format!("status poll error for {}: {}", signature, e),
                );
            }
        }

        tokio::time::sleep(Duration::from_millis(CONFIRMATION_POLL_INTERVAL_MS)).await;
    }
}
