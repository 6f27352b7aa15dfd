/// Test suite for the swap pipeline
///
/// Covers the composition invariants (one swap instruction, fee math,
/// tip gating), the bundle poll state machine against scripted status
/// sequences on a paused clock, amount conversion, settlement outcome
/// classification, and error normalization.
use super::bundle::{poll_bundle_status, BundleStatusSource};
use super::transaction::{
    build_instruction_list, compile_and_sign, confirmation_outcome, fee_lamports,
    select_tip_account, TipTransfer,
};
use super::types::{BundleStatus, InstructionSet};
use super::{normalize_error, to_native_units, SwapEngine};
use crate::configs::Configs;
use crate::errors::SwapError;
use crate::rpc::RpcHandle;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_program;
use solana_sdk::transaction::TransactionError;
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// FIXTURES
// =============================================================================

fn marker_instruction(byte: u8) -> Instruction {
    Instruction {
        program_id: Pubkey::new_unique(),
        accounts: vec![],
        data: vec![byte],
    }
}

fn sample_set() -> InstructionSet {
    InstructionSet {
        compute_budget: vec![marker_instruction(1), marker_instruction(2)],
        setup: vec![marker_instruction(3)],
        swap: marker_instruction(4),
        cleanup: Some(marker_instruction(5)),
        lookup_table_addresses: vec![],
    }
}

/// Decode the lamports of a system transfer instruction
fn transfer_lamports(instruction: &Instruction) -> u64 {
    assert_eq!(instruction.program_id, system_program::id());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&instruction.data[4..12]);
    u64::from_le_bytes(bytes)
}

fn test_configs(jito_enabled: bool) -> Configs {
    serde_json::from_value(serde_json::json!({
        "main_wallet_private": "unused",
        "fee_address": Pubkey::new_unique().to_string(),
        "webhook_api_key": "secret",
        "jito_enabled": jito_enabled,
    }))
    .unwrap()
}

fn test_engine(jito_enabled: bool) -> SwapEngine {
    let rpc = Arc::new(RpcHandle::new("http://127.0.0.1:8899"));
    let keypair = Arc::new(Keypair::new());
    SwapEngine::new(&test_configs(jito_enabled), rpc, keypair).unwrap()
}

// =============================================================================
// COMPOSITION INVARIANTS
// =============================================================================

#[test]
fn fee_truncates_toward_zero() {
    assert_eq!(fee_lamports(1, 0.01), 0);
    assert_eq!(fee_lamports(99, 0.01), 0);
    assert_eq!(fee_lamports(100, 0.01), 1);
    assert_eq!(fee_lamports(999, 0.01), 9);
    assert_eq!(fee_lamports(1_000_000_000, 0.01), 10_000_000);
}

#[test]
fn instruction_list_has_exactly_one_swap_and_one_fee_transfer() {
    let set = sample_set();
    let signer = Pubkey::new_unique();
    let fee_recipient = Pubkey::new_unique();
    let list = build_instruction_list(&set, &signer, &fee_recipient, 1_000_000_000, 0.01, None);

    // compute budget (2) + setup (1) + swap + cleanup + fee
    assert_eq!(list.len(), 6);

    let swaps: Vec<_> = list.iter().filter(|ix| ix.data == vec![4]).collect();
    assert_eq!(swaps.len(), 1);

    let fee_transfers: Vec<_> = list
        .iter()
        .filter(|ix| ix.program_id == system_program::id())
        .collect();
    assert_eq!(fee_transfers.len(), 1);
    assert_eq!(transfer_lamports(fee_transfers[0]), 10_000_000);
    assert_eq!(fee_transfers[0].accounts[0].pubkey, signer);
    assert_eq!(fee_transfers[0].accounts[1].pubkey, fee_recipient);
}

#[test]
fn instruction_order_is_budget_setup_swap_cleanup_fee_tip() {
    let set = sample_set();
    let signer = Pubkey::new_unique();
    let tip = TipTransfer {
        account: Pubkey::new_unique(),
        lamports: 500_000,
    };
    let list = build_instruction_list(
        &set,
        &signer,
        &Pubkey::new_unique(),
        100,
        0.01,
        Some(&tip),
    );

    assert_eq!(list[0].data, vec![1]);
    assert_eq!(list[1].data, vec![2]);
    assert_eq!(list[2].data, vec![3]);
    assert_eq!(list[3].data, vec![4]);
    assert_eq!(list[4].data, vec![5]);
    // fee then tip, both system transfers
    assert_eq!(list[5].program_id, system_program::id());
    assert_eq!(list[6].program_id, system_program::id());
    assert_eq!(transfer_lamports(&list[6]), 500_000);
    assert_eq!(list[6].accounts[1].pubkey, tip.account);
}

#[test]
fn tip_transfer_present_iff_relay_mode() {
    let set = sample_set();
    let signer = Pubkey::new_unique();
    let fee_recipient = Pubkey::new_unique();

    let without = build_instruction_list(&set, &signer, &fee_recipient, 100, 0.01, None);
    let system_count = without
        .iter()
        .filter(|ix| ix.program_id == system_program::id())
        .count();
    assert_eq!(system_count, 1); // fee only

    let tip = TipTransfer {
        account: Pubkey::new_unique(),
        lamports: 500_000,
    };
    let with = build_instruction_list(&set, &signer, &fee_recipient, 100, 0.01, Some(&tip));
    let system_count = with
        .iter()
        .filter(|ix| ix.program_id == system_program::id())
        .count();
    assert_eq!(system_count, 2); // fee + tip
    assert_eq!(with.len(), without.len() + 1);
}

#[test]
fn cleanup_is_optional() {
    let mut set = sample_set();
    set.cleanup = None;
    let list = build_instruction_list(
        &set,
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        100,
        0.01,
        None,
    );
    assert_eq!(list.len(), 5);
    assert!(!list.iter().any(|ix| ix.data == vec![5]));
}

#[test]
fn tip_selection_is_deterministic_with_seeded_rng() {
    let accounts: Vec<String> = (0..8).map(|_| Pubkey::new_unique().to_string()).collect();

    let mut rng_a = StdRng::seed_from_u64(42);
    let mut rng_b = StdRng::seed_from_u64(42);
    let picked_a = select_tip_account(&accounts, &mut rng_a).unwrap();
    let picked_b = select_tip_account(&accounts, &mut rng_b).unwrap();
    assert_eq!(picked_a, picked_b);
    assert!(accounts.iter().any(|a| a == picked_a));
}

#[test]
fn tip_selection_fails_on_empty_set() {
    let mut rng = StdRng::seed_from_u64(1);
    let err = select_tip_account(&[], &mut rng).unwrap_err();
    assert!(matches!(err, SwapError::TransactionComposition(_)));
}

#[test]
fn signing_happens_exactly_once_and_anchors_differ_per_composition() {
    let keypair = Keypair::new();
    let instructions = vec![solana_sdk::system_instruction::transfer(
        &keypair.pubkey(),
        &Pubkey::new_unique(),
        1,
    )];

    let first = compile_and_sign(&instructions, &[], &keypair, Hash::new_unique()).unwrap();
    let second = compile_and_sign(&instructions, &[], &keypair, Hash::new_unique()).unwrap();

    // one signature from the single configured identity
    assert_eq!(first.signatures.len(), 1);
    assert_eq!(second.signatures.len(), 1);

    // fresh anchors make independent transactions; nothing is reused
    assert_ne!(
        first.message.recent_blockhash(),
        second.message.recent_blockhash()
    );
    assert_ne!(first.signatures[0], second.signatures[0]);
}

// =============================================================================
// AMOUNT CONVERSION
// =============================================================================

#[test]
fn converts_base_asset_by_lamport_scale() {
    assert_eq!(to_native_units(1.5, 9).unwrap(), 1_500_000_000);
    assert_eq!(to_native_units(0.001, 9).unwrap(), 1_000_000);
}

#[test]
fn converts_token_amount_by_decimals() {
    assert_eq!(to_native_units(2.0, 6).unwrap(), 2_000_000);
    assert_eq!(to_native_units(0.5, 0).unwrap(), 1); // rounds, no decimals
}

#[test]
fn rejects_invalid_amounts() {
    assert!(to_native_units(-1.0, 9).is_err());
    assert!(to_native_units(f64::NAN, 9).is_err());
    assert!(to_native_units(f64::INFINITY, 9).is_err());
}

// =============================================================================
// DIRECT-PATH SETTLEMENT OUTCOME
// =============================================================================

fn status(
    err: Option<TransactionError>,
    confirmation: Option<TransactionConfirmationStatus>,
) -> TransactionStatus {
    TransactionStatus {
        slot: 1000,
        confirmations: None,
        status: match &err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        },
        err,
        confirmation_status: confirmation,
    }
}

#[test]
fn confirmed_execution_error_is_settlement_failure() {
    let err = confirmation_outcome(&status(
        Some(TransactionError::InsufficientFundsForFee),
        Some(TransactionConfirmationStatus::Confirmed),
    ))
    .unwrap_err();
    assert!(matches!(err, SwapError::SettlementFailed(_)));
}

#[test]
fn clean_confirmation_reports_done() {
    let outcome = confirmation_outcome(&status(
        None,
        Some(TransactionConfirmationStatus::Confirmed),
    ))
    .unwrap();
    assert!(outcome);
}

#[test]
fn processed_is_not_yet_confirmed() {
    let outcome = confirmation_outcome(&status(
        None,
        Some(TransactionConfirmationStatus::Processed),
    ))
    .unwrap();
    assert!(!outcome);
}

// =============================================================================
// BUNDLE POLL STATE MACHINE
// =============================================================================

/// Scripted status source: emits the scripted entries in order, repeating
/// the last one once the script runs dry. `Err` entries model transient
/// poll failures.
struct ScriptedSource {
    script: Vec<Result<Vec<BundleStatus>, SwapError>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn of_statuses(statuses: &[&str]) -> Self {
        let script = statuses
            .iter()
            .map(|s| Ok(vec![entry(s)]))
            .collect();
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn entry(status: &str) -> BundleStatus {
    BundleStatus {
        bundle_id: "bundle-1".to_string(),
        status: status.to_string(),
        landed_slot: if status == "Landed" { Some(34567) } else { None },
        error: if status == "Failed" {
            Some("simulation reverted".to_string())
        } else {
            None
        },
    }
}

#[async_trait]
impl BundleStatusSource for ScriptedSource {
    async fn fetch_statuses(&self, _ids: &[String]) -> Result<Vec<BundleStatus>, SwapError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = n.min(self.script.len() - 1);
        self.script[index].clone()
    }
}

#[tokio::test(start_paused = true)]
async fn landed_terminates_after_exactly_three_polls() {
    let source = ScriptedSource::of_statuses(&["Pending", "Processed", "Landed"]);
    let outcome = poll_bundle_status(&source, "bundle-1").await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_eq!(outcome.bundle_id, "bundle-1");
    assert_eq!(outcome.landed_slot, Some(34567));
}

#[tokio::test(start_paused = true)]
async fn failed_terminates_immediately_even_after_pending() {
    let source = ScriptedSource::of_statuses(&["Pending", "Failed", "Landed"]);
    let err = poll_bundle_status(&source, "bundle-1").await.unwrap_err();
    assert_eq!(source.calls(), 2);
    match err {
        SwapError::BundleFailed(msg) => assert!(msg.contains("simulation reverted")),
        other => panic!("expected BundleFailed, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn never_terminal_times_out_at_the_deadline() {
    let source = ScriptedSource::of_statuses(&["Pending"]);
    let err = poll_bundle_status(&source, "bundle-1").await.unwrap_err();

    // 50s window / 500ms interval: the deadline trips on the check after
    // the 100th poll, not before
    assert_eq!(source.calls(), 100);
    assert!(matches!(err, SwapError::BundlePollTimeout { .. }));
    assert!(err.is_indeterminate());
    assert!(err.to_string().contains("indeterminate"));
}

#[tokio::test(start_paused = true)]
async fn unknown_status_is_nonterminal() {
    let source = ScriptedSource::of_statuses(&["Pending", "SomethingNew", "Landed"]);
    let outcome = poll_bundle_status(&source, "bundle-1").await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_eq!(outcome.landed_slot, Some(34567));
}

#[tokio::test(start_paused = true)]
async fn transient_poll_errors_are_retried_until_terminal() {
    let source = ScriptedSource {
        script: vec![
            Err(SwapError::Rpc("connection reset".to_string())),
            Err(SwapError::Rpc("connection reset".to_string())),
            Ok(vec![entry("Landed")]),
        ],
        calls: AtomicUsize::new(0),
    };
    let outcome = poll_bundle_status(&source, "bundle-1").await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_eq!(outcome.landed_slot, Some(34567));
}

#[tokio::test(start_paused = true)]
async fn persistent_poll_errors_surface_as_timeout() {
    let source = ScriptedSource {
        script: vec![Err(SwapError::Rpc("connection reset".to_string()))],
        calls: AtomicUsize::new(0),
    };
    let err = poll_bundle_status(&source, "bundle-1").await.unwrap_err();
    assert!(matches!(err, SwapError::BundlePollTimeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn empty_status_response_keeps_polling() {
    let source = ScriptedSource {
        script: vec![Ok(vec![]), Ok(vec![]), Ok(vec![entry("Landed")])],
        calls: AtomicUsize::new(0),
    };
    let outcome = poll_bundle_status(&source, "bundle-1").await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_eq!(outcome.landed_slot, Some(34567));
}

// =============================================================================
// ERROR NORMALIZATION
// =============================================================================

#[test]
fn insufficient_funds_is_pattern_matched_from_any_component() {
    let err = normalize_error(SwapError::SettlementFailed(
        "transaction failed on-chain: Transfer: insufficient lamports 10, need 20".to_string(),
    ));
    assert!(matches!(err, SwapError::InsufficientFunds(_)));

    let err = normalize_error(SwapError::SettlementFailed(
        "transaction failed on-chain: Insufficient funds for fee".to_string(),
    ));
    assert!(matches!(err, SwapError::InsufficientFunds(_)));
}

#[test]
fn invalid_quote_is_pattern_matched() {
    let err = normalize_error(SwapError::QuoteUnavailable(
        "route service error: invalid quote request".to_string(),
    ));
    assert!(matches!(err, SwapError::InvalidQuote(_)));
}

#[test]
fn typed_pipeline_errors_pass_through() {
    let err = normalize_error(SwapError::BundlePollTimeout { elapsed_secs: 50 });
    assert!(matches!(err, SwapError::BundlePollTimeout { .. }));

    let err = normalize_error(SwapError::QuoteUnavailable("no route".to_string()));
    assert!(matches!(err, SwapError::QuoteUnavailable(_)));
}

#[test]
fn plumbing_errors_collapse_into_catch_all() {
    let err = normalize_error(SwapError::Rpc("socket closed".to_string()));
    match err {
        SwapError::SwapFailed(msg) => assert!(msg.contains("socket closed")),
        other => panic!("expected SwapFailed, got {:?}", other),
    }
}

// =============================================================================
// ENGINE CONTEXT
// =============================================================================

#[test]
fn engine_reports_configured_identity_and_mode() {
    use std::str::FromStr;

    let engine = test_engine(true);
    assert!(engine.jito_enabled());
    assert!(Pubkey::from_str(&engine.wallet_address()).is_ok());

    let engine = test_engine(false);
    assert!(!engine.jito_enabled());
}

#[tokio::test(start_paused = true)]
async fn concurrent_swaps_serialize_on_the_submit_lock() {
    let engine = Arc::new(test_engine(true));
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for (enter, exit) in [("a-in", "a-out"), ("b-in", "b-out")] {
        let engine = Arc::clone(&engine);
        let events = Arc::clone(&events);
        handles.push(tokio::spawn(async move {
            let _guard = engine.submit_guard().await;
            events.lock().unwrap().push(enter);
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            events.lock().unwrap().push(exit);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let events = events.lock().unwrap();
    // whichever task entered first must exit before the other enters
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].trim_end_matches("-in"), events[1].trim_end_matches("-out"));
}
