/// Shared data structures for the swap pipeline
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::Instruction;

/// One webhook-initiated swap. Immutable input to a single orchestration
/// run; amounts are human-denominated and converted by the orchestrator.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Human-denominated amount of the input asset
    pub amount: f64,
    /// Optional upper bound for automatic slippage selection, basis points
    pub max_slippage_bps: Option<u16>,
}

/// Outcome of a settled swap returned to the webhook caller
#[derive(Debug, Clone, Serialize)]
pub struct SwapResult {
    /// Direct path: the confirmed transaction signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Relay path: the bundle id and where it landed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landed_slot: Option<u64>,
    /// The quote the swap executed against, verbatim
    pub quote: QuoteResponse,
    /// Public identity of the executing wallet
    pub wallet_address: String,
}

/// Raw route-service quote. The payload is deliberately opaque: it is
/// passed back to the route service unmodified when requesting swap
/// instructions, so no field is ever rewritten. Typed accessors exist
/// only for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteResponse {
    pub raw: serde_json::Value,
}

impl QuoteResponse {
    pub fn out_amount(&self) -> Option<&str> {
        self.raw.get("outAmount").and_then(|v| v.as_str())
    }

    pub fn in_amount(&self) -> Option<&str> {
        self.raw.get("inAmount").and_then(|v| v.as_str())
    }

    pub fn price_impact_pct(&self) -> Option<&str> {
        self.raw.get("priceImpactPct").and_then(|v| v.as_str())
    }
}

/// Account reference inside a serialized instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAccountMeta {
    pub pubkey: String,
    #[serde(rename = "isSigner")]
    pub is_signer: bool,
    #[serde(rename = "isWritable")]
    pub is_writable: bool,
}

/// Instruction as serialized by the route service: target program,
/// account roles, base64 payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInstruction {
    #[serde(rename = "programId")]
    pub program_id: String,
    pub accounts: Vec<RawAccountMeta>,
    pub data: String,
}

/// swap-instructions response from the route service
#[derive(Debug, Clone, Deserialize)]
pub struct SwapInstructionsResponse {
    #[serde(rename = "computeBudgetInstructions", default)]
    pub compute_budget_instructions: Vec<RawInstruction>,
    #[serde(rename = "setupInstructions", default)]
    pub setup_instructions: Vec<RawInstruction>,
    #[serde(rename = "swapInstruction")]
    pub swap_instruction: Option<RawInstruction>,
    #[serde(rename = "cleanupInstruction")]
    pub cleanup_instruction: Option<RawInstruction>,
    #[serde(rename = "addressLookupTableAddresses", default)]
    pub address_lookup_table_addresses: Vec<String>,
}

/// Decoded, chain-native instruction set in execution order
#[derive(Debug, Clone)]
pub struct InstructionSet {
    pub compute_budget: Vec<Instruction>,
    pub setup: Vec<Instruction>,
    pub swap: Instruction,
    pub cleanup: Option<Instruction>,
    pub lookup_table_addresses: Vec<String>,
}

/// One entry from the relay's inflight bundle status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleStatus {
    pub bundle_id: String,
    pub status: String,
    #[serde(default)]
    pub landed_slot: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Terminal success of the relay path
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    pub bundle_id: String,
    pub landed_slot: Option<u64>,
}
