/// Error types for the swap execution pipeline
///
/// Every component failure is wrapped into one of these variants and
/// re-raised to the orchestrator, which normalizes the message before it
/// reaches the webhook caller. Nothing is silently swallowed except
/// transient bundle-poll errors, which are retried until the poll deadline.

#[derive(Debug, Clone)]
pub enum SwapError {
    /// Route service returned no route, was unreachable, or sent garbage
    QuoteUnavailable(String),
    /// Serialized instruction could not be decoded into a native instruction
    InstructionDecode(String),
    /// Transaction could not be assembled, resolved, or signed
    TransactionComposition(String),
    /// Human amount could not be converted to native units
    AmountConversion(String),
    /// Direct-path settlement: broadcast failed or confirmation carried an
    /// on-chain execution error
    SettlementFailed(String),
    /// Relay reported the bundle as Failed
    BundleFailed(String),
    /// Relay never reported a terminal status inside the poll window; the
    /// bundle's on-chain fate is unknown
    BundlePollTimeout { elapsed_secs: u64 },
    /// Wallet cannot cover the swap, fee, or tip
    InsufficientFunds(String),
    /// Route service accepted the request but the quote was unusable
    InvalidQuote(String),
    /// Startup configuration problem
    Config(String),
    /// RPC transport problem outside settlement
    Rpc(String),
    /// Catch-all for anything the taxonomy does not name
    SwapFailed(String),
}

impl std::fmt::Display for SwapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapError::QuoteUnavailable(msg) => write!(f, "Quote unavailable: {}", msg),
            SwapError::InstructionDecode(msg) => write!(f, "Instruction decode error: {}", msg),
            SwapError::TransactionComposition(msg) => {
                write!(f, "Transaction composition error: {}", msg)
            }
            SwapError::AmountConversion(msg) => write!(f, "Amount conversion error: {}", msg),
            SwapError::SettlementFailed(msg) => write!(f, "Settlement failed: {}", msg),
            SwapError::BundleFailed(msg) => write!(f, "Bundle failed: {}", msg),
            SwapError::BundlePollTimeout { elapsed_secs } => {
                write!(
                    f,
                    "Bundle polling timed out after {}s without a terminal status; \
                     bundle outcome is indeterminate - verify the wallet on-chain \
                     before retrying",
                    elapsed_secs
                )
            }
            SwapError::InsufficientFunds(msg) => write!(f, "Insufficient funds: {}", msg),
            SwapError::InvalidQuote(msg) => write!(f, "Invalid swap quote: {}", msg),
            SwapError::Config(msg) => write!(f, "Config error: {}", msg),
            SwapError::Rpc(msg) => write!(f, "RPC error: {}", msg),
            SwapError::SwapFailed(msg) => write!(f, "Swap failed: {}", msg),
        }
    }
}

impl std::error::Error for SwapError {}

impl SwapError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            SwapError::QuoteUnavailable(_) => "QUOTE_UNAVAILABLE",
            SwapError::InstructionDecode(_) => "INSTRUCTION_DECODE_ERROR",
            SwapError::TransactionComposition(_) => "TRANSACTION_COMPOSITION_ERROR",
            SwapError::AmountConversion(_) => "AMOUNT_CONVERSION_ERROR",
            SwapError::SettlementFailed(_) => "SETTLEMENT_FAILED",
            SwapError::BundleFailed(_) => "BUNDLE_FAILED",
            SwapError::BundlePollTimeout { .. } => "BUNDLE_POLL_TIMEOUT",
            SwapError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            SwapError::InvalidQuote(_) => "INVALID_QUOTE",
            SwapError::Config(_) => "CONFIG_ERROR",
            SwapError::Rpc(_) => "RPC_ERROR",
            SwapError::SwapFailed(_) => "SWAP_FAILED",
        }
    }

    /// Whether the caller must treat the swap outcome as unknown rather
    /// than failed (relay-mode ambiguity)
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, SwapError::BundlePollTimeout { .. })
    }
}
