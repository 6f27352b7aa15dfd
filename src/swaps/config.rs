/// Swap pipeline configuration - hardcoded parameters
///
/// Deployment-specific values (keys, URLs that vary, fee wallet) live in
/// configs.json; everything here is a fixed property of the pipeline.

// =============================================================================
// COMMON CONFIGURATION
// =============================================================================

/// SOL token mint address
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Quote request timeout (seconds)
pub const QUOTE_TIMEOUT_SECS: u64 = 15;

/// API request timeout (seconds) for non-quote calls
pub const API_TIMEOUT_SECS: u64 = 30;

/// RPC transport timeout (seconds)
pub const RPC_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// JUPITER ROUTE SERVICE
// =============================================================================

/// Jupiter quote API URL
pub const JUPITER_QUOTE_API: &str = "https://lite-api.jup.ag/swap/v1/quote";

/// Jupiter swap-instructions API URL
pub const JUPITER_SWAP_INSTRUCTIONS_API: &str = "https://lite-api.jup.ag/swap/v1/swap-instructions";

/// Ask the route service to size the compute unit limit dynamically
pub const JUPITER_DYNAMIC_COMPUTE_UNIT_LIMIT: bool = true;

// =============================================================================
// DIRECT SETTLEMENT
// =============================================================================

/// Submission retries performed by the RPC transport on broadcast
pub const BROADCAST_MAX_RETRIES: usize = 3;

/// Confirmation wait timeout (seconds) after broadcast
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 45;

/// Delay between confirmation status checks (milliseconds)
pub const CONFIRMATION_POLL_INTERVAL_MS: u64 = 1000;

// =============================================================================
// RELAY SETTLEMENT
// =============================================================================

/// Bundle status poll interval (milliseconds)
pub const BUNDLE_POLL_INTERVAL_MS: u64 = 500;

/// Total bundle poll window from submission (seconds)
pub const BUNDLE_POLL_TIMEOUT_SECS: u64 = 50;

/// Relay bundle endpoint path under the block engine base URL
pub const JITO_BUNDLES_PATH: &str = "/api/v1/bundles";
