/// Runtime configuration loaded from configs.json
///
/// Everything that differs between deployments lives here; compile-time
/// pipeline constants stay in `swaps::config`. The file is read once at
/// startup and handed to the components that need it - nothing re-reads
/// it at request time.
use crate::errors::SwapError;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fs;
use std::path::Path;
use std::str::FromStr;

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_block_engine_url() -> String {
    "https://mainnet.block-engine.jito.wtf".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tip_sol() -> f64 {
    0.0005
}

fn default_fee_percentage() -> f64 {
    0.01
}

fn default_priority_fee_lamports() -> u64 {
    500_000
}

fn default_swap_sol() -> f64 {
    0.001
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configs {
    /// Signing wallet private key, base58 string or JSON byte array form
    pub main_wallet_private: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Route settlement through the Jito block engine instead of plain RPC
    #[serde(default = "default_true")]
    pub jito_enabled: bool,
    #[serde(default = "default_block_engine_url")]
    pub jito_block_engine_url: String,
    /// Priority tip per bundle, in SOL
    #[serde(default = "default_tip_sol")]
    pub jito_tip_sol: f64,
    /// Run simulateBundle before sendBundle
    #[serde(default)]
    pub jito_simulate: bool,

    /// Protocol fee destination wallet
    pub fee_address: String,
    /// Fee fraction of the parsed input amount (0.01 = 1%)
    #[serde(default = "default_fee_percentage")]
    pub fee_percentage: f64,

    /// Priority fee passed to the route service, in lamports
    #[serde(default = "default_priority_fee_lamports")]
    pub priority_fee_lamports: u64,

    /// SOL spent per webhook trade when the payload omits an amount
    #[serde(default = "default_swap_sol")]
    pub default_swap_sol: f64,

    /// Static key callers must present in the X-API-Key header
    pub webhook_api_key: String,
    #[serde(default = "default_host")]
    pub webserver_host: String,
    #[serde(default = "default_port")]
    pub webserver_port: u16,
}

/// Read and validate the config file
pub fn read_configs<P: AsRef<Path>>(path: P) -> Result<Configs, SwapError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .map_err(|e| SwapError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let configs: Configs = serde_json::from_str(&data)
        .map_err(|e| SwapError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
    validate(&configs)?;
    Ok(configs)
}

fn validate(configs: &Configs) -> Result<(), SwapError> {
    if configs.main_wallet_private.is_empty() {
        return Err(SwapError::Config(
            "main_wallet_private is required".to_string(),
        ));
    }
    if configs.webhook_api_key.is_empty() {
        return Err(SwapError::Config("webhook_api_key is required".to_string()));
    }
    Pubkey::from_str(&configs.fee_address)
        .map_err(|e| SwapError::Config(format!("invalid fee_address: {}", e)))?;
    if !(0.0..1.0).contains(&configs.fee_percentage) {
        return Err(SwapError::Config(
            "fee_percentage must be in [0, 1)".to_string(),
        ));
    }
    if configs.jito_tip_sol < 0.0 || !configs.jito_tip_sol.is_finite() {
        return Err(SwapError::Config(
            "jito_tip_sol must be a non-negative number".to_string(),
        ));
    }
    if configs.default_swap_sol <= 0.0 || !configs.default_swap_sol.is_finite() {
        return Err(SwapError::Config(
            "default_swap_sol must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_json() -> serde_json::Value {
        serde_json::json!({
            "main_wallet_private": "3j5Y8YyoYxE3kC1s2V5p9rN4u7QwW8eT1a2b3c4d5e6f7g8h9iAkBmCnDoEpFqGrHsItJuKvLwMxNyOzP1Q2R3S4",
            "fee_address": "11111111111111111111111111111111",
            "webhook_api_key": "secret"
        })
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let configs: Configs = serde_json::from_value(base_json()).unwrap();
        validate(&configs).unwrap();
        assert_eq!(configs.rpc_url, default_rpc_url());
        assert!(configs.jito_enabled);
        assert_eq!(configs.jito_tip_sol, 0.0005);
        assert_eq!(configs.fee_percentage, 0.01);
        assert_eq!(configs.priority_fee_lamports, 500_000);
        assert_eq!(configs.webserver_port, 8080);
        assert!(!configs.jito_simulate);
    }

    #[test]
    fn rejects_bad_fee_address() {
        let mut json = base_json();
        json["fee_address"] = serde_json::json!("not-a-pubkey");
        let configs: Configs = serde_json::from_value(json).unwrap();
        assert!(matches!(validate(&configs), Err(SwapError::Config(_))));
    }

    #[test]
    fn rejects_fee_percentage_out_of_range() {
        let mut json = base_json();
        json["fee_percentage"] = serde_json::json!(1.5);
        let configs: Configs = serde_json::from_value(json).unwrap();
        assert!(matches!(validate(&configs), Err(SwapError::Config(_))));
    }

    #[test]
    fn rejects_missing_api_key() {
        let mut json = base_json();
        json["webhook_api_key"] = serde_json::json!("");
        let configs: Configs = serde_json::from_value(json).unwrap();
        assert!(matches!(validate(&configs), Err(SwapError::Config(_))));
    }
}
