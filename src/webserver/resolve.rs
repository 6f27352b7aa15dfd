/// Token address resolution by symbol
///
/// Webhook payloads may name a token without its address; the DexScreener
/// search API fills the gap. Plumbing only - the swap pipeline itself
/// always works with resolved addresses.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use serde::Deserialize;
use std::time::Duration;

const DEXSCREENER_SEARCH_API: &str = "https://api.dexscreener.com/latest/dex/search";
const RESOLVE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Vec<Pair>,
}

#[derive(Debug, Deserialize)]
struct Pair {
    #[serde(rename = "chainId")]
    chain_id: String,
    #[serde(rename = "baseToken")]
    base_token: BaseToken,
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    address: String,
    symbol: Option<String>,
}

/// Normalize a webhook chain name to a DexScreener chain id
fn chain_id_for(chain: &str) -> &str {
    match chain.to_lowercase().as_str() {
        "eth" | "ethereum" => "ethereum",
        "bsc" => "bsc",
        other => {
            if other == "solana" {
                "solana"
            } else {
                "unknown"
            }
        }
    }
}

/// Find the token address for a symbol on the given chain
pub async fn resolve_address_by_symbol(
    http: &reqwest::Client,
    name: &str,
    chain: &str,
) -> Result<String, SwapError> {
    let response = http
        .get(DEXSCREENER_SEARCH_API)
        .query(&[("q", name)])
        .timeout(Duration::from_secs(RESOLVE_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| SwapError::SwapFailed(format!("token search failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(SwapError::SwapFailed(format!(
            "token search returned HTTP {}",
            response.status()
        )));
    }

    let search: SearchResponse = response
        .json()
        .await
        .map_err(|e| SwapError::SwapFailed(format!("malformed token search response: {}", e)))?;

    let target = chain_id_for(chain);
    let matched = search
        .pairs
        .iter()
        .find(|pair| pair.chain_id.eq_ignore_ascii_case(target))
        .ok_or_else(|| {
            SwapError::SwapFailed(format!("no pairs found for {} on chain {}", name, chain))
        })?;

    logger::info(
        LogTag::Webserver,
        &format!(
            "resolved {} -> {} ({})",
            name,
            matched.base_token.address,
            matched.base_token.symbol.as_deref().unwrap_or("?")
        ),
    );
    Ok(matched.base_token.address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_names_normalize() {
        assert_eq!(chain_id_for("SOLANA"), "solana");
        assert_eq!(chain_id_for("eth"), "ethereum");
        assert_eq!(chain_id_for("Ethereum"), "ethereum");
        assert_eq!(chain_id_for("bsc"), "bsc");
        assert_eq!(chain_id_for("tron"), "unknown");
    }

    #[test]
    fn search_response_tolerates_missing_pairs() {
        let parsed: SearchResponse = serde_json::from_str("{\"schemaVersion\":\"1.0.0\"}").unwrap();
        assert!(parsed.pairs.is_empty());
    }
}
