/// HTTP routes: health probe and the trade webhook
///
/// The webhook authenticates with a static key, resolves token addresses
/// when only a symbol is given, and hands validated swap parameters to
/// the orchestrator. Only Solana executes; EVM chains are recognized and
/// rejected explicitly.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::config::SOL_MINT;
use crate::swaps::types::{SwapRequest, SwapResult};
use crate::webserver::resolve::resolve_address_by_symbol;
use crate::webserver::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const API_KEY_HEADER: &str = "x-api-key";

/// EVM chains the webhook recognizes but does not execute
const EVM_CHAINS: &[&str] = &[
    "ethereum", "eth", "bsc", "base", "arbitrum", "polygon", "optimism", "avalanche",
];

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub tokens: Vec<WebhookToken>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookToken {
    pub address: Option<String>,
    pub chain: Option<String>,
    pub name: Option<String>,
    /// Input asset to spend; SOL when absent
    #[serde(rename = "inputMint")]
    pub input_mint: Option<String>,
    /// Human-denominated amount of the input asset; config default when absent
    pub amount: Option<f64>,
    #[serde(rename = "maxSlippageBps")]
    pub max_slippage_bps: Option<u16>,
}

#[derive(Debug, Serialize)]
struct SwapResponse {
    status: &'static str,
    result: SwapResult,
    time: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn root() -> &'static str {
    "swapbot is running"
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn swap_error_response(error: &SwapError) -> Response {
    let status = match error {
        SwapError::InsufficientFunds(_)
        | SwapError::InvalidQuote(_)
        | SwapError::AmountConversion(_) => StatusCode::BAD_REQUEST,
        SwapError::BundlePollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SwapError::SwapFailed(_) | SwapError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(json!({
            "status": "error",
            "code": error.code(),
            "message": error.to_string(),
            "indeterminate": error.is_indeterminate(),
        })),
    )
        .into_response()
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented != state.webhook_api_key {
        logger::warning(LogTag::Webserver, "webhook rejected: bad API key");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    for token in &payload.tokens {
        let chain = match token.chain.as_deref() {
            Some(chain) if !chain.is_empty() => chain,
            _ => return error_response(StatusCode::BAD_REQUEST, "Chain is required"),
        };

        let address = match &token.address {
            Some(address) if !address.is_empty() => address.clone(),
            _ => {
                let name = match token.name.as_deref() {
                    Some(name) if !name.is_empty() => name,
                    _ => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            "Token address or name is required",
                        )
                    }
                };
                match resolve_address_by_symbol(&state.http, name, chain).await {
                    Ok(address) => address,
                    Err(e) => return swap_error_response(&e),
                }
            }
        };

        if chain.eq_ignore_ascii_case("solana") {
            let request = SwapRequest {
                input_mint: token
                    .input_mint
                    .clone()
                    .unwrap_or_else(|| SOL_MINT.to_string()),
                output_mint: address,
                amount: token.amount.unwrap_or(state.default_swap_sol),
                max_slippage_bps: token.max_slippage_bps,
            };

            return match state.engine.swap(&request).await {
                Ok(result) => Json(SwapResponse {
                    status: "success",
                    result,
                    time: chrono::Utc::now().to_rfc3339(),
                })
                .into_response(),
                Err(e) => swap_error_response(&e),
            };
        }

        if EVM_CHAINS.iter().any(|c| chain.eq_ignore_ascii_case(c)) {
            return error_response(
                StatusCode::BAD_REQUEST,
                "EVM execution is not supported by this service",
            );
        }

        return error_response(StatusCode::BAD_REQUEST, "Invalid chain");
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": format!("Processed {} tokens", payload.tokens.len()),
            "time": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_payload_parses_with_optional_fields() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "tokens": [
                {"chain": "solana", "name": "BONK"},
                {"chain": "solana", "address": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
                 "amount": 0.25, "maxSlippageBps": 300}
            ]
        }))
        .unwrap();
        assert_eq!(payload.tokens.len(), 2);
        assert_eq!(payload.tokens[0].name.as_deref(), Some("BONK"));
        assert!(payload.tokens[0].address.is_none());
        assert_eq!(payload.tokens[1].amount, Some(0.25));
        assert_eq!(payload.tokens[1].max_slippage_bps, Some(300));
    }

    #[test]
    fn evm_chains_are_recognized() {
        assert!(EVM_CHAINS.iter().any(|c| "Ethereum".eq_ignore_ascii_case(c)));
        assert!(EVM_CHAINS.iter().any(|c| "bsc".eq_ignore_ascii_case(c)));
        assert!(!EVM_CHAINS.iter().any(|c| "solana".eq_ignore_ascii_case(c)));
    }
}
