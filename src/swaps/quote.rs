/// Jupiter route service client
///
/// Quote acquisition and swap-instruction building. Quotes are amount-
/// and time-sensitive, so nothing here is cached; a stale quote is
/// rejected by the route service at instruction-build time and surfaces
/// as an assembly failure, never as silent repricing.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::swaps::config::{
    JUPITER_DYNAMIC_COMPUTE_UNIT_LIMIT, JUPITER_QUOTE_API, JUPITER_SWAP_INSTRUCTIONS_API,
    QUOTE_TIMEOUT_SECS,
};
use crate::swaps::types::{QuoteResponse, SwapInstructionsResponse};
use reqwest::Client;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SwapInstructionsRequest<'a> {
    #[serde(rename = "quoteResponse")]
    quote_response: &'a serde_json::Value,
    #[serde(rename = "userPublicKey")]
    user_public_key: String,
    #[serde(rename = "dynamicComputeUnitLimit")]
    dynamic_compute_unit_limit: bool,
    #[serde(rename = "prioritizationFeeLamports")]
    prioritization_fee_lamports: u64,
}

/// Shorten a mint for log lines
pub(crate) fn short_mint(mint: &str) -> &str {
    if mint == crate::swaps::config::SOL_MINT {
        "SOL"
    } else if mint.len() >= 8 {
        &mint[..8]
    } else {
        mint
    }
}

pub struct QuoteClient {
    http: Client,
    quote_url: String,
    swap_instructions_url: String,
    priority_fee_lamports: u64,
}

impl QuoteClient {
    pub fn new(priority_fee_lamports: u64) -> Self {
        Self {
            http: Client::new(),
            quote_url: JUPITER_QUOTE_API.to_string(),
            swap_instructions_url: JUPITER_SWAP_INSTRUCTIONS_API.to_string(),
            priority_fee_lamports,
        }
    }

    /// Fetch the best route for the pair and amount
    ///
    /// `amount` must already be in the input asset's native units; this
    /// client performs no unit conversion. Automatic slippage selection
    /// is always on; `max_slippage_bps` caps it when supplied.
    pub async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        max_slippage_bps: Option<u16>,
    ) -> Result<QuoteResponse, SwapError> {
        logger::info(
            LogTag::Quote,
            &format!(
                "requesting quote: {} units {} -> {}",
                amount,
                short_mint(input_mint),
                short_mint(output_mint)
            ),
        );

        let amount_str = amount.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("inputMint", input_mint),
            ("outputMint", output_mint),
            ("amount", amount_str.as_str()),
            ("autoSlippage", "true"),
        ];
        let max_bps_str;
        if let Some(max_bps) = max_slippage_bps {
            max_bps_str = max_bps.to_string();
            params.push(("maxAutoSlippageBps", max_bps_str.as_str()));
        }

        let response = self
            .http
            .get(&self.quote_url)
            .query(&params)
            .timeout(Duration::from_secs(QUOTE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| SwapError::QuoteUnavailable(format!("quote request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::QuoteUnavailable(format!(
                "quote service returned HTTP {}: {}",
                status, body
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SwapError::QuoteUnavailable(format!("malformed quote response: {}", e)))?;

        if let Some(error) = raw.get("error") {
            return Err(SwapError::QuoteUnavailable(format!(
                "route service error: {}",
                error
            )));
        }
        if raw.get("outAmount").is_none() {
            return Err(SwapError::QuoteUnavailable(
                "no route available for pair".to_string(),
            ));
        }

        let quote = QuoteResponse { raw };
        logger::debug(
            LogTag::Quote,
            &format!(
                "quote received: in={} out={} impact={}%",
                quote.in_amount().unwrap_or("?"),
                quote.out_amount().unwrap_or("?"),
                quote.price_impact_pct().unwrap_or("?")
            ),
        );
        Ok(quote)
    }

    /// Turn a quote into serialized swap instructions for the signer
    ///
    /// The quote is forwarded verbatim; the route service rejects it when
    /// stale, which aborts the request rather than repricing silently.
    pub async fn get_swap_instructions(
        &self,
        quote: &QuoteResponse,
        signer: &Pubkey,
    ) -> Result<SwapInstructionsResponse, SwapError> {
        let request = SwapInstructionsRequest {
            quote_response: &quote.raw,
            user_public_key: signer.to_string(),
            dynamic_compute_unit_limit: JUPITER_DYNAMIC_COMPUTE_UNIT_LIMIT,
            prioritization_fee_lamports: self.priority_fee_lamports,
        };

        let response = self
            .http
            .post(&self.swap_instructions_url)
            .json(&request)
            .timeout(Duration::from_secs(QUOTE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                SwapError::InstructionDecode(format!("instruction build request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::InstructionDecode(format!(
                "instruction build returned HTTP {}: {}",
                status, body
            )));
        }

        response.json::<SwapInstructionsResponse>().await.map_err(|e| {
            SwapError::InstructionDecode(format!("malformed instruction response: {}", e))
        })
    }
}
