/// Shared state handed to every request handler
use crate::swaps::SwapEngine;
use std::sync::Arc;

pub struct AppState {
    pub engine: Arc<SwapEngine>,
    /// Static key webhook callers must present in X-API-Key
    pub webhook_api_key: String,
    /// SOL spent per trade when the payload omits an amount
    pub default_swap_sol: f64,
    /// Shared client for auxiliary lookups (token address resolution)
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(engine: Arc<SwapEngine>, webhook_api_key: String, default_swap_sol: f64) -> Self {
        Self {
            engine,
            webhook_api_key,
            default_swap_sol,
            http: reqwest::Client::new(),
        }
    }
}
