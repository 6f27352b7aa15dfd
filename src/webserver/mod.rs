/// Webhook intake webserver
///
/// Thin request plumbing in front of the swap pipeline: authentication,
/// payload validation, token address resolution, and response shaping.
pub mod resolve;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{shutdown, start_server};
pub use state::AppState;
