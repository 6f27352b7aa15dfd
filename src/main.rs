use anyhow::Context;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use swapbot::logger::{self, LogTag};
use swapbot::rpc::{lamports_to_sol, RpcHandle};
use swapbot::swaps::SwapEngine;
use swapbot::webserver::{self, AppState};
use swapbot::{arguments, configs, wallet};

/// Main entry point for swapbot
///
/// Wires the long-lived context once - config, signing identity, RPC
/// handle, swap engine - then hands it to the webserver. Components never
/// reach into ambient state; everything flows from here.
#[tokio::main]
async fn main() {
    logger::init();

    if arguments::is_help_requested() {
        arguments::print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "swapbot starting up");

    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("fatal: {:#}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::flush();
}

async fn run() -> anyhow::Result<()> {
    let config_path = arguments::config_path();
    let configs = configs::read_configs(&config_path)
        .with_context(|| format!("loading {}", config_path))?;
    logger::info(
        LogTag::Config,
        &format!(
            "config loaded from {} (jito: {}, fee: {}%)",
            config_path,
            configs.jito_enabled,
            configs.fee_percentage * 100.0
        ),
    );

    let keypair = Arc::new(wallet::load_keypair(&configs).context("loading wallet keypair")?);
    logger::info(
        LogTag::Wallet,
        &format!("wallet loaded: {}", keypair.pubkey()),
    );

    let rpc = Arc::new(RpcHandle::new(&configs.rpc_url));
    rpc.get_health().await.context("RPC health check")?;

    match rpc.get_balance(&keypair.pubkey()).await {
        Ok(lamports) => {
            let sol = lamports_to_sol(lamports);
            logger::info(LogTag::Wallet, &format!("SOL balance: {:.6}", sol));
            if sol < 0.01 {
                logger::warning(
                    LogTag::Wallet,
                    "low SOL balance, swaps may fail to cover fees",
                );
            }
        }
        Err(e) => logger::warning(LogTag::Wallet, &format!("balance check failed: {}", e)),
    }

    let engine = Arc::new(
        SwapEngine::new(&configs, Arc::clone(&rpc), Arc::clone(&keypair))
            .context("building swap engine")?,
    );
    logger::info(
        LogTag::System,
        &format!(
            "settlement path: {}",
            if engine.jito_enabled() {
                "relay (bundle submit + poll)"
            } else {
                "direct (broadcast + confirm)"
            }
        ),
    );

    let state = Arc::new(AppState::new(
        engine,
        configs.webhook_api_key.clone(),
        configs.default_swap_sol,
    ));

    ctrlc::set_handler(|| {
        webserver::shutdown();
    })
    .context("installing shutdown handler")?;

    webserver::start_server(state, &configs.webserver_host, configs.webserver_port)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    logger::info(LogTag::System, "swapbot stopped");
    Ok(())
}
