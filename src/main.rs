use std::sync::Arc;

use clap::Parser;

mod backend;
mod cli;
mod config;
mod error;
mod filter;
mod handler;
mod http;
mod logger;
mod server;

use crate::backend::LocalBackend;
use crate::server::{ServerStats, SignalHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();
    let cfg = config::Config::load_from(&cli.config, &cli.overrides())?;

    logger::init(&cfg.logging)?;

    // Build the runtime, worker count from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cli, cfg))
}

async fn async_main(cli: cli::Cli, cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let filter = cfg.build_filter(&cli.filters, &cli.filter_files)?;
    let backend = LocalBackend::new(&cfg.backend.root, cfg.backend.follow_symlinks)?;

    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
        e
    })?;

    logger::log_server_start(&addr, &cfg, backend.root(), &filter);

    let state = Arc::new(config::AppState::new(cfg, Arc::new(backend), filter));
    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    let stats = ServerStats::default();
    server::run_server_loop(listener, state, &stats, Arc::clone(&signals.shutdown)).await;
    logger::log_shutdown_complete(signals.is_shutdown_requested());

    Ok(())
}
