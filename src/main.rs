use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod render;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Worker thread count from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &cfg, state.router.redirects());

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::start_server_loop(
        listener,
        state,
        active_connections,
        Arc::clone(&signals.shutdown),
    )
    .await;

    logger::log_info("Server stopped");
    Ok(())
}
