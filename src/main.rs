use std::sync::Arc;

mod config;
mod data;
mod error;
mod handler;
mod http;
mod logger;
mod server;

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!("Using {workers} worker threads");
    } else {
        tracing::info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let data_dir = cfg.resolve_data_dir()?;
    if !data_dir.is_dir() {
        tracing::warn!(
            "Data directory {} does not exist yet, listing will fail until it does",
            data_dir.display()
        );
    }

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &data_dir, &cfg);

    let state = Arc::new(config::AppState::new(cfg, data_dir));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            server::shutdown_signal(),
        ))
        .await;

    Ok(())
}
