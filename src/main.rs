use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use community_web::config::{AppState, Config};
use community_web::logger;
use community_web::server::{
    create_reusable_listener, start_server_loop, start_signal_handler, SignalHandler,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_from("config")?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));
    let signals = Arc::new(SignalHandler::new());

    start_signal_handler(Arc::clone(&signals));
    start_server_loop(listener, state, active_connections, signals).await?;
    Ok(())
}
