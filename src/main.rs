use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod session;

fn main() -> ExitCode {
    let cfg = match config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[FATAL] Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[FATAL] Failed to build runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&format!("{e}"));
            ExitCode::FAILURE
        }
    }
}

async fn async_main(cfg: config::Config) -> Result<(), error::ServerError> {
    logger::init(&cfg)?;

    // The session store must be reachable before the listener is bound;
    // a server with a broken store would hand out unsaveable sessions.
    let store = match session::SessionStore::connect_mongo(&cfg.session).await {
        Ok(store) => store,
        Err(e) => {
            logger::log_error(&format!("{e}"));
            logger::log_error("MongoDB connection error. Please make sure MongoDB is running.");
            return Err(e);
        }
    };

    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    let lifecycle = Arc::new(server::Lifecycle::new());
    server::start_signal_handler(Arc::clone(&lifecycle));

    let state = Arc::new(config::AppState::new(cfg, store, lifecycle));
    logger::log_server_start(&addr, &state.config);

    // Connections are served on spawn_local tasks off the accept loop.
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await
}
