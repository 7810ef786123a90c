//! Binary entrypoint for the MoMa HTTP server.
//!
//! Configuration comes from environment variables; see
//! [`moma_server::config`].

use moma_server::config::ServerConfig;
use moma_server::router::build_router;
use moma_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("invalid server configuration");
    let state = AppState::new(&config).expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = config.addr();
    tracing::info!(
        db = %config.db_path,
        strict = config.strict_schema,
        "MoMa server starting on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
