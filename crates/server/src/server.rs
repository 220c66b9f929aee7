use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{Error, donations, profiles};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn welcome() -> &'static str {
    "Welcome to the Colletta fundraising API!"
}

async fn unknown_route() -> (StatusCode, Json<Error>) {
    (
        StatusCode::NOT_FOUND,
        Json(Error {
            error: "Resource not found. Check the URL and try again.".to_string(),
        }),
    )
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/profiles", get(profiles::list).post(profiles::create))
        .route("/profiles/{profile_id}", get(profiles::get))
        .route(
            "/profiles/{profile_id}/donations",
            get(donations::list_for_profile).post(donations::donate_to_profile),
        )
        .route("/donations", post(donations::donate_to_campaign))
        .fallback(unknown_route)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:8080").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
