use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod donations;
mod profiles;
mod server;

pub mod types {
    pub mod profile {
        pub use api_types::profile::{ProfileNew, ProfileView};
    }

    pub mod donation {
        pub use api_types::donation::{DonationCreated, DonationNew, DonationView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
pub(crate) struct Error {
    pub(crate) error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ChargeDeclined => StatusCode::PAYMENT_REQUIRED,
        EngineError::Inconsistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::UnknownCurrency(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Inconsistency(detail) => {
            tracing::error!("transaction state inconsistent: {detail}");
            "transaction state inconsistent".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
