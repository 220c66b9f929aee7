//! Profiles API endpoints

use api_types::profile::{ProfileNew, ProfileView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Aud => api_types::Currency::Aud,
    }
}

fn view(profile: engine::Profile) -> ProfileView {
    ProfileView {
        id: profile.id,
        name: profile.name,
        currency: map_currency(profile.currency),
        parent_id: profile.parent_id,
        total_minor: profile.total,
    }
}

pub async fn list(State(state): State<ServerState>) -> Json<Vec<ProfileView>> {
    let profiles = state.engine.profiles().await;
    Json(profiles.into_iter().map(view).collect())
}

pub async fn get(
    State(state): State<ServerState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state.engine.profile(profile_id).await?;
    Ok(Json(view(profile)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProfileNew>,
) -> Result<(StatusCode, Json<ProfileView>), ServerError> {
    let profile = state
        .engine
        .create_profile(&payload.name, &payload.currency, payload.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(view(profile))))
}
