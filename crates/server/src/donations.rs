//! Donations API endpoints

use api_types::donation::{DonationCreated, DonationNew, DonationView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::DonationCmd;
use uuid::Uuid;

use crate::{ServerError, profiles::map_currency, server::ServerState};

fn view(donation: engine::Donation) -> DonationView {
    DonationView {
        id: donation.id,
        donor_name: donation.donor_name,
        amount_minor: donation.amount_minor,
        currency: map_currency(donation.currency),
        profile_id: donation.profile_id,
        created_at: donation.created_at,
    }
}

pub async fn list_for_profile(
    State(state): State<ServerState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Vec<DonationView>>, ServerError> {
    let donations = state.engine.donations_for_profile(profile_id).await?;
    Ok(Json(donations.into_iter().map(view).collect()))
}

pub async fn donate_to_profile(
    State(state): State<ServerState>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<DonationNew>,
) -> Result<(StatusCode, Json<DonationCreated>), ServerError> {
    let id = state
        .engine
        .process_donation(DonationCmd {
            donor_name: payload.donor_name,
            amount_minor: payload.amount_minor,
            currency: payload.currency,
            profile_id: Some(profile_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DonationCreated { id })))
}

/// Donation without a profile id in the path goes to the campaign profile.
pub async fn donate_to_campaign(
    State(state): State<ServerState>,
    Json(payload): Json<DonationNew>,
) -> Result<(StatusCode, Json<DonationCreated>), ServerError> {
    let id = state
        .engine
        .process_donation(DonationCmd {
            donor_name: payload.donor_name,
            amount_minor: payload.amount_minor,
            currency: payload.currency,
            profile_id: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DonationCreated { id })))
}
