use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::envelope::SponsorList;
use shared::{ClubId, CreateSponsorshipParams, SponsorSearch, Sponsorship, SponsorshipId};

use crate::clubs::message;
use crate::{contains_text, within, ApiError, ApiResult, AppState};

fn matches(row: &Sponsorship, search: &SponsorSearch) -> bool {
    contains_text(Some(&row.sponsor_name), search.sponsor_name.as_deref())
        && contains_text(row.contact_person.as_deref(), search.contact_person.as_deref())
        && contains_text(row.contact_email.as_deref(), search.contact_email.as_deref())
        && within(row.contribution_date, search.from_date, search.to_date)
}

#[debug_handler]
pub async fn get_sponsors(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<SponsorList>> {
    let db = db.lock().await;
    db.club(id)?;
    Ok(Json(SponsorList {
        sponsors: db.sponsors.get(&id).cloned().unwrap_or_default(),
    }))
}

#[debug_handler]
pub async fn search_sponsors(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Query(search): Query<SponsorSearch>,
) -> ApiResult<Json<SponsorList>> {
    let db = db.lock().await;
    db.club(id)?;
    let sponsors = db
        .sponsors
        .get(&id)
        .into_iter()
        .flatten()
        .filter(|row| matches(row, &search))
        .cloned()
        .collect();
    Ok(Json(SponsorList { sponsors }))
}

/// A contribution from a sponsor already known to the club reuses its
/// sponsor id.
#[debug_handler]
pub async fn add_sponsorship(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<CreateSponsorshipParams>,
) -> ApiResult<impl IntoResponse> {
    if params.sponsor_name.trim().is_empty() {
        return Err(ApiError::bad_request("Sponsor name is required"));
    }
    if !(params.contribution_amount > 0.0) {
        return Err(ApiError::bad_request("Contribution amount must be positive"));
    }
    let mut db = db.lock().await;
    db.club(id)?;
    let known = db
        .sponsors
        .values()
        .flatten()
        .find(|row| row.sponsor_name.eq_ignore_ascii_case(params.sponsor_name.trim()))
        .map(|row| row.sponsor_id);
    let sponsor_id = match known {
        Some(sponsor_id) => sponsor_id,
        None => db.next_id(),
    };
    let sponsorship_id = db.next_id();
    db.sponsors.entry(id).or_default().push(Sponsorship {
        sponsor_id,
        sponsor_name: params.sponsor_name.trim().to_string(),
        contact_person: params.contact_person,
        contact_email: params.contact_email,
        phone_number: params.phone_number,
        address: params.address,
        sponsorship_id,
        contribution_amount: params.contribution_amount,
        contribution_date: params.contribution_date,
    });
    Ok((StatusCode::CREATED, message("Sponsor contribution added successfully")))
}

#[debug_handler]
pub async fn remove_sponsorship(
    State(db): State<AppState>,
    Path((id, sponsorship_id)): Path<(ClubId, SponsorshipId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    let rows = db.sponsors.entry(id).or_default();
    let before = rows.len();
    rows.retain(|row| row.sponsorship_id != sponsorship_id);
    if rows.len() == before {
        return Err(ApiError::not_found("Sponsorship"));
    }
    Ok(message("Sponsorship contribution deleted successfully"))
}
