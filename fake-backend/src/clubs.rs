use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::envelope::Message;
use shared::{Club, ClubId, CreateClubParams};

use crate::{ApiError, ApiResult, AppState};

pub(crate) fn message(text: impl Into<String>) -> Json<Message> {
    Json(Message {
        message: text.into(),
    })
}

#[debug_handler]
pub async fn get_clubs(State(db): State<AppState>) -> Json<Vec<Club>> {
    Json(db.lock().await.clubs.clone())
}

#[debug_handler]
pub async fn create_club(
    State(db): State<AppState>,
    Json(params): Json<CreateClubParams>,
) -> ApiResult<impl IntoResponse> {
    if params.club_name.trim().is_empty() {
        return Err(ApiError::bad_request("Club name is required"));
    }
    let mut db = db.lock().await;
    let club_id = db.next_id();
    db.clubs.push(Club {
        club_id,
        club_name: params.club_name,
        club_description: params.club_description,
        founded_date: params.founded_date,
        contact_email: Some(params.contact_email),
        faculty_advisor: params.faculty_advisor,
    });
    tracing::info!(club_id, "club created");
    Ok((StatusCode::CREATED, message("Club created successfully")))
}

#[debug_handler]
pub async fn delete_club(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    db.forget_club(id);
    Ok(message(format!("Club with ID {id} deleted successfully")))
}
