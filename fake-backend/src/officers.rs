use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::envelope::{OfficerList, RoleList};
use shared::{ClubId, CreateOfficerParams, Officer, RoleId, StudentId};

use crate::clubs::message;
use crate::{ApiError, ApiResult, AppState};

#[debug_handler]
pub async fn get_roles(State(db): State<AppState>) -> Json<RoleList> {
    Json(RoleList {
        roles: db.lock().await.roles.clone(),
    })
}

#[debug_handler]
pub async fn get_officers(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<OfficerList>> {
    let db = db.lock().await;
    db.club(id)?;
    Ok(Json(OfficerList {
        officers: db.officers.get(&id).cloned().unwrap_or_default(),
    }))
}

/// Officers are members holding a role; one student may hold several.
#[debug_handler]
pub async fn add_officer(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<CreateOfficerParams>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    let member = db
        .members
        .get(&id)
        .into_iter()
        .flatten()
        .find(|m| m.student_id == params.student_id)
        .cloned()
        .ok_or_else(|| ApiError::bad_request("Student is not a member of this club"))?;
    let role = db
        .roles
        .iter()
        .find(|r| r.role_id == params.role_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Role"))?;

    let officers = db.officers.entry(id).or_default();
    if officers.iter().any(|o| o.key() == params) {
        return Err(ApiError::bad_request("Student already holds this role"));
    }
    officers.push(Officer {
        student_id: member.student_id,
        first_name: member.first_name,
        last_name: member.last_name,
        email: Some(member.email),
        phone_number: member.phone_number,
        role_id: role.role_id,
        role_name: role.role_name,
        role_description: role.role_description,
    });
    Ok((StatusCode::CREATED, message("Officer added successfully")))
}

#[debug_handler]
pub async fn remove_officer(
    State(db): State<AppState>,
    Path((id, student_id, role_id)): Path<(ClubId, StudentId, RoleId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    let officers = db.officers.entry(id).or_default();
    let before = officers.len();
    officers.retain(|o| !(o.student_id == student_id && o.role_id == role_id));
    if officers.len() == before {
        return Err(ApiError::not_found("Officer"));
    }
    Ok(message("Officer removed successfully"))
}
