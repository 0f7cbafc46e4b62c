use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::envelope::MemberList;
use shared::{ClubId, CreateMemberParams, Member, MemberSearch, StudentId};

use crate::clubs::message;
use crate::{contains_text, ApiError, ApiResult, AppState};

fn matches(member: &Member, search: &MemberSearch) -> bool {
    contains_text(Some(&member.first_name), search.first_name.as_deref())
        && contains_text(Some(&member.last_name), search.last_name.as_deref())
        && contains_text(Some(&member.student_id), search.student_id.as_deref())
        && contains_text(Some(&member.email), search.email.as_deref())
        && contains_text(member.major.as_deref(), search.major.as_deref())
        && search
            .graduation_year
            .map_or(true, |year| member.graduation_year == Some(year))
}

fn listing(members: Vec<Member>) -> Json<MemberList> {
    let message = members
        .is_empty()
        .then(|| "No members found for this club".to_string());
    Json(MemberList { members, message })
}

#[debug_handler]
pub async fn get_members(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<MemberList>> {
    let db = db.lock().await;
    db.club(id)?;
    Ok(listing(db.members.get(&id).cloned().unwrap_or_default()))
}

#[debug_handler]
pub async fn search_members(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Query(search): Query<MemberSearch>,
) -> ApiResult<Json<MemberList>> {
    let db = db.lock().await;
    db.club(id)?;
    let found = db
        .members
        .get(&id)
        .into_iter()
        .flatten()
        .filter(|member| matches(member, &search))
        .cloned()
        .collect();
    Ok(listing(found))
}

#[debug_handler]
pub async fn add_member(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<CreateMemberParams>,
) -> ApiResult<Response> {
    for (value, field) in [
        (&params.student_id, "Student ID"),
        (&params.first_name, "First name"),
        (&params.last_name, "Last name"),
        (&params.email, "Email"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::bad_request(format!("{field} is required")));
        }
    }
    let mut db = db.lock().await;
    db.club(id)?;
    let roster = db.members.entry(id).or_default();
    if roster.iter().any(|m| m.student_id == params.student_id) {
        return Ok(message("Member already exists in this club").into_response());
    }
    let member = Member {
        student_id: params.student_id,
        first_name: params.first_name,
        last_name: params.last_name,
        email: params.email,
        phone_number: params.phone_number,
        major: params.major,
        graduation_year: params.graduation_year,
    };
    roster.push(member.clone());
    Ok((StatusCode::CREATED, Json(member)).into_response())
}

#[debug_handler]
pub async fn remove_member(
    State(db): State<AppState>,
    Path((id, student_id)): Path<(ClubId, StudentId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    let roster = db.members.entry(id).or_default();
    let before = roster.len();
    roster.retain(|m| m.student_id != student_id);
    if roster.len() == before {
        return Err(ApiError::not_found("Member"));
    }
    // officer roles go with the membership
    if let Some(officers) = db.officers.get_mut(&id) {
        officers.retain(|o| o.student_id != student_id);
    }
    Ok(message("Member removed from club successfully"))
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::tests::{create_test_club, create_test_server};
    use axum_test::TestServer;
    use serde_json::json;

    pub async fn add_test_member(server: &TestServer, club: ClubId, student_id: &str) {
        server
            .post(&format!("/api/clubs/{club}/members"))
            .json(&json!({
                "student_id": student_id,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": format!("{student_id}@example.edu"),
                "major": "Mathematics",
                "graduation_year": "2026"
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_add_member_twice_acknowledges() {
        let server = create_test_server();
        let club = create_test_club(&server).await;
        add_test_member(&server, club, "S1").await;

        let response = server
            .post(&format!("/api/clubs/{club}/members"))
            .json(&json!({
                "student_id": "S1",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "s1@example.edu"
            }))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Member already exists in this club" }));

        let listing: MemberList = server.get(&format!("/api/clubs/{club}/members")).await.json();
        assert_eq!(listing.members.len(), 1);
        assert_eq!(listing.members[0].graduation_year, Some(2026));
    }

    #[tokio::test]
    async fn test_search_members_by_major() {
        let server = create_test_server();
        let club = create_test_club(&server).await;
        add_test_member(&server, club, "S1").await;

        let listing: MemberList = server
            .get(&format!("/api/clubs/{club}/members/search"))
            .add_query_param("major", "math")
            .await
            .json();
        assert_eq!(listing.members.len(), 1);

        let listing: MemberList = server
            .get(&format!("/api/clubs/{club}/members/search"))
            .add_query_param("graduation_year", 2030)
            .await
            .json();
        assert!(listing.members.is_empty());
        assert!(listing.message.is_some());
    }

    #[tokio::test]
    async fn test_remove_unknown_member() {
        let server = create_test_server();
        let club = create_test_club(&server).await;
        server
            .delete(&format!("/api/clubs/{club}/members/S404"))
            .await
            .assert_status_not_found();
    }
}
