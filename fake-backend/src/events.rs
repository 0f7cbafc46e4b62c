use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use shared::envelope::AttendanceList;
use shared::{
    Attendance, AttendanceId, ClubId, CreateAttendanceParams, CreateEventParams, Event, EventId,
};

use crate::clubs::message;
use crate::{ApiError, ApiResult, AppState, Db, StoredEvent};

fn club_events(db: &Db, club_id: ClubId, keep: impl Fn(NaiveDate) -> bool) -> Vec<Event> {
    let mut events: Vec<Event> = db
        .events
        .iter()
        .filter(|stored| stored.club_id == club_id && keep(stored.event.event_date))
        .map(|stored| stored.event.clone())
        .collect();
    events.sort_by_key(|event| (event.event_date, event.event_time));
    events
}

#[debug_handler]
pub async fn upcoming_events(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<Vec<Event>>> {
    let db = db.lock().await;
    db.club(id)?;
    let today = Local::now().date_naive();
    Ok(Json(club_events(&db, id, |date| date >= today)))
}

#[debug_handler]
pub async fn past_events(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<Vec<Event>>> {
    let db = db.lock().await;
    db.club(id)?;
    let today = Local::now().date_naive();
    let mut events = club_events(&db, id, |date| date < today);
    events.reverse();
    Ok(Json(events))
}

#[debug_handler]
pub async fn create_event(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<CreateEventParams>,
) -> ApiResult<impl IntoResponse> {
    if params.event_name.trim().is_empty() {
        return Err(ApiError::bad_request("Event name is required"));
    }
    let mut db = db.lock().await;
    db.club(id)?;
    let event = Event {
        event_id: db.next_id(),
        event_name: params.event_name,
        event_description: params.event_description,
        event_date: params.event_date,
        event_time: params.event_time,
        location: params.location,
    };
    db.events.push(StoredEvent {
        club_id: id,
        event: event.clone(),
    });
    Ok((StatusCode::CREATED, Json(event)))
}

#[debug_handler]
pub async fn delete_event(
    State(db): State<AppState>,
    Path((id, event_id)): Path<(ClubId, EventId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    if db.club_of_event(event_id)? != id {
        return Err(ApiError::not_found("Event"));
    }
    db.events.retain(|stored| stored.event.event_id != event_id);
    db.attendance.remove(&event_id);
    Ok(message("Event deleted successfully"))
}

#[debug_handler]
pub async fn get_attendance(
    State(db): State<AppState>,
    Path(id): Path<EventId>,
) -> ApiResult<Json<AttendanceList>> {
    let db = db.lock().await;
    db.club_of_event(id)?;
    Ok(Json(AttendanceList {
        attendance: db.attendance.get(&id).cloned().unwrap_or_default(),
    }))
}

#[debug_handler]
pub async fn add_attendance(
    State(db): State<AppState>,
    Path(id): Path<EventId>,
    Json(params): Json<CreateAttendanceParams>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    let club_id = db.club_of_event(id)?;
    let member_name = db
        .members
        .get(&club_id)
        .into_iter()
        .flatten()
        .find(|m| m.student_id == params.student_id)
        .map(|m| m.full_name())
        .ok_or_else(|| ApiError::bad_request("Student is not a member of this club"))?;
    if db
        .attendance
        .get(&id)
        .is_some_and(|records| records.iter().any(|r| r.student_id == params.student_id))
    {
        return Err(ApiError::bad_request("Attendance already recorded for this student"));
    }

    let record = Attendance {
        attendance_id: db.next_id(),
        student_id: params.student_id,
        attendance_status: params.attendance_status,
        check_in_time: params.check_in_time,
        member_name: Some(member_name),
    };
    db.attendance.entry(id).or_default().push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

#[debug_handler]
pub async fn remove_attendance(
    State(db): State<AppState>,
    Path((id, attendance_id)): Path<(EventId, AttendanceId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    let records = db.attendance.entry(id).or_default();
    let before = records.len();
    records.retain(|r| r.attendance_id != attendance_id);
    if records.len() == before {
        return Err(ApiError::not_found("Attendance record"));
    }
    Ok(message("Attendance record deleted successfully"))
}
