use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{AttendanceId, EventId, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub event_name: String,
    #[serde(default)]
    pub event_description: Option<String>,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventParams {
    pub event_name: String,
    pub event_description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub attendance_id: AttendanceId,
    pub student_id: StudentId,
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub check_in_time: Option<NaiveTime>,
    #[serde(default)]
    pub member_name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAttendanceParams {
    pub student_id: StudentId,
    pub attendance_status: AttendanceStatus,
    pub check_in_time: Option<NaiveTime>,
}
