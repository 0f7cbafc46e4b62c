use shared::envelope::Created;
use shared::{AttendanceId, CreateAttendanceParams, CreateEventParams, EventId};

use super::{require, Dashboard};
use crate::error::{DashboardError, DashboardResult};
use crate::events::Toggle;
use crate::remote::Remote;

impl<R: Remote> Dashboard<R> {
    /// Upcoming and past are one compound read: both halves apply together or
    /// the previous lists stay on screen.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_events(&self) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        let (upcoming, past) = tokio::join!(
            self.api.upcoming_events(ticket.club_id),
            self.api.past_events(ticket.club_id),
        );

        let mut session = self.session.lock().await;
        if !session.selection.is_current_club(ticket) {
            tracing::debug!(club = ticket.club_id, "discarding stale event lists");
            return Ok(());
        }
        match upcoming.and_then(|upcoming| Ok((upcoming, past?))) {
            Ok((upcoming, past)) => {
                session.events.replace(upcoming, past);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("event lists unavailable: {err}");
                session.events.upcoming.fail(err.kind());
                session.events.past.fail(err.kind());
                Err(err.into())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_event(&self, params: CreateEventParams) -> DashboardResult<()> {
        let outcome = self.try_add_event(&params).await;
        self.finish(outcome, |_| "Event added successfully!".to_string())
            .await
    }

    async fn try_add_event(&self, params: &CreateEventParams) -> DashboardResult<()> {
        require(&params.event_name, "Event name")?;
        let ticket = self.club_ticket().await?;
        match self.api.create_event(ticket.club_id, params).await? {
            Created::Entity(event) => {
                let mut session = self.session.lock().await;
                if session.selection.is_current_club(ticket) {
                    session.events.place(event, Self::today());
                }
            }
            Created::Acknowledged(_) => {
                if let Err(err) = self.refresh_events().await {
                    tracing::warn!("event added but list refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, event: EventId) -> DashboardResult<()> {
        let outcome = self.try_delete_event(event).await;
        self.finish(outcome, |_| "Event deleted successfully!".to_string())
            .await
    }

    async fn try_delete_event(&self, event: EventId) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        self.api.delete_event(ticket.club_id, event).await?;
        let mut session = self.session.lock().await;
        if session.selection.is_current_club(ticket) {
            session.events.remove(event);
            if session.expansion.is_open(event) {
                session.expansion.collapse();
            }
        }
        Ok(())
    }

    /// Expands `event` (collapsing any other row) and loads its attendance,
    /// or collapses it if it is already open.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_event(&self, event: EventId) -> DashboardResult<Toggle> {
        let toggle = self.session.lock().await.expansion.toggle(event);
        if let Toggle::Expanded { event, ticket } = toggle {
            self.load_attendance(event, ticket).await?;
        }
        Ok(toggle)
    }

    /// Refetches attendance for the row that is open now, if any.
    pub async fn refresh_attendance(&self) -> DashboardResult<()> {
        let Some((event, ticket)) = self.session.lock().await.expansion.refresh_ticket() else {
            return Ok(());
        };
        self.load_attendance(event, ticket).await
    }

    async fn load_attendance(&self, event: EventId, ticket: u64) -> DashboardResult<()> {
        let result = self.api.attendance(event).await;
        let failure = result.as_ref().err().cloned();
        let applied = self
            .session
            .lock()
            .await
            .expansion
            .resolve(event, ticket, result);
        if !applied {
            tracing::debug!(event, "discarding stale attendance");
            return Ok(());
        }
        match failure {
            Some(err) => {
                tracing::warn!(event, "attendance unavailable: {err}");
                Err(err.into())
            }
            None => Ok(()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_attendance(&self, params: CreateAttendanceParams) -> DashboardResult<()> {
        let outcome = self.try_add_attendance(&params).await;
        self.finish(outcome, |_| "Attendance recorded successfully!".to_string())
            .await
    }

    async fn try_add_attendance(&self, params: &CreateAttendanceParams) -> DashboardResult<()> {
        require(&params.student_id, "Student ID")?;
        let event = self
            .session
            .lock()
            .await
            .expansion
            .expanded()
            .ok_or_else(|| DashboardError::Invalid("Select an event first.".to_string()))?;
        match self.api.add_attendance(event, params).await? {
            Created::Entity(record) => {
                let mut session = self.session.lock().await;
                if session.expansion.is_open(event) {
                    session.expansion.attendance_mut().upsert(record);
                }
            }
            Created::Acknowledged(_) => {
                if let Err(err) = self.refresh_attendance().await {
                    tracing::warn!("attendance recorded but refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_attendance(&self, attendance: AttendanceId) -> DashboardResult<()> {
        let outcome = self.try_remove_attendance(attendance).await;
        self.finish(outcome, |_| "Attendance record removed.".to_string())
            .await
    }

    async fn try_remove_attendance(&self, attendance: AttendanceId) -> DashboardResult<()> {
        let event = self
            .session
            .lock()
            .await
            .expansion
            .expanded()
            .ok_or_else(|| DashboardError::Invalid("Select an event first.".to_string()))?;
        self.api.remove_attendance(event, attendance).await?;
        let mut session = self.session.lock().await;
        if session.expansion.is_open(event) {
            session.expansion.attendance_mut().remove(&attendance);
        }
        Ok(())
    }
}
