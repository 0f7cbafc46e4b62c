use shared::envelope::Created;
use shared::{CreateOfficerParams, OfficerKey};

use super::{require, Dashboard};
use crate::error::DashboardResult;
use crate::remote::Remote;

impl<R: Remote> Dashboard<R> {
    #[tracing::instrument(skip(self))]
    pub async fn refresh_officers(&self) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        let result = self.api.officers(ticket.club_id).await;

        let mut session = self.session.lock().await;
        if !session.selection.is_current_club(ticket) {
            tracing::debug!(club = ticket.club_id, "discarding stale officer list");
            return Ok(());
        }
        match result {
            Ok(officers) => {
                session.officers.replace_all(officers);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("officer list unavailable: {err}");
                session.officers.fail(err.kind());
                Err(err.into())
            }
        }
    }

    /// The role catalogue is global and survives club switches.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_roles(&self) -> DashboardResult<()> {
        let result = self.api.roles().await;
        let mut session = self.session.lock().await;
        match result {
            Ok(roles) => {
                session.roles.replace_all(roles);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("roles unavailable: {err}");
                session.roles.fail(err.kind());
                Err(err.into())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_officer(&self, params: CreateOfficerParams) -> DashboardResult<()> {
        let outcome = self.try_add_officer(&params).await;
        self.finish(outcome, |_| "Officer added successfully!".to_string())
            .await
    }

    async fn try_add_officer(&self, params: &CreateOfficerParams) -> DashboardResult<()> {
        require(&params.student_id, "Student ID")?;
        let ticket = self.club_ticket().await?;
        match self.api.add_officer(ticket.club_id, params).await? {
            Created::Entity(officer) => {
                let mut session = self.session.lock().await;
                if session.selection.is_current_club(ticket) {
                    session.officers.upsert(officer);
                }
            }
            Created::Acknowledged(_) => {
                if let Err(err) = self.refresh_officers().await {
                    tracing::warn!("officer added but list refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_officer(&self, key: OfficerKey) -> DashboardResult<()> {
        let outcome = self.try_remove_officer(&key).await;
        self.finish(outcome, |_| "Officer removed successfully!".to_string())
            .await
    }

    async fn try_remove_officer(&self, key: &OfficerKey) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        self.api.remove_officer(ticket.club_id, key).await?;
        let mut session = self.session.lock().await;
        if session.selection.is_current_club(ticket) {
            session.officers.remove(key);
        }
        Ok(())
    }
}
