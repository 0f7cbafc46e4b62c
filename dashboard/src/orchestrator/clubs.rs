use shared::envelope::Created;
use shared::{ClubId, CreateClubParams};

use super::{require, Dashboard};
use crate::error::DashboardResult;
use crate::remote::Remote;

impl<R: Remote> Dashboard<R> {
    /// First load: the club list and the global role and category catalogues.
    pub async fn start(&self) -> DashboardResult<()> {
        let (clubs, roles, categories) = tokio::join!(
            self.refresh_clubs(),
            self.refresh_roles(),
            self.refresh_categories(),
        );
        clubs.and(roles).and(categories)
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh_clubs(&self) -> DashboardResult<()> {
        let result = self.api.clubs().await;
        let mut session = self.session.lock().await;
        match result {
            Ok(clubs) => {
                session.clubs.replace_all(clubs);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("club list unavailable: {err}");
                session.clubs.fail(err.kind());
                Err(err.into())
            }
        }
    }

    /// Makes `club` the root scope: every dependent collection empties and
    /// reloads, and the most recent fiscal year is selected.
    #[tracing::instrument(skip(self))]
    pub async fn select_club(&self, club: ClubId) -> DashboardResult<()> {
        self.session.lock().await.select_club(club);
        self.load_club().await
    }

    /// Fetches every club-scoped collection. Each read is independent: one
    /// failing does not hold back the others.
    pub async fn load_club(&self) -> DashboardResult<()> {
        let (members, officers, events, sponsors, years) = tokio::join!(
            self.refresh_members(),
            self.refresh_officers(),
            self.refresh_events(),
            self.refresh_sponsors(),
            self.refresh_fiscal_years(),
        );
        members.and(officers).and(events).and(sponsors).and(years)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_club(&self, params: CreateClubParams) -> DashboardResult<()> {
        let outcome = self.try_create_club(&params).await;
        self.finish(outcome, |_| "Club added successfully!".to_string())
            .await
    }

    async fn try_create_club(&self, params: &CreateClubParams) -> DashboardResult<()> {
        require(&params.club_name, "Club name")?;
        require(&params.contact_email, "Contact email")?;
        match self.api.create_club(params).await? {
            Created::Entity(club) => {
                self.session.lock().await.clubs.upsert(club);
            }
            Created::Acknowledged(_) => {
                if let Err(err) = self.refresh_clubs().await {
                    tracing::warn!("club created but list refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    /// Deleting the selected club also drops the selection.
    #[tracing::instrument(skip(self))]
    pub async fn delete_club(&self, club: ClubId) -> DashboardResult<()> {
        let outcome = self.try_delete_club(club).await;
        self.finish(outcome, |_| format!("Club with ID {club} deleted successfully!"))
            .await
    }

    async fn try_delete_club(&self, club: ClubId) -> DashboardResult<()> {
        self.api.delete_club(club).await?;
        let mut session = self.session.lock().await;
        session.clubs.remove(&club);
        if session.selection.club() == Some(club) {
            session.clear_club();
        }
        Ok(())
    }
}
