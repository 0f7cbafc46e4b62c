use shared::envelope::Created;
use shared::{CreateSponsorshipParams, SponsorSearch, Sponsorship, SponsorshipId};

use super::{require, require_amount, Dashboard};
use crate::error::{DashboardError, DashboardResult};
use crate::remote::Remote;
use crate::store::text_matches;

fn sponsorship_matches(row: &Sponsorship, criteria: &SponsorSearch) -> bool {
    text_matches(Some(&row.sponsor_name), criteria.sponsor_name.as_deref())
        && text_matches(row.contact_person.as_deref(), criteria.contact_person.as_deref())
        && text_matches(row.contact_email.as_deref(), criteria.contact_email.as_deref())
        && criteria
            .from_date
            .map_or(true, |from| row.contribution_date >= from)
        && criteria.to_date.map_or(true, |to| row.contribution_date <= to)
}

impl<R: Remote> Dashboard<R> {
    #[tracing::instrument(skip(self))]
    pub async fn refresh_sponsors(&self) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        let result = self.api.sponsors(ticket.club_id).await;

        let mut session = self.session.lock().await;
        if !session.selection.is_current_club(ticket) {
            tracing::debug!(club = ticket.club_id, "discarding stale sponsor list");
            return Ok(());
        }
        match result {
            Ok(sponsors) => {
                session.sponsors.replace_all(sponsors);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("sponsor list unavailable: {err}");
                session.sponsors.fail(err.kind());
                Err(err.into())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn search_sponsors(
        &self,
        criteria: &SponsorSearch,
    ) -> DashboardResult<Vec<Sponsorship>> {
        let (ticket, local) = {
            let session = self.session.lock().await;
            let ticket = session
                .selection
                .club_ticket()
                .ok_or(DashboardError::NoClubSelected)?;
            let local: Vec<Sponsorship> = session
                .sponsors
                .find(|row| sponsorship_matches(row, criteria))
                .into_iter()
                .cloned()
                .collect();
            (ticket, local)
        };
        if !local.is_empty() {
            return Ok(local);
        }
        Ok(self.api.search_sponsors(ticket.club_id, criteria).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_sponsorship(&self, params: CreateSponsorshipParams) -> DashboardResult<()> {
        let outcome = self.try_add_sponsorship(&params).await;
        self.finish(outcome, |_| "Sponsor contribution added successfully!".to_string())
            .await
    }

    async fn try_add_sponsorship(&self, params: &CreateSponsorshipParams) -> DashboardResult<()> {
        require(&params.sponsor_name, "Sponsor name")?;
        require_amount(params.contribution_amount, "Contribution amount", false)?;
        let ticket = self.club_ticket().await?;
        match self.api.add_sponsorship(ticket.club_id, params).await? {
            Created::Entity(row) => {
                let mut session = self.session.lock().await;
                if session.selection.is_current_club(ticket) {
                    session.sponsors.upsert(row);
                }
            }
            Created::Acknowledged(_) => {
                if let Err(err) = self.refresh_sponsors().await {
                    tracing::warn!("sponsorship added but list refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_sponsorship(&self, sponsorship: SponsorshipId) -> DashboardResult<()> {
        let outcome = self.try_remove_sponsorship(sponsorship).await;
        self.finish(outcome, |_| "Sponsor contribution removed successfully!".to_string())
            .await
    }

    async fn try_remove_sponsorship(&self, sponsorship: SponsorshipId) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        self.api
            .remove_sponsorship(ticket.club_id, sponsorship)
            .await?;
        let mut session = self.session.lock().await;
        if session.selection.is_current_club(ticket) {
            session.sponsors.remove(&sponsorship);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use serde_json::json;
    use tokio_test::assert_ok;

    use super::*;
    use crate::orchestrator::testing::*;

    fn row(sponsor: i64, sponsorship: i64, name: &str, date: &str) -> serde_json::Value {
        json!({
            "sponsor_id": sponsor,
            "sponsor_name": name,
            "contact_person": "Pat",
            "contact_email": null,
            "phone_number": null,
            "address": null,
            "sponsorship_id": sponsorship,
            "contribution_amount": 250.0,
            "contribution_date": date
        })
    }

    async fn club_with_sponsors() -> Dashboard<ScriptedRemote> {
        let dashboard = Dashboard::new(ScriptedRemote::default());
        dashboard.remote().reply(
            "GET clubs/1/sponsors",
            Ok(json!({ "sponsors": [
                row(1, 10, "Acme", "2024-02-01"),
                row(1, 11, "Acme", "2024-09-01"),
                row(2, 12, "Globex", "2023-05-05"),
            ] })),
        );
        dashboard.session.lock().await.select_club(1);
        dashboard.refresh_sponsors().await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn test_contributions_are_keyed_by_sponsorship() {
        let dashboard = club_with_sponsors().await;
        assert_eq!(dashboard.session().await.sponsors().len(), 3);

        dashboard
            .remote()
            .reply("DELETE clubs/1/sponsors/10", ack("Sponsorship contribution deleted"));
        assert_ok!(dashboard.remove_sponsorship(10).await);

        let session = dashboard.session().await;
        let remaining: Vec<_> = session.sponsors().iter().map(|r| r.sponsorship_id).collect();
        assert_eq!(remaining, [11, 12]);
    }

    #[tokio::test]
    async fn test_local_search_honours_date_window() {
        let dashboard = club_with_sponsors().await;
        let found = dashboard
            .search_sponsors(&SponsorSearch {
                sponsor_name: Some("acme".to_string()),
                from_date: NaiveDate::from_ymd_opt(2024, 6, 1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sponsorship_id, 11);
    }

    #[tokio::test]
    async fn test_acknowledged_contribution_refetches() {
        let dashboard = club_with_sponsors().await;
        dashboard
            .remote()
            .reply("POST clubs/1/sponsors", ack("Sponsor contribution added successfully"))
            .reply(
                "GET clubs/1/sponsors",
                Ok(json!({ "sponsors": [row(3, 13, "Initech", "2024-10-10")] })),
            );

        assert_ok!(
            dashboard
                .add_sponsorship(CreateSponsorshipParams {
                    sponsor_name: "Initech".to_string(),
                    contact_person: None,
                    contact_email: None,
                    phone_number: None,
                    address: None,
                    contribution_amount: 500.0,
                    contribution_date: NaiveDate::from_ymd_opt(2024, 10, 10).unwrap(),
                })
                .await
        );
        assert_eq!(dashboard.session().await.sponsors().items()[0].sponsor_name, "Initech");
    }
}
