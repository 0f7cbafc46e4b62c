use shared::envelope::Created;
use shared::{CreateMemberParams, Member, MemberSearch};

use super::{require, Dashboard};
use crate::error::{DashboardError, DashboardResult};
use crate::remote::Remote;
use crate::store::text_matches;

fn member_matches(member: &Member, criteria: &MemberSearch) -> bool {
    text_matches(Some(&member.first_name), criteria.first_name.as_deref())
        && text_matches(Some(&member.last_name), criteria.last_name.as_deref())
        && text_matches(Some(&member.student_id), criteria.student_id.as_deref())
        && text_matches(Some(&member.email), criteria.email.as_deref())
        && text_matches(member.major.as_deref(), criteria.major.as_deref())
        && criteria
            .graduation_year
            .map_or(true, |year| member.graduation_year == Some(year))
}

impl<R: Remote> Dashboard<R> {
    #[tracing::instrument(skip(self))]
    pub async fn refresh_members(&self) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        let result = self.api.members(ticket.club_id).await;

        let mut session = self.session.lock().await;
        if !session.selection.is_current_club(ticket) {
            tracing::debug!(club = ticket.club_id, "discarding stale member list");
            return Ok(());
        }
        match result {
            Ok(members) => {
                session.members.replace_all(members);
                session.selection.bump_members();
                Ok(())
            }
            Err(err) => {
                tracing::warn!("member list unavailable: {err}");
                session.members.fail(err.kind());
                Err(err.into())
            }
        }
    }

    /// Filters the loaded roster first and only asks the server when nothing
    /// local matches. The store itself is never touched.
    #[tracing::instrument(skip(self))]
    pub async fn search_members(&self, criteria: &MemberSearch) -> DashboardResult<Vec<Member>> {
        let (ticket, local) = {
            let session = self.session.lock().await;
            let ticket = session
                .selection
                .club_ticket()
                .ok_or(DashboardError::NoClubSelected)?;
            let local: Vec<Member> = session
                .members
                .find(|member| member_matches(member, criteria))
                .into_iter()
                .cloned()
                .collect();
            (ticket, local)
        };
        if !local.is_empty() {
            return Ok(local);
        }
        Ok(self.api.search_members(ticket.club_id, criteria).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_member(&self, params: CreateMemberParams) -> DashboardResult<()> {
        let outcome = self.try_add_member(&params).await;
        self.finish(outcome, |_| "Member added successfully!".to_string())
            .await
    }

    async fn try_add_member(&self, params: &CreateMemberParams) -> DashboardResult<()> {
        require(&params.student_id, "Student ID")?;
        require(&params.first_name, "First name")?;
        require(&params.last_name, "Last name")?;
        require(&params.email, "Email")?;
        let ticket = self.club_ticket().await?;

        match self.api.add_member(ticket.club_id, params).await? {
            Created::Entity(member) => {
                let mut session = self.session.lock().await;
                if session.selection.is_current_club(ticket) {
                    session.members.upsert(member);
                    session.selection.bump_members();
                }
            }
            Created::Acknowledged(ack) => {
                tracing::info!("{}", ack.message);
                if let Err(err) = self.refresh_members().await {
                    tracing::warn!("member added but roster refresh failed: {err}");
                }
            }
        }
        Ok(())
    }

    /// Membership is removed by student id, the identifier the backend routes on.
    #[tracing::instrument(skip(self))]
    pub async fn remove_member(&self, student_id: &str) -> DashboardResult<()> {
        let outcome = self.try_remove_member(student_id).await;
        self.finish(outcome, |_| "Member removed successfully!".to_string())
            .await
    }

    async fn try_remove_member(&self, student_id: &str) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        self.api.remove_member(ticket.club_id, student_id).await?;

        let mut session = self.session.lock().await;
        if session.selection.is_current_club(ticket)
            && session.members.remove(&student_id.to_string()).is_some()
        {
            session.selection.bump_members();
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use tracing_test::traced_test;

    use super::*;
    use crate::error::DashboardError;
    use crate::orchestrator::testing::*;

    fn new_member(id: &str, major: &str) -> CreateMemberParams {
        CreateMemberParams {
            student_id: id.to_string(),
            first_name: "New".to_string(),
            last_name: "Member".to_string(),
            email: format!("{id}@example.edu"),
            major: Some(major.to_string()),
            ..Default::default()
        }
    }

    async fn club_with_roster(members: serde_json::Value) -> Dashboard<ScriptedRemote> {
        let dashboard = Dashboard::new(ScriptedRemote::default());
        script_empty_club(dashboard.remote(), 1);
        // served to the explicit refresh below
        dashboard
            .remote()
            .reply("GET clubs/1/members", Ok(json!({ "members": members })));
        dashboard.select_club(1).await.unwrap();
        dashboard.refresh_members().await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn test_major_distribution_skips_missing_majors() {
        let dashboard = club_with_roster(json!([
            member_json("1", Some("CS"), Some(2025)),
            member_json("2", Some("CS"), Some(2026)),
            member_json("3", None, None),
            member_json("4", Some("EE"), Some(2025)),
        ]))
        .await;

        let charts = dashboard.session().await.member_charts();
        assert_eq!(
            charts.majors,
            BTreeMap::from([("CS".to_string(), 2), ("EE".to_string(), 1)])
        );
        assert_eq!(charts.graduation_years, BTreeMap::from([(2025, 2), (2026, 1)]));
    }

    #[tokio::test]
    async fn test_charts_follow_member_mutations_only() {
        let dashboard = club_with_roster(json!([member_json("1", Some("CS"), None)])).await;
        dashboard
            .remote()
            .reply("POST clubs/1/members", Ok(member_json("2", Some("Math"), None)))
            .reply("DELETE clubs/1/members/1", ack("Member removed from the club"));

        let mut session = dashboard.session().await;
        session.member_charts();
        session.member_charts();
        let before = session.chart_computations();
        drop(session);

        // an unrelated read must not invalidate the charts
        dashboard.remote().reply("GET roles/", Ok(json!({ "roles": [] })));
        assert_ok!(dashboard.refresh_roles().await);
        assert_eq!(dashboard.session().await.member_charts().majors.len(), 1);
        assert_eq!(dashboard.session().await.chart_computations(), before);

        assert_ok!(dashboard.add_member(new_member("2", "Math")).await);
        let charts = dashboard.session().await.member_charts();
        assert_eq!(charts.majors.get("Math"), Some(&1));

        assert_ok!(dashboard.remove_member("1").await);
        let mut session = dashboard.session().await;
        assert_eq!(session.member_charts().majors.get("CS"), None);
        assert_eq!(session.chart_computations(), before + 2);
    }

    #[tokio::test]
    async fn test_existing_member_acknowledgement_refetches_roster() {
        let dashboard = club_with_roster(json!([])).await;
        dashboard
            .remote()
            .reply("POST clubs/1/members", ack("Member already exists in this club"))
            .reply(
                "GET clubs/1/members",
                Ok(json!({ "members": [member_json("9", Some("Art"), None)] })),
            );
        dashboard.take_notices().await;

        assert_ok!(dashboard.add_member(new_member("9", "Art")).await);
        assert_eq!(dashboard.session().await.members().len(), 1);
        assert_eq!(dashboard.take_notices().await.len(), 1);
    }

    #[tokio::test]
    async fn test_search_prefers_local_matches() {
        let dashboard = club_with_roster(json!([
            member_json("100", Some("Computer Science"), None),
            member_json("200", Some("Biology"), None),
        ]))
        .await;

        let found = dashboard
            .search_members(&MemberSearch {
                major: Some("computer".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(dashboard.remote().calls("GET clubs/1/members/search?major=computer"), 0);

        dashboard.remote().reply(
            "GET clubs/1/members/search?major=physics",
            Ok(json!({ "members": [member_json("300", Some("Physics"), None)] })),
        );
        let found = dashboard
            .search_members(&MemberSearch {
                major: Some("physics".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found[0].student_id, "300");
        assert_eq!(dashboard.session().await.members().len(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_stale_roster_is_discarded() {
        let dashboard = Dashboard::new(ScriptedRemote::default());
        script_empty_club(dashboard.remote(), 2);
        dashboard
            .remote()
            .reply_after(
                "GET clubs/1/members",
                std::time::Duration::from_millis(30),
                Ok(json!({ "members": [member_json("1", Some("CS"), None)] })),
            );
        dashboard.session.lock().await.select_club(1);

        let (stale, switched) = tokio::join!(dashboard.refresh_members(), async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            dashboard.select_club(2).await
        });
        assert_ok!(stale);
        assert_ok!(switched);

        let session = dashboard.session().await;
        assert_eq!(session.selection().club(), Some(2));
        assert!(session.members().is_empty());
        assert!(logs_contain("discarding stale member list"));
    }

    #[tokio::test]
    async fn test_member_mutation_needs_a_club() {
        let dashboard = Dashboard::new(ScriptedRemote::default());

        let err = assert_err!(dashboard.add_member(new_member("1", "CS")).await);
        assert_eq!(err, DashboardError::NoClubSelected);
        assert_eq!(dashboard.take_notices().await[0].message, "No club selected.");
    }
}
