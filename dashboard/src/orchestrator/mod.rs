//! The Mutation Orchestrator.
//!
//! [`Dashboard`] is the only thing that writes to the [`Session`] from a
//! network result. Every user action runs as: local patch (optimistic flows
//! only), remote call, reconcile or roll back, exactly one notice.

mod clubs;
mod events;
mod finances;
mod members;
mod officers;
mod sponsors;
#[cfg(test)]
pub(crate) mod testing;

use chrono::{Local, NaiveDate};
use tokio::sync::{Mutex, MutexGuard};

use crate::budget::MutationGate;
use crate::error::{DashboardError, DashboardResult};
use crate::notify::Notice;
use crate::remote::http::HttpRemote;
use crate::remote::{ClubApi, Remote};
use crate::session::{ClubTicket, Session, YearTicket};
use crate::settings::Settings;

pub struct Dashboard<R: Remote> {
    api: ClubApi<R>,
    session: Mutex<Session>,
    gate: MutationGate,
}

impl Dashboard<HttpRemote> {
    pub fn connect(settings: &Settings) -> DashboardResult<Self> {
        let remote = HttpRemote::from_settings(settings.api.clone())?;
        tracing::info!(base_url = %settings.api.base_url, "dashboard connected");
        Ok(Self::new(remote))
    }
}

impl<R: Remote> Dashboard<R> {
    pub fn new(remote: R) -> Self {
        Self {
            api: ClubApi(remote),
            session: Mutex::new(Session::default()),
            gate: MutationGate::default(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.api.0
    }

    /// Read access for rendering. Do not hold it across an await on `self`.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    pub async fn take_notices(&self) -> Vec<Notice> {
        self.session.lock().await.notices.drain()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    async fn club_ticket(&self) -> DashboardResult<ClubTicket> {
        self.session
            .lock()
            .await
            .selection
            .club_ticket()
            .ok_or(DashboardError::NoClubSelected)
    }

    async fn year_ticket(&self) -> DashboardResult<YearTicket> {
        let session = self.session.lock().await;
        if session.selection.club().is_none() {
            return Err(DashboardError::NoClubSelected);
        }
        session
            .selection
            .year_ticket()
            .ok_or(DashboardError::NoFiscalYearSelected)
    }

    /// Surfaces the one notice a mutation owes the user.
    async fn finish<T>(
        &self,
        outcome: DashboardResult<T>,
        success: impl FnOnce(&T) -> String,
    ) -> DashboardResult<T> {
        let mut session = self.session.lock().await;
        match &outcome {
            Ok(value) => session.notices.success(success(value)),
            Err(err) => session.notices.error(err.user_message()),
        }
        outcome
    }
}

fn require(value: &str, field: &str) -> DashboardResult<()> {
    if value.trim().is_empty() {
        return Err(DashboardError::Invalid(format!("{field} is required.")));
    }
    Ok(())
}

fn require_amount(amount: f64, field: &str, allow_zero: bool) -> DashboardResult<()> {
    let valid = amount.is_finite() && (amount > 0.0 || (allow_zero && amount == 0.0));
    if !valid {
        return Err(DashboardError::Invalid(format!("{field} must be a positive amount.")));
    }
    Ok(())
}
