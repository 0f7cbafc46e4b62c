//! In-memory stand-in for the club REST backend.
//!
//! Serves the same routes and response shapes under `/api`, keeping every
//! table in a single mutex-guarded [`Db`]. Used by the dashboard's end to end
//! tests and runnable on its own through the `fake-backend` binary.

mod clubs;
mod error;
mod events;
mod finances;
mod members;
mod officers;
mod sponsors;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono::{Datelike, NaiveDate};
use shared::{
    Attendance, Club, ClubId, Event, EventId, Expense, FiscalYear, Member, Officer, Role,
    Sponsorship,
};
use tokio::sync::Mutex;

pub use error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
struct StoredBudget {
    budget_id: i64,
    total_budget: f64,
}

#[derive(Debug, Clone)]
struct StoredEvent {
    club_id: ClubId,
    event: Event,
}

#[derive(Debug)]
pub struct Db {
    next_id: i64,
    clubs: Vec<Club>,
    members: HashMap<ClubId, Vec<Member>>,
    officers: HashMap<ClubId, Vec<Officer>>,
    roles: Vec<Role>,
    events: Vec<StoredEvent>,
    attendance: HashMap<EventId, Vec<Attendance>>,
    sponsors: HashMap<ClubId, Vec<Sponsorship>>,
    budgets: HashMap<(ClubId, FiscalYear), StoredBudget>,
    expenses: HashMap<ClubId, Vec<Expense>>,
}

pub type AppState = Arc<Mutex<Db>>;

pub const CATEGORIES: [&str; 5] = ["Events", "Supplies", "Food", "Travel", "Other"];

impl Default for Db {
    fn default() -> Self {
        let roles = [
            (1, "President", "Leads the club"),
            (2, "Vice President", "Supports the president"),
            (3, "Treasurer", "Keeps the books"),
            (4, "Secretary", "Keeps the records"),
        ]
        .into_iter()
        .map(|(role_id, name, description)| Role {
            role_id,
            role_name: name.to_string(),
            role_description: Some(description.to_string()),
        })
        .collect();
        Self {
            next_id: 1,
            clubs: Vec::new(),
            members: HashMap::new(),
            officers: HashMap::new(),
            roles,
            events: Vec::new(),
            attendance: HashMap::new(),
            sponsors: HashMap::new(),
            budgets: HashMap::new(),
            expenses: HashMap::new(),
        }
    }
}

impl Db {
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn club(&self, club_id: ClubId) -> ApiResult<&Club> {
        self.clubs
            .iter()
            .find(|club| club.club_id == club_id)
            .ok_or_else(|| ApiError::not_found("Club"))
    }

    fn club_of_event(&self, event_id: EventId) -> ApiResult<ClubId> {
        self.events
            .iter()
            .find(|stored| stored.event.event_id == event_id)
            .map(|stored| stored.club_id)
            .ok_or_else(|| ApiError::not_found("Event"))
    }

    fn spent(&self, club_id: ClubId, fiscal_year: FiscalYear) -> f64 {
        self.expenses
            .get(&club_id)
            .into_iter()
            .flatten()
            .filter(|expense| expense.expense_date.year() == fiscal_year)
            .map(|expense| expense.expense_amount)
            .sum()
    }

    fn forget_club(&mut self, club_id: ClubId) {
        self.clubs.retain(|club| club.club_id != club_id);
        self.members.remove(&club_id);
        self.officers.remove(&club_id);
        self.sponsors.remove(&club_id);
        self.expenses.remove(&club_id);
        self.budgets.retain(|(club, _), _| *club != club_id);
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.events)
            .into_iter()
            .partition(|stored| stored.club_id == club_id);
        for stored in gone {
            self.attendance.remove(&stored.event.event_id);
        }
        self.events = kept;
    }
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
}

fn contains_text(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|needle| !needle.is_empty()) {
        None => true,
        Some(needle) => haystack
            .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

pub fn create_app() -> Router {
    create_app_with(AppState::default())
}

pub fn create_app_with(state: AppState) -> Router {
    let api = Router::new()
        .route("/clubs", get(clubs::get_clubs))
        .route("/clubs", post(clubs::create_club))
        .route("/clubs/{id}", delete(clubs::delete_club))
        .route("/clubs/{id}/members", get(members::get_members))
        .route("/clubs/{id}/members", post(members::add_member))
        .route("/clubs/{id}/members/search", get(members::search_members))
        .route("/clubs/{id}/members/{student_id}", delete(members::remove_member))
        .route("/clubs/{id}/officers", get(officers::get_officers))
        .route("/clubs/{id}/officers", post(officers::add_officer))
        .route(
            "/clubs/{id}/officers/{student_id}/{role_id}",
            delete(officers::remove_officer),
        )
        .route("/roles/", get(officers::get_roles))
        .route("/clubs/{id}/events", post(events::create_event))
        .route("/clubs/{id}/events/upcoming", get(events::upcoming_events))
        .route("/clubs/{id}/events/past", get(events::past_events))
        .route("/clubs/{id}/events/{event_id}", delete(events::delete_event))
        .route("/events/{id}/attendance", get(events::get_attendance))
        .route("/events/{id}/attendance", post(events::add_attendance))
        .route(
            "/events/{id}/attendance/{attendance_id}",
            delete(events::remove_attendance),
        )
        .route("/clubs/{id}/sponsors", get(sponsors::get_sponsors))
        .route("/clubs/{id}/sponsors", post(sponsors::add_sponsorship))
        .route("/clubs/{id}/sponsors/search", get(sponsors::search_sponsors))
        .route(
            "/clubs/{id}/sponsors/{sponsorship_id}",
            delete(sponsors::remove_sponsorship),
        )
        .route("/clubs/{id}/budget", get(finances::get_budget))
        .route("/clubs/{id}/budget", post(finances::create_budget))
        .route("/clubs/{id}/budget/years", get(finances::get_fiscal_years))
        .route("/clubs/{id}/budget/update", put(finances::update_budget))
        .route("/clubs/{id}/expenses", get(finances::get_expenses))
        .route("/clubs/{id}/expenses", post(finances::add_expense))
        .route("/clubs/{id}/expenses/search", get(finances::search_expenses))
        .route(
            "/clubs/{id}/expenses/{expense_id}",
            delete(finances::delete_expense),
        )
        .route("/expenses/categories", get(finances::get_categories))
        .with_state(state);

    Router::new().nest("/api", api)
}
