//! View-model layer for the club dashboard.
//!
//! A [`Dashboard`] owns the working set for one selected club and fiscal
//! year, talks to the REST backend through a [`remote::Remote`], and keeps
//! every derived value (budget remaining, chart distributions, expanded
//! event row) consistent across mutations.

pub mod budget;
pub mod derived;
pub mod error;
pub mod events;
pub mod notify;
mod orchestrator;
pub mod remote;
pub mod session;
pub mod settings;
pub mod store;

pub use budget::{BudgetBar, BudgetScope, BudgetState};
pub use error::{DashboardError, DashboardResult, HttpError};
pub use events::Toggle;
pub use notify::{Notice, NoticeLevel};
pub use orchestrator::Dashboard;
pub use remote::http::HttpRemote;
pub use session::Session;
pub use settings::Settings;
