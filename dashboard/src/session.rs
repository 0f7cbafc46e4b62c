//! The explicit selection context every store and controller works under.

use shared::{Club, ClubId, Expense, FiscalYear, Member, Officer, Role, Sponsorship};

use crate::budget::{BudgetBar, BudgetScope, BudgetSlot};
use crate::derived::{DerivedCharts, MemberCharts};
use crate::events::{EventBoard, Expansion};
use crate::notify::Notices;
use crate::store::EntityStore;

/// Proof of which club a read was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClubTicket {
    pub club_id: ClubId,
    pub epoch: u64,
}

/// Proof of which (club, fiscal year) a read was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YearTicket {
    pub scope: BudgetScope,
    pub epoch: u64,
}

#[derive(Debug, Default)]
pub struct Selection {
    club: Option<ClubId>,
    fiscal_year: Option<FiscalYear>,
    fiscal_years: Vec<FiscalYear>,
    club_epoch: u64,
    year_epoch: u64,
    member_version: u64,
}

impl Selection {
    pub fn club(&self) -> Option<ClubId> {
        self.club
    }

    pub fn fiscal_year(&self) -> Option<FiscalYear> {
        self.fiscal_year
    }

    /// Most recent first.
    pub fn fiscal_years(&self) -> &[FiscalYear] {
        &self.fiscal_years
    }

    pub fn member_version(&self) -> u64 {
        self.member_version
    }

    pub fn budget_scope(&self) -> Option<BudgetScope> {
        Some(BudgetScope {
            club_id: self.club?,
            fiscal_year: self.fiscal_year?,
        })
    }

    pub(crate) fn club_ticket(&self) -> Option<ClubTicket> {
        self.club.map(|club_id| ClubTicket {
            club_id,
            epoch: self.club_epoch,
        })
    }

    pub(crate) fn year_ticket(&self) -> Option<YearTicket> {
        self.budget_scope().map(|scope| YearTicket {
            scope,
            epoch: self.year_epoch,
        })
    }

    pub(crate) fn is_current_club(&self, ticket: ClubTicket) -> bool {
        self.club_ticket() == Some(ticket)
    }

    pub(crate) fn is_current_year(&self, ticket: YearTicket) -> bool {
        self.year_ticket() == Some(ticket)
    }

    pub(crate) fn set_fiscal_years(&mut self, mut years: Vec<FiscalYear>) {
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        self.fiscal_years = years;
    }

    pub(crate) fn add_fiscal_year(&mut self, year: FiscalYear) {
        let mut years = std::mem::take(&mut self.fiscal_years);
        years.push(year);
        self.set_fiscal_years(years);
    }

    pub(crate) fn bump_members(&mut self) {
        self.member_version += 1;
    }
}

/// Working set for whatever club and fiscal year are selected. Nothing here
/// outlives a club switch except the club list, roles and categories.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) clubs: EntityStore<Club>,
    pub(crate) selection: Selection,
    pub(crate) members: EntityStore<Member>,
    pub(crate) officers: EntityStore<Officer>,
    pub(crate) roles: EntityStore<Role>,
    pub(crate) events: EventBoard,
    pub(crate) expansion: Expansion,
    pub(crate) sponsors: EntityStore<Sponsorship>,
    pub(crate) budget: BudgetSlot,
    pub(crate) expenses: EntityStore<Expense>,
    pub(crate) categories: Vec<String>,
    pub(crate) charts: DerivedCharts,
    pub(crate) notices: Notices,
}

impl Session {
    pub fn clubs(&self) -> &EntityStore<Club> {
        &self.clubs
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn members(&self) -> &EntityStore<Member> {
        &self.members
    }

    pub fn officers(&self) -> &EntityStore<Officer> {
        &self.officers
    }

    pub fn roles(&self) -> &EntityStore<Role> {
        &self.roles
    }

    pub fn events(&self) -> &EventBoard {
        &self.events
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn sponsors(&self) -> &EntityStore<Sponsorship> {
        &self.sponsors
    }

    pub fn budget(&self) -> &BudgetSlot {
        &self.budget
    }

    pub fn budget_bar(&self) -> Option<BudgetBar> {
        self.budget.loaded().map(BudgetBar::of)
    }

    pub fn expenses(&self) -> &EntityStore<Expense> {
        &self.expenses
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distributions for the chart widgets, recomputed only when the club or
    /// the member data version has moved.
    pub fn member_charts(&mut self) -> MemberCharts {
        match self.selection.club {
            Some(club) => self
                .charts
                .get(club, self.selection.member_version, self.members.items())
                .clone(),
            None => MemberCharts::default(),
        }
    }

    pub fn chart_computations(&self) -> u64 {
        self.charts.computations()
    }

    pub(crate) fn select_club(&mut self, club: ClubId) {
        self.selection.club = Some(club);
        self.reset_scope();
    }

    pub(crate) fn clear_club(&mut self) {
        self.selection.club = None;
        self.reset_scope();
    }

    fn reset_scope(&mut self) {
        self.selection.club_epoch += 1;
        self.selection.year_epoch += 1;
        self.selection.fiscal_year = None;
        self.selection.fiscal_years.clear();
        self.members.reset();
        self.officers.reset();
        self.events.reset();
        self.expansion.collapse();
        self.sponsors.reset();
        self.budget.clear();
        self.expenses.reset();
    }

    /// Switches the fiscal year and returns the tickets its budget and
    /// expense fetches must present.
    pub(crate) fn select_fiscal_year(&mut self, year: FiscalYear) -> Option<(YearTicket, u64)> {
        let club_id = self.selection.club?;
        self.selection.year_epoch += 1;
        self.selection.fiscal_year = Some(year);
        self.expenses.reset();
        let scope = BudgetScope {
            club_id,
            fiscal_year: year,
        };
        let budget_ticket = self.budget.begin_loading(scope);
        Some((
            YearTicket {
                scope,
                epoch: self.selection.year_epoch,
            },
            budget_ticket,
        ))
    }

    /// The club has no fiscal years left to show.
    pub(crate) fn clear_fiscal_year(&mut self) {
        self.selection.year_epoch += 1;
        self.selection.fiscal_year = None;
        self.budget.clear();
        self.expenses.replace_all(Vec::new());
    }

    /// A budget the server just created becomes the selected, fully loaded scope.
    pub(crate) fn adopt_new_budget(&mut self, scope: BudgetScope, total_budget: f64) {
        self.selection.add_fiscal_year(scope.fiscal_year);
        self.selection.year_epoch += 1;
        self.selection.fiscal_year = Some(scope.fiscal_year);
        self.expenses.replace_all(Vec::new());
        self.budget.install(scope, total_budget);
    }
}
