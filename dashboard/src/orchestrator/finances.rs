use shared::envelope::Created;
use shared::{BudgetTotal, CreateExpenseParams, Expense, ExpenseId, ExpenseSearch, FiscalYear};

use super::{require, require_amount, Dashboard};
use crate::budget::BudgetScope;
use crate::error::{DashboardError, DashboardResult};
use crate::remote::Remote;
use crate::session::YearTicket;
use crate::store::text_matches;

fn expense_matches(expense: &Expense, criteria: &ExpenseSearch) -> bool {
    text_matches(Some(&expense.expense_name), criteria.expense_name.as_deref())
        && text_matches(expense.category.as_deref(), criteria.category.as_deref())
}

impl<R: Remote> Dashboard<R> {
    /// Loads the selectable fiscal years and keeps the current one if the
    /// server still lists it; otherwise the most recent year is selected.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_fiscal_years(&self) -> DashboardResult<()> {
        let ticket = self.club_ticket().await?;
        let result = self.api.fiscal_years(ticket.club_id).await;

        let next = {
            let mut session = self.session.lock().await;
            if !session.selection.is_current_club(ticket) {
                tracing::debug!(club = ticket.club_id, "discarding stale fiscal years");
                return Ok(());
            }
            let years =
                result.inspect_err(|err| tracing::warn!("fiscal years unavailable: {err}"))?;
            session.selection.set_fiscal_years(years);
            let selection = &session.selection;
            let next = match selection.fiscal_year() {
                Some(year) if selection.fiscal_years().contains(&year) => None,
                _ => selection.fiscal_years().first().copied(),
            };
            if selection.fiscal_years().is_empty() {
                session.clear_fiscal_year();
            }
            next
        };
        match next {
            Some(year) => self.select_fiscal_year(year).await,
            None => Ok(()),
        }
    }

    /// Switches the budget scope and fetches its budget and expenses. Nothing
    /// is cached: every selection goes back to the server.
    #[tracing::instrument(skip(self))]
    pub async fn select_fiscal_year(&self, year: FiscalYear) -> DashboardResult<()> {
        let club_id = self
            .session
            .lock()
            .await
            .selection
            .club()
            .ok_or(DashboardError::NoClubSelected)?;
        // Same turn as the mutations of this scope.
        let _turn = self
            .gate
            .enter(BudgetScope {
                club_id,
                fiscal_year: year,
            })
            .await;
        let (ticket, budget_ticket) = self
            .session
            .lock()
            .await
            .select_fiscal_year(year)
            .ok_or(DashboardError::NoClubSelected)?;
        let scope = ticket.scope;
        let (budget, expenses) = tokio::join!(
            self.api.budget(scope.club_id, scope.fiscal_year),
            self.api.expenses(scope.club_id, scope.fiscal_year),
        );

        let mut session = self.session.lock().await;
        let budget_failure = budget.as_ref().err().cloned();
        if !session.budget.resolve(budget_ticket, budget) {
            tracing::debug!(fiscal_year = year, "discarding stale budget");
        }
        if !session.selection.is_current_year(ticket) {
            tracing::debug!(fiscal_year = year, "discarding stale expenses");
            return Ok(());
        }
        let expense_failure = match expenses {
            Ok(list) => {
                session.expenses.replace_all(list);
                None
            }
            Err(err) => {
                session.expenses.fail(err.kind());
                Some(err)
            }
        };
        match budget_failure.or(expense_failure) {
            Some(err) => {
                tracing::warn!(fiscal_year = year, "budget data unavailable: {err}");
                Err(err.into())
            }
            None => Ok(()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh_expenses(&self) -> DashboardResult<()> {
        let ticket = self.year_ticket().await?;
        let _turn = self.gate.enter(ticket.scope).await;
        self.fetch_expenses(ticket).await
    }

    async fn fetch_expenses(&self, ticket: YearTicket) -> DashboardResult<()> {
        let scope = ticket.scope;
        let result = self.api.expenses(scope.club_id, scope.fiscal_year).await;
        let mut session = self.session.lock().await;
        if !session.selection.is_current_year(ticket) {
            tracing::debug!(fiscal_year = scope.fiscal_year, "discarding stale expenses");
            return Ok(());
        }
        match result {
            Ok(list) => {
                session.expenses.replace_all(list);
                Ok(())
            }
            Err(err) => {
                session.expenses.fail(err.kind());
                Err(err.into())
            }
        }
    }

    /// Filters the loaded expenses first and only asks the server when nothing
    /// local matches or the search names another fiscal year.
    #[tracing::instrument(skip(self))]
    pub async fn search_expenses(&self, criteria: &ExpenseSearch) -> DashboardResult<Vec<Expense>> {
        let (club, local) = {
            let session = self.session.lock().await;
            let club = session
                .selection
                .club()
                .ok_or(DashboardError::NoClubSelected)?;
            let same_year = criteria
                .fiscal_year
                .map_or(true, |year| session.selection.fiscal_year() == Some(year));
            let local: Vec<Expense> = if same_year {
                session
                    .expenses
                    .find(|expense| expense_matches(expense, criteria))
                    .into_iter()
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };
            (club, local)
        };
        if !local.is_empty() {
            return Ok(local);
        }
        Ok(self.api.search_expenses(club, criteria).await?)
    }

    pub async fn refresh_categories(&self) -> DashboardResult<()> {
        let categories = self
            .api
            .expense_categories()
            .await
            .inspect_err(|err| tracing::warn!("expense categories unavailable: {err}"))?;
        self.session.lock().await.categories = categories;
        Ok(())
    }

    /// Optimistic: spent moves before the server answers and moves back if it
    /// refuses.
    #[tracing::instrument(skip(self))]
    pub async fn add_expense(&self, params: CreateExpenseParams) -> DashboardResult<()> {
        let outcome = self.try_add_expense(&params).await;
        self.finish(outcome, |_| "Expense added successfully!".to_string())
            .await
    }

    async fn try_add_expense(&self, params: &CreateExpenseParams) -> DashboardResult<()> {
        require(&params.expense_name, "Expense name")?;
        require_amount(params.expense_amount, "Expense amount", false)?;
        let ticket = self.year_ticket().await?;
        let scope = ticket.scope;
        if params.fiscal_year() != scope.fiscal_year {
            return Err(DashboardError::Invalid(format!(
                "Expense date must fall in fiscal year {}.",
                scope.fiscal_year
            )));
        }

        let _turn = self.gate.enter(scope).await;
        let patch = self
            .session
            .lock()
            .await
            .budget
            .patch_spent(scope, params.expense_amount);

        match self.api.add_expense(scope.club_id, params).await {
            Ok(Created::Entity(expense)) => {
                let mut session = self.session.lock().await;
                if session.selection.budget_scope() == Some(scope) {
                    session.expenses.upsert(expense);
                }
            }
            Ok(Created::Acknowledged(_)) => {
                let current = self.session.lock().await.selection.year_ticket();
                match current {
                    Some(current) if current.scope == scope => {
                        if let Err(err) = self.fetch_expenses(current).await {
                            tracing::warn!("expense added but list refresh failed: {err}");
                        }
                    }
                    _ => tracing::debug!(?scope, "expense added to a scope no longer selected"),
                }
            }
            Err(err) => {
                if let Some(patch) = patch {
                    self.session.lock().await.budget.roll_back(patch);
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Deleting an id the store no longer holds is a local not-found: no
    /// request is sent and the budget is untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_expense(&self, expense: ExpenseId) -> DashboardResult<()> {
        let outcome = self.try_delete_expense(expense).await;
        self.finish(outcome, |_| "Expense deleted successfully!".to_string())
            .await
    }

    async fn try_delete_expense(&self, expense: ExpenseId) -> DashboardResult<()> {
        let scope = self.year_ticket().await?.scope;
        let _turn = self.gate.enter(scope).await;

        let ((index, removed), patch) = {
            let mut session = self.session.lock().await;
            if session.selection.budget_scope() != Some(scope) {
                tracing::debug!(expense, "fiscal year changed before delete");
                return Err(DashboardError::NotFound("Expense".to_string()));
            }
            let taken = session
                .expenses
                .take(&expense)
                .ok_or_else(|| DashboardError::NotFound("Expense".to_string()))?;
            let patch = session.budget.patch_spent(scope, -taken.1.expense_amount);
            (taken, patch)
        };

        if let Err(err) = self.api.delete_expense(scope.club_id, expense).await {
            let mut session = self.session.lock().await;
            if session.selection.budget_scope() == Some(scope) {
                session.expenses.restore(index, removed);
            }
            if let Some(patch) = patch {
                session.budget.roll_back(patch);
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Pessimistic: the total changes only once the server has accepted it,
    /// and spent keeps its locally tracked value.
    #[tracing::instrument(skip(self))]
    pub async fn update_total_budget(&self, total_budget: f64) -> DashboardResult<()> {
        let outcome = self.try_update_total_budget(total_budget).await;
        self.finish(outcome, |_| "Budget updated successfully!".to_string())
            .await
    }

    async fn try_update_total_budget(&self, total_budget: f64) -> DashboardResult<()> {
        require_amount(total_budget, "Total budget", true)?;
        let ticket = self.year_ticket().await?;
        let scope = ticket.scope;
        let _turn = self.gate.enter(scope).await;

        let updated = self
            .api
            .update_budget(
                scope.club_id,
                &BudgetTotal {
                    fiscal_year: scope.fiscal_year,
                    total_budget,
                },
            )
            .await?;
        if !self
            .session
            .lock()
            .await
            .budget
            .confirm_total(scope, updated.total_budget)
        {
            tracing::debug!(fiscal_year = scope.fiscal_year, "no loaded budget to update");
        }
        Ok(())
    }

    /// Creates the budget for a new fiscal year and selects it.
    #[tracing::instrument(skip(self))]
    pub async fn add_budget(&self, fiscal_year: FiscalYear, total_budget: f64) -> DashboardResult<()> {
        let outcome = self.try_add_budget(fiscal_year, total_budget).await;
        self.finish(outcome, |_| {
            format!("Budget for fiscal year {fiscal_year} created successfully!")
        })
        .await
    }

    async fn try_add_budget(&self, fiscal_year: FiscalYear, total_budget: f64) -> DashboardResult<()> {
        require_amount(total_budget, "Total budget", true)?;
        let ticket = self.club_ticket().await?;
        if self
            .session
            .lock()
            .await
            .selection
            .fiscal_years()
            .contains(&fiscal_year)
        {
            return Err(DashboardError::Invalid(format!(
                "A budget for fiscal year {fiscal_year} already exists."
            )));
        }
        let scope = BudgetScope {
            club_id: ticket.club_id,
            fiscal_year,
        };
        let _turn = self.gate.enter(scope).await;

        self.api
            .create_budget(
                scope.club_id,
                &BudgetTotal {
                    fiscal_year,
                    total_budget,
                },
            )
            .await?;
        let mut session = self.session.lock().await;
        if session.selection.is_current_club(ticket) {
            session.adopt_new_budget(scope, total_budget);
        }
        Ok(())
    }
}
