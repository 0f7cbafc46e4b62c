//! Budget reconciliation for one (club, fiscal year) scope.
//!
//! `Unloaded -> Loading -> Loaded(budget) -> Loaded(budget') ...`, with
//! `Error` reachable from `Loading`. Expense mutations patch `Loaded`
//! optimistically and roll back on rejection; total edits wait for the
//! server. Either way `remaining_amount == total_budget - spent_amount`.

use std::collections::HashMap;
use std::sync::Arc;

use shared::{Budget, ClubId, FiscalYear};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::HttpError;

pub const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BudgetScope {
    pub club_id: ClubId,
    pub fiscal_year: FiscalYear,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum BudgetState {
    #[default]
    Unloaded,
    Loading,
    Loaded(Budget),
    Error(HttpError),
}

pub fn is_balanced(budget: &Budget) -> bool {
    (budget.remaining_amount - (budget.total_budget - budget.spent_amount)).abs() <= TOLERANCE
}

fn with_spent(budget: &Budget, spent_amount: f64) -> Budget {
    Budget {
        spent_amount,
        remaining_amount: budget.total_budget - spent_amount,
        ..budget.clone()
    }
}

/// The budget of the selected scope plus the ticket of the fetch that may
/// still fill it.
#[derive(Debug, Default)]
pub struct BudgetSlot {
    scope: Option<BudgetScope>,
    state: BudgetState,
    ticket: u64,
}

impl BudgetSlot {
    pub fn scope(&self) -> Option<BudgetScope> {
        self.scope
    }

    pub fn state(&self) -> &BudgetState {
        &self.state
    }

    pub fn loaded(&self) -> Option<&Budget> {
        match &self.state {
            BudgetState::Loaded(budget) => Some(budget),
            _ => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.scope = None;
        self.state = BudgetState::Unloaded;
        self.ticket += 1;
    }

    /// Moves to `Loading` for `scope` and hands out the ticket the fetch must
    /// present to [`BudgetSlot::resolve`].
    pub(crate) fn begin_loading(&mut self, scope: BudgetScope) -> u64 {
        self.ticket += 1;
        self.scope = Some(scope);
        self.state = BudgetState::Loading;
        self.ticket
    }

    /// Applies a fetch result. Returns false when the result is stale.
    pub(crate) fn resolve(&mut self, ticket: u64, result: Result<Budget, HttpError>) -> bool {
        if ticket != self.ticket || self.state != BudgetState::Loading {
            return false;
        }
        self.state = match result {
            Ok(budget) => {
                if !is_balanced(&budget) {
                    tracing::warn!(
                        fiscal_year = budget.fiscal_year,
                        "server budget does not balance, recomputing remaining"
                    );
                }
                BudgetState::Loaded(with_spent(&budget, budget.spent_amount))
            }
            Err(err) => BudgetState::Error(err),
        };
        true
    }

    /// A budget that was just created server-side: nothing spent yet.
    pub(crate) fn install(&mut self, scope: BudgetScope, total_budget: f64) {
        self.ticket += 1;
        self.scope = Some(scope);
        self.state = BudgetState::Loaded(Budget::new(scope.fiscal_year, total_budget, 0.0));
    }

    /// Adds `delta` to spent ahead of confirmation. Returns the patch as
    /// `(before, after)` so it can be undone, or `None` if nothing was loaded.
    pub(crate) fn patch_spent(&mut self, scope: BudgetScope, delta: f64) -> Option<Patch> {
        if self.scope != Some(scope) {
            return None;
        }
        let BudgetState::Loaded(budget) = &mut self.state else {
            return None;
        };
        let before = budget.clone();
        *budget = with_spent(&before, before.spent_amount + delta);
        Some(Patch {
            scope,
            before,
            after: budget.clone(),
        })
    }

    /// Undoes `patch` if the slot still shows exactly what the patch produced.
    /// A refetch in between is authoritative and is left alone.
    pub(crate) fn roll_back(&mut self, patch: Patch) -> bool {
        if self.scope != Some(patch.scope) {
            return false;
        }
        match &mut self.state {
            BudgetState::Loaded(budget) if *budget == patch.after => {
                *budget = patch.before;
                true
            }
            _ => false,
        }
    }

    /// Takes the server's new total and keeps the locally tracked spent amount.
    pub(crate) fn confirm_total(&mut self, scope: BudgetScope, total_budget: f64) -> bool {
        if self.scope != Some(scope) {
            return false;
        }
        let BudgetState::Loaded(budget) = &mut self.state else {
            return false;
        };
        budget.total_budget = total_budget;
        budget.remaining_amount = total_budget - budget.spent_amount;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub scope: BudgetScope,
    pub before: Budget,
    pub after: Budget,
}

/// What the budget bar draws. Fractions are of the total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetBar {
    pub spent_fraction: f64,
    pub remaining_fraction: f64,
    pub over_budget: bool,
}

impl BudgetBar {
    pub fn of(budget: &Budget) -> Self {
        if budget.total_budget <= 0.0 {
            return Self {
                spent_fraction: 0.0,
                remaining_fraction: 0.0,
                over_budget: budget.spent_amount > 0.0,
            };
        }
        let spent = budget.spent_amount / budget.total_budget;
        Self {
            spent_fraction: spent.clamp(0.0, 1.0),
            remaining_fraction: (budget.remaining_amount / budget.total_budget).clamp(0.0, 1.0),
            over_budget: spent > 1.0,
        }
    }
}

/// Serialises mutations per budget scope: the next one may not patch until
/// the previous one has resolved or rolled back.
#[derive(Debug, Default)]
pub struct MutationGate {
    turns: Mutex<HashMap<BudgetScope, Arc<Mutex<()>>>>,
}

impl MutationGate {
    pub async fn enter(&self, scope: BudgetScope) -> OwnedMutexGuard<()> {
        let turn = {
            let mut turns = self.turns.lock().await;
            // Only the map holds an idle turn.
            turns.retain(|_, turn| Arc::strong_count(turn) > 1);
            turns.entry(scope).or_default().clone()
        };
        turn.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.turns.lock().await.len()
    }
}
