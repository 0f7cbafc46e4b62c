use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::ExpenseId;

pub type FiscalYear = i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub budget_id: Option<i64>,
    pub fiscal_year: FiscalYear,
    pub total_budget: f64,
    pub spent_amount: f64,
    pub remaining_amount: f64,
}

impl Budget {
    pub fn new(fiscal_year: FiscalYear, total_budget: f64, spent_amount: f64) -> Self {
        Self {
            budget_id: None,
            fiscal_year,
            total_budget,
            spent_amount,
            remaining_amount: total_budget - spent_amount,
        }
    }
}

/// Body of `PUT .../budget/update` and `POST .../budget`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetTotal {
    pub fiscal_year: FiscalYear,
    pub total_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub expense_id: ExpenseId,
    #[serde(default)]
    pub budget_id: Option<i64>,
    pub expense_name: String,
    pub expense_amount: f64,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseParams {
    pub expense_name: String,
    pub expense_amount: f64,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl CreateExpenseParams {
    /// The backend files an expense under its date's calendar year.
    pub fn fiscal_year(&self) -> FiscalYear {
        self.expense_date.year()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSearch {
    pub expense_name: Option<String>,
    pub category: Option<String>,
    pub fiscal_year: Option<FiscalYear>,
}
