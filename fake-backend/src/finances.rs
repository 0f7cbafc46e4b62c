use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;
use shared::envelope::{BudgetEnvelope, Categories, ExpenseList, FiscalYears};
use shared::{
    Budget, BudgetTotal, ClubId, CreateExpenseParams, Expense, ExpenseId, ExpenseSearch,
    FiscalYear,
};

use crate::clubs::message;
use crate::{contains_text, ApiError, ApiResult, AppState, StoredBudget, CATEGORIES};

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    fiscal_year: FiscalYear,
}

#[debug_handler]
pub async fn get_fiscal_years(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
) -> ApiResult<Json<FiscalYears>> {
    let db = db.lock().await;
    db.club(id)?;
    let mut fiscal_years: Vec<FiscalYear> = db
        .budgets
        .keys()
        .filter(|(club, _)| *club == id)
        .map(|(_, year)| *year)
        .collect();
    fiscal_years.sort_unstable_by(|a, b| b.cmp(a));
    Ok(Json(FiscalYears { fiscal_years }))
}

/// Spent is always recomputed from the stored expenses.
#[debug_handler]
pub async fn get_budget(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Query(YearQuery { fiscal_year }): Query<YearQuery>,
) -> ApiResult<Response> {
    let db = db.lock().await;
    db.club(id)?;
    let Some(stored) = db.budgets.get(&(id, fiscal_year)) else {
        return Ok((StatusCode::NOT_FOUND, message("Budget not found")).into_response());
    };
    let mut budget = Budget::new(fiscal_year, stored.total_budget, db.spent(id, fiscal_year));
    budget.budget_id = Some(stored.budget_id);
    Ok(Json(BudgetEnvelope { budget }).into_response())
}

#[debug_handler]
pub async fn create_budget(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<BudgetTotal>,
) -> ApiResult<impl IntoResponse> {
    if !(params.total_budget >= 0.0) {
        return Err(ApiError::bad_request("Total budget must not be negative"));
    }
    let mut db = db.lock().await;
    db.club(id)?;
    if db.budgets.contains_key(&(id, params.fiscal_year)) {
        return Err(ApiError::bad_request(
            "Budget for this fiscal year already exists",
        ));
    }
    let budget_id = db.next_id();
    db.budgets.insert(
        (id, params.fiscal_year),
        StoredBudget {
            budget_id,
            total_budget: params.total_budget,
        },
    );
    Ok((StatusCode::CREATED, message("Budget created successfully")))
}

#[debug_handler]
pub async fn update_budget(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<BudgetTotal>,
) -> ApiResult<Json<BudgetTotal>> {
    if !(params.total_budget >= 0.0) {
        return Err(ApiError::bad_request("Total budget must not be negative"));
    }
    let mut db = db.lock().await;
    db.club(id)?;
    let stored = db
        .budgets
        .get_mut(&(id, params.fiscal_year))
        .ok_or_else(|| ApiError::not_found("Budget"))?;
    stored.total_budget = params.total_budget;
    Ok(Json(params))
}

fn expense_listing(expenses: Vec<Expense>) -> Response {
    if expenses.is_empty() {
        return message("No expenses found for this club").into_response();
    }
    Json(ExpenseList { expenses }).into_response()
}

#[debug_handler]
pub async fn get_expenses(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Query(YearQuery { fiscal_year }): Query<YearQuery>,
) -> ApiResult<Response> {
    let db = db.lock().await;
    db.club(id)?;
    let expenses = db
        .expenses
        .get(&id)
        .into_iter()
        .flatten()
        .filter(|expense| expense.expense_date.year() == fiscal_year)
        .cloned()
        .collect();
    Ok(expense_listing(expenses))
}

#[debug_handler]
pub async fn search_expenses(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Query(search): Query<ExpenseSearch>,
) -> ApiResult<Response> {
    let db = db.lock().await;
    db.club(id)?;
    let expenses = db
        .expenses
        .get(&id)
        .into_iter()
        .flatten()
        .filter(|expense| {
            contains_text(Some(&expense.expense_name), search.expense_name.as_deref())
                && contains_text(expense.category.as_deref(), search.category.as_deref())
                && search
                    .fiscal_year
                    .map_or(true, |year| expense.expense_date.year() == year)
        })
        .cloned()
        .collect();
    Ok(expense_listing(expenses))
}

/// The expense lands in the budget of its date's year, which must exist.
#[debug_handler]
pub async fn add_expense(
    State(db): State<AppState>,
    Path(id): Path<ClubId>,
    Json(params): Json<CreateExpenseParams>,
) -> ApiResult<impl IntoResponse> {
    if params.expense_name.trim().is_empty() {
        return Err(ApiError::bad_request("Expense name is required"));
    }
    if !(params.expense_amount > 0.0) {
        return Err(ApiError::bad_request("Expense amount must be positive"));
    }
    let mut db = db.lock().await;
    db.club(id)?;
    let budget_id = db
        .budgets
        .get(&(id, params.fiscal_year()))
        .map(|stored| stored.budget_id)
        .ok_or_else(|| ApiError::not_found("Budget for this fiscal year"))?;
    let expense = Expense {
        expense_id: db.next_id(),
        budget_id: Some(budget_id),
        expense_name: params.expense_name,
        expense_amount: params.expense_amount,
        expense_date: params.expense_date,
        description: params.description,
        category: params.category,
    };
    db.expenses.entry(id).or_default().push(expense.clone());
    Ok((StatusCode::CREATED, Json(expense)))
}

#[debug_handler]
pub async fn delete_expense(
    State(db): State<AppState>,
    Path((id, expense_id)): Path<(ClubId, ExpenseId)>,
) -> ApiResult<impl IntoResponse> {
    let mut db = db.lock().await;
    db.club(id)?;
    let expenses = db.expenses.entry(id).or_default();
    let before = expenses.len();
    expenses.retain(|expense| expense.expense_id != expense_id);
    if expenses.len() == before {
        return Err(ApiError::not_found("Expense"));
    }
    Ok(message("Expense deleted successfully"))
}

#[debug_handler]
pub async fn get_categories() -> Json<Categories> {
    Json(Categories {
        categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
    })
}
