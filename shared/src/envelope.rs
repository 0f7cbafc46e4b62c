//! One response schema per endpoint.

use serde::{Deserialize, Serialize};

use crate::{
    Attendance, Budget, BudgetTotal, Club, Event, Expense, FiscalYear, Member, Officer, Role,
    Sponsorship,
};

pub type ClubList = Vec<Club>;
pub type EventList = Vec<Event>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    // a missing budget answers 404 with `{message}`
    #[serde(alias = "message")]
    pub error: String,
}

/// What a create endpoint answers: the new entity, or only an acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Created<T> {
    Entity(T),
    Acknowledged(Message),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberList {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerList {
    #[serde(default)]
    pub officers: Vec<Officer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleList {
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceList {
    #[serde(default)]
    pub attendance: Vec<Attendance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorList {
    #[serde(default)]
    pub sponsors: Vec<Sponsorship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalYears {
    #[serde(default)]
    pub fiscal_years: Vec<FiscalYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEnvelope {
    pub budget: Budget,
}

/// `PUT .../budget/update` may echo more, only the new total is read.
pub type UpdatedBudget = BudgetTotal;

/// The list endpoint answers `{"message": ...}` with no `expenses` key when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseList {
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_prefers_entity_over_acknowledgement() {
        let created: Created<Member> = serde_json::from_value(json!({
            "student_id": "S9", "first_name": "Grace", "last_name": "Hopper",
            "email": "grace@example.edu"
        }))
        .unwrap();
        assert!(matches!(created, Created::Entity(Member { ref student_id, .. }) if student_id == "S9"));

        let ack: Created<Member> =
            serde_json::from_value(json!({ "message": "Member already exists in this club" }))
                .unwrap();
        assert_eq!(
            ack,
            Created::Acknowledged(Message {
                message: "Member already exists in this club".to_string()
            })
        );
    }

    #[test]
    fn empty_expense_listing_is_a_message() {
        let listing: ExpenseList =
            serde_json::from_value(json!({ "message": "No expenses found for this club" }))
                .unwrap();
        assert!(listing.expenses.is_empty());
    }
}
