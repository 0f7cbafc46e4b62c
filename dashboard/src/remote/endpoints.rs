use serde::de::{DeserializeOwned, IgnoredAny};
use shared::envelope::{
    AttendanceList, BudgetEnvelope, Categories, ClubList, Created, EventList, ExpenseList,
    FiscalYears, MemberList, OfficerList, RoleList, SponsorList, UpdatedBudget,
};
use shared::{
    Attendance, AttendanceId, Budget, BudgetTotal, Club, ClubId, CreateAttendanceParams,
    CreateClubParams, CreateEventParams, CreateExpenseParams, CreateMemberParams,
    CreateOfficerParams, CreateSponsorshipParams, Event, EventId, Expense, ExpenseId,
    ExpenseSearch, FiscalYear, Member, MemberSearch, Officer, OfficerKey, Role, SponsorSearch,
    Sponsorship, SponsorshipId,
};

use super::{ApiRequest, Remote};
use crate::error::HttpError;

/// One typed method per endpoint, over any [`Remote`].
#[derive(Debug, Clone)]
pub struct ClubApi<R: Remote>(pub R);

impl<R: Remote> ClubApi<R> {
    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, HttpError> {
        tracing::debug!(method = %request.method, path = %request.path, "api request");
        let value = self.0.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call_ignoring_body(&self, request: ApiRequest) -> Result<(), HttpError> {
        self.call::<Option<IgnoredAny>>(request).await.map(|_| ())
    }

    pub async fn clubs(&self) -> Result<Vec<Club>, HttpError> {
        self.call::<ClubList>(ApiRequest::get("clubs")).await
    }

    pub async fn create_club(&self, params: &CreateClubParams) -> Result<Created<Club>, HttpError> {
        self.call(ApiRequest::post("clubs").json(params)?).await
    }

    pub async fn delete_club(&self, club: ClubId) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!("clubs/{club}")))
            .await
    }

    pub async fn members(&self, club: ClubId) -> Result<Vec<Member>, HttpError> {
        let listing: MemberList = self
            .call(ApiRequest::get(format!("clubs/{club}/members")))
            .await?;
        Ok(listing.members)
    }

    pub async fn search_members(
        &self,
        club: ClubId,
        criteria: &MemberSearch,
    ) -> Result<Vec<Member>, HttpError> {
        let request = ApiRequest::get(format!("clubs/{club}/members/search")).criteria(criteria)?;
        let listing: MemberList = self.call(request).await?;
        Ok(listing.members)
    }

    pub async fn add_member(
        &self,
        club: ClubId,
        params: &CreateMemberParams,
    ) -> Result<Created<Member>, HttpError> {
        self.call(ApiRequest::post(format!("clubs/{club}/members")).json(params)?)
            .await
    }

    pub async fn remove_member(&self, club: ClubId, student_id: &str) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!(
            "clubs/{club}/members/{student_id}"
        )))
        .await
    }

    pub async fn officers(&self, club: ClubId) -> Result<Vec<Officer>, HttpError> {
        let listing: OfficerList = self
            .call(ApiRequest::get(format!("clubs/{club}/officers")))
            .await?;
        Ok(listing.officers)
    }

    pub async fn add_officer(
        &self,
        club: ClubId,
        params: &CreateOfficerParams,
    ) -> Result<Created<Officer>, HttpError> {
        self.call(ApiRequest::post(format!("clubs/{club}/officers")).json(params)?)
            .await
    }

    pub async fn remove_officer(&self, club: ClubId, key: &OfficerKey) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!(
            "clubs/{club}/officers/{}/{}",
            key.student_id, key.role_id
        )))
        .await
    }

    pub async fn roles(&self) -> Result<Vec<Role>, HttpError> {
        let listing: RoleList = self.call(ApiRequest::get("roles/")).await?;
        Ok(listing.roles)
    }

    pub async fn upcoming_events(&self, club: ClubId) -> Result<Vec<Event>, HttpError> {
        self.call::<EventList>(ApiRequest::get(format!("clubs/{club}/events/upcoming")))
            .await
    }

    pub async fn past_events(&self, club: ClubId) -> Result<Vec<Event>, HttpError> {
        self.call::<EventList>(ApiRequest::get(format!("clubs/{club}/events/past")))
            .await
    }

    pub async fn create_event(
        &self,
        club: ClubId,
        params: &CreateEventParams,
    ) -> Result<Created<Event>, HttpError> {
        self.call(ApiRequest::post(format!("clubs/{club}/events")).json(params)?)
            .await
    }

    pub async fn delete_event(&self, club: ClubId, event: EventId) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!("clubs/{club}/events/{event}")))
            .await
    }

    pub async fn attendance(&self, event: EventId) -> Result<Vec<Attendance>, HttpError> {
        let listing: AttendanceList = self
            .call(ApiRequest::get(format!("events/{event}/attendance")))
            .await?;
        Ok(listing.attendance)
    }

    pub async fn add_attendance(
        &self,
        event: EventId,
        params: &CreateAttendanceParams,
    ) -> Result<Created<Attendance>, HttpError> {
        self.call(ApiRequest::post(format!("events/{event}/attendance")).json(params)?)
            .await
    }

    pub async fn remove_attendance(
        &self,
        event: EventId,
        attendance: AttendanceId,
    ) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!(
            "events/{event}/attendance/{attendance}"
        )))
        .await
    }

    pub async fn sponsors(&self, club: ClubId) -> Result<Vec<Sponsorship>, HttpError> {
        let listing: SponsorList = self
            .call(ApiRequest::get(format!("clubs/{club}/sponsors")))
            .await?;
        Ok(listing.sponsors)
    }

    pub async fn search_sponsors(
        &self,
        club: ClubId,
        criteria: &SponsorSearch,
    ) -> Result<Vec<Sponsorship>, HttpError> {
        let request =
            ApiRequest::get(format!("clubs/{club}/sponsors/search")).criteria(criteria)?;
        let listing: SponsorList = self.call(request).await?;
        Ok(listing.sponsors)
    }

    pub async fn add_sponsorship(
        &self,
        club: ClubId,
        params: &CreateSponsorshipParams,
    ) -> Result<Created<Sponsorship>, HttpError> {
        self.call(ApiRequest::post(format!("clubs/{club}/sponsors")).json(params)?)
            .await
    }

    pub async fn remove_sponsorship(
        &self,
        club: ClubId,
        sponsorship: SponsorshipId,
    ) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!(
            "clubs/{club}/sponsors/{sponsorship}"
        )))
        .await
    }

    pub async fn fiscal_years(&self, club: ClubId) -> Result<Vec<FiscalYear>, HttpError> {
        let listing: FiscalYears = self
            .call(ApiRequest::get(format!("clubs/{club}/budget/years")))
            .await?;
        Ok(listing.fiscal_years)
    }

    pub async fn budget(&self, club: ClubId, year: FiscalYear) -> Result<Budget, HttpError> {
        let envelope: BudgetEnvelope = self
            .call(ApiRequest::get(format!("clubs/{club}/budget")).param("fiscal_year", year))
            .await?;
        Ok(envelope.budget)
    }

    pub async fn update_budget(
        &self,
        club: ClubId,
        total: &BudgetTotal,
    ) -> Result<UpdatedBudget, HttpError> {
        self.call(ApiRequest::put(format!("clubs/{club}/budget/update")).json(total)?)
            .await
    }

    pub async fn create_budget(&self, club: ClubId, total: &BudgetTotal) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::post(format!("clubs/{club}/budget")).json(total)?)
            .await
    }

    pub async fn expenses(&self, club: ClubId, year: FiscalYear) -> Result<Vec<Expense>, HttpError> {
        let listing: ExpenseList = self
            .call(ApiRequest::get(format!("clubs/{club}/expenses")).param("fiscal_year", year))
            .await?;
        Ok(listing.expenses)
    }

    pub async fn search_expenses(
        &self,
        club: ClubId,
        criteria: &ExpenseSearch,
    ) -> Result<Vec<Expense>, HttpError> {
        let request =
            ApiRequest::get(format!("clubs/{club}/expenses/search")).criteria(criteria)?;
        let listing: ExpenseList = self.call(request).await?;
        Ok(listing.expenses)
    }

    pub async fn add_expense(
        &self,
        club: ClubId,
        params: &CreateExpenseParams,
    ) -> Result<Created<Expense>, HttpError> {
        self.call(ApiRequest::post(format!("clubs/{club}/expenses")).json(params)?)
            .await
    }

    pub async fn delete_expense(&self, club: ClubId, expense: ExpenseId) -> Result<(), HttpError> {
        self.call_ignoring_body(ApiRequest::delete(format!("clubs/{club}/expenses/{expense}")))
            .await
    }

    pub async fn expense_categories(&self) -> Result<Vec<String>, HttpError> {
        let listing: Categories = self.call(ApiRequest::get("expenses/categories")).await?;
        Ok(listing.categories)
    }
}
