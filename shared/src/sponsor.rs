use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::SponsorshipId;

/// A sponsor joined with one of its contributions to the selected club.
///
/// `sponsor_id` names the sponsor and repeats across rows; `sponsorship_id`
/// names the contribution and is the row identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsorship {
    pub sponsor_id: i64,
    pub sponsor_name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub sponsorship_id: SponsorshipId,
    pub contribution_amount: f64,
    pub contribution_date: NaiveDate,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSponsorshipParams {
    pub sponsor_name: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub contribution_amount: f64,
    pub contribution_date: NaiveDate,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorSearch {
    pub sponsor_name: Option<String>,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}
