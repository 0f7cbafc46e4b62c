use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none};

use crate::{ClubId, LenientDate};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub club_id: ClubId,
    pub club_name: String,
    #[serde(default)]
    pub club_description: Option<String>,
    #[serde_as(as = "Option<LenientDate>")]
    pub founded_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub faculty_advisor: Option<String>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateClubParams {
    pub club_name: String,
    pub club_description: Option<String>,
    #[serde_as(as = "Option<LenientDate>")]
    pub founded_date: Option<NaiveDate>,
    pub contact_email: String,
    pub faculty_advisor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn club_accepts_http_date_from_flask() {
        let club: Club = serde_json::from_value(serde_json::json!({
            "club_id": 3,
            "club_name": "Chess",
            "club_description": "Weekly games",
            "founded_date": "Mon, 04 Sep 2017 00:00:00 GMT",
            "contact_email": "chess@example.edu",
            "faculty_advisor": null
        }))
        .unwrap();

        assert_eq!(club.founded_date, NaiveDate::from_ymd_opt(2017, 9, 4));
        assert_eq!(club.faculty_advisor, None);
    }

    #[test]
    fn create_params_skip_missing_fields() {
        let params = CreateClubParams {
            club_name: "Robotics".to_string(),
            contact_email: "bots@example.edu".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "club_name": "Robotics", "contact_email": "bots@example.edu" })
        );
    }
}
