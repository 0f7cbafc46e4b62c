use serde::{Deserialize, Serialize};

use crate::{RoleId, StudentId};

/// One role held by one student. A student holding two roles is two officers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role_id: RoleId,
    pub role_name: String,
    #[serde(default)]
    pub role_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfficerKey {
    pub student_id: StudentId,
    pub role_id: RoleId,
}

impl Officer {
    pub fn key(&self) -> OfficerKey {
        OfficerKey {
            student_id: self.student_id.clone(),
            role_id: self.role_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub role_id: RoleId,
    pub role_name: String,
    #[serde(default)]
    pub role_description: Option<String>,
}

pub type CreateOfficerParams = OfficerKey;
