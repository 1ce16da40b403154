use chrono::NaiveDateTime;
use serde::Serialize;

use super::enums::Department;

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub id_card: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub department: Department,
    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
}

/// Fields accepted when registering a patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub id_card: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub department: Department,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub id_card: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<Department>,
}

/// Filters for the paginated patient list.
#[derive(Debug, Clone)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub department: Option<Department>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            search: None,
            department: None,
            page: 1,
            per_page: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientPage {
    pub items: Vec<Patient>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
}
