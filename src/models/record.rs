use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub symptom: Option<String>,
    pub diagnosis: String,
    pub treatment_plan: String,
    #[serde(with = "super::timestamp")]
    pub record_date: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub patient_id: i64,
    pub symptom: Option<String>,
    pub diagnosis: String,
    pub treatment_plan: String,
}
