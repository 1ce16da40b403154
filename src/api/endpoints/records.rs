//! Medical record endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::patients::require_patient;
use super::required_text;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{MedicalRecord, NewMedicalRecord, TemplateContent};

#[derive(Deserialize, Default)]
pub struct RecordBody {
    pub symptom: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn new_record(patient_id: i64, body: RecordBody) -> Result<NewMedicalRecord, ApiError> {
    match (
        required_text(body.diagnosis, "diagnosis"),
        required_text(body.treatment_plan, "treatment_plan"),
    ) {
        (Ok(diagnosis), Ok(treatment_plan)) => Ok(NewMedicalRecord {
            patient_id,
            symptom: optional_text(body.symptom),
            diagnosis,
            treatment_plan,
        }),
        _ => Err(ApiError::BadRequest(
            "Diagnosis and treatment plan are required".into(),
        )),
    }
}

/// `GET /api/patients/:id/records` — newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    let conn = ctx.open_db()?;
    require_patient(&conn, patient_id)?;
    Ok(Json(db::get_records_for_patient(&conn, patient_id)?))
}

/// `POST /api/patients/:id/records`
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Json(body): Json<RecordBody>,
) -> Result<(StatusCode, Json<MedicalRecord>), ApiError> {
    let conn = ctx.open_db()?;
    require_patient(&conn, patient_id)?;
    let record = db::insert_record(&conn, &new_record(patient_id, body)?)?;
    tracing::info!(patient_id, record_id = record.id, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /api/patients/:id/records/from_template/:tid`
///
/// Body fields, when present, override the template's content.
pub async fn from_template(
    State(ctx): State<ApiContext>,
    Path((patient_id, template_id)): Path<(i64, i64)>,
    body: Option<Json<RecordBody>>,
) -> Result<(StatusCode, Json<MedicalRecord>), ApiError> {
    let conn = ctx.open_db()?;
    require_patient(&conn, patient_id)?;
    let template = db::get_template(&conn, template_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Template {template_id} not found")))?;
    let content = TemplateContent::parse(&template.content)
        .ok_or_else(|| ApiError::BadRequest("Template content is malformed".into()))?;

    let overrides = body.map(|Json(b)| b).unwrap_or_default();
    let merged = RecordBody {
        symptom: overrides.symptom.or(content.symptom),
        diagnosis: overrides.diagnosis.or(content.diagnosis),
        treatment_plan: overrides.treatment_plan.or(content.treatment_plan),
    };

    let record = db::insert_record(&conn, &new_record(patient_id, merged)?)?;
    tracing::info!(patient_id, template_id, record_id = record.id, "record created from template");
    Ok((StatusCode::CREATED, Json(record)))
}
