//! Patient endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_department, required_text};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{self, DatabaseError};
use crate::models::{NewPatient, Patient, PatientChanges, PatientPage, PatientQuery};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Deserialize)]
pub struct PatientListQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PatientListQuery {
    /// Unparseable paging values fall back to defaults; out-of-range ones are clamped.
    fn into_query(self) -> Result<PatientQuery, ApiError> {
        let department = match self.department.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_department(raw)?),
            _ => None,
        };
        let parse = |raw: Option<String>, default: i64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(default)
        };
        let page = parse(self.page, 1).max(1);
        let per_page = parse(self.per_page, DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

        Ok(PatientQuery {
            search: self.search,
            department,
            page: u32::try_from(page).unwrap_or(u32::MAX),
            per_page: per_page as u32,
        })
    }
}

#[derive(Deserialize)]
pub struct PatientBody {
    pub name: Option<String>,
    pub id_card: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

fn id_card_conflict(err: DatabaseError) -> ApiError {
    if err.is_unique_violation() {
        ApiError::Conflict("A patient with this ID card already exists".into())
    } else {
        err.into()
    }
}

/// `GET /api/patients` — paginated, searchable list.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<PatientPage>, ApiError> {
    let query = query.into_query()?;
    let conn = ctx.open_db()?;
    Ok(Json(db::list_patients(&conn, &query)?))
}

/// `POST /api/patients` — register a patient.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<PatientBody>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let (name, id_card) = match (
        required_text(body.name, "name"),
        required_text(body.id_card, "id_card"),
    ) {
        (Ok(name), Ok(id_card)) => (name, id_card),
        _ => return Err(ApiError::BadRequest("Name and ID card are required".into())),
    };
    let department = match body.department.as_deref() {
        Some(raw) => parse_department(raw)?,
        None => Default::default(),
    };

    let conn = ctx.open_db()?;
    let patient = db::insert_patient(
        &conn,
        &NewPatient {
            name,
            id_card,
            age: body.age,
            gender: body.gender,
            phone_number: body.phone_number,
            department,
        },
    )
    .map_err(id_card_conflict)?;

    tracing::info!(patient_id = patient.id, "patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `PUT /api/patients/:id` — partial update.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(body): Json<PatientBody>,
) -> Result<Json<Patient>, ApiError> {
    let department = body.department.as_deref().map(parse_department).transpose()?;
    let name = body.name.map(|n| required_text(Some(n), "name")).transpose()?;
    let id_card = body
        .id_card
        .map(|c| required_text(Some(c), "id_card"))
        .transpose()?;

    let conn = ctx.open_db()?;
    let patient = db::update_patient(
        &conn,
        id,
        &PatientChanges {
            name,
            id_card,
            age: body.age,
            gender: body.gender,
            phone_number: body.phone_number,
            department,
        },
    )
    .map_err(id_card_conflict)?;
    Ok(Json(patient))
}

/// `DELETE /api/patients/:id` — remove a patient and their records.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::delete_patient(&conn, id)?;
    tracing::info!(patient_id = id, "patient deleted");
    Ok(Json(DeletedResponse {
        message: "Patient deleted",
    }))
}

/// 404 unless the patient exists.
pub(crate) fn require_patient(
    conn: &rusqlite::Connection,
    id: i64,
) -> Result<Patient, ApiError> {
    db::get_patient(conn, id)?.ok_or_else(|| ApiError::NotFound(format!("Patient {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Department;

    fn query(page: Option<&str>, per_page: Option<&str>, department: Option<&str>) -> PatientListQuery {
        PatientListQuery {
            search: None,
            department: department.map(String::from),
            page: page.map(String::from),
            per_page: per_page.map(String::from),
        }
    }

    #[test]
    fn paging_defaults_and_clamps() {
        let q = query(None, None, None).into_query().unwrap();
        assert_eq!((q.page, q.per_page), (1, 20));

        let q = query(Some("0"), Some("500"), None).into_query().unwrap();
        assert_eq!((q.page, q.per_page), (1, 100));

        let q = query(Some("abc"), Some("-3"), None).into_query().unwrap();
        assert_eq!((q.page, q.per_page), (1, 1));
    }

    #[test]
    fn department_filter_is_validated() {
        let q = query(None, None, Some("surgery")).into_query().unwrap();
        assert_eq!(q.department, Some(Department::Surgery));
        assert!(query(None, None, Some("  ")).into_query().unwrap().department.is_none());
        assert!(matches!(
            query(None, None, Some("cardiology")).into_query(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
