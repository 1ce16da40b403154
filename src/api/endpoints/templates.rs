//! Template endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::patients::require_patient;
use super::required_text;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::{NewTemplate, Template, TemplateChanges};

#[derive(Deserialize)]
pub struct TemplateListQuery {
    pub mine: Option<String>,
}

/// `mine` is on unless it is anything other than "true".
pub(crate) fn mine_flag(raw: Option<&str>) -> bool {
    raw.map_or(true, |v| v.trim().eq_ignore_ascii_case("true"))
}

#[derive(Deserialize)]
pub struct TemplateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
    pub is_shared: Option<bool>,
}

#[derive(Deserialize, Default)]
pub struct SaveAsTemplateBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

/// Strings are stored verbatim, anything else as its JSON text.
fn stored_content(content: Value) -> String {
    match content {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn owned_template(
    conn: &rusqlite::Connection,
    id: i64,
    user: &UserContext,
    action: &str,
) -> Result<Template, ApiError> {
    let template = find_template(conn, id)?;
    if template.owner_id != user.user_id {
        return Err(ApiError::Forbidden(format!(
            "Only the owner may {action} this template"
        )));
    }
    Ok(template)
}

fn find_template(conn: &rusqlite::Connection, id: i64) -> Result<Template, ApiError> {
    db::get_template(conn, id)?.ok_or_else(|| ApiError::NotFound(format!("Template {id} not found")))
}

/// `GET /api/templates` — owned or shared, or everything with `mine=false`.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<TemplateListQuery>,
) -> Result<Json<Vec<Template>>, ApiError> {
    let conn = ctx.open_db()?;
    let mine = mine_flag(query.mine.as_deref());
    Ok(Json(db::list_templates(&conn, user.user_id, mine)?))
}

/// `POST /api/templates`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<TemplateBody>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let (name, content) = match (required_text(body.name, "name"), body.content) {
        (Ok(name), Some(content)) => (name, content),
        _ => return Err(ApiError::BadRequest("Template name and content are required".into())),
    };

    let conn = ctx.open_db()?;
    let template = db::insert_template(
        &conn,
        &NewTemplate {
            name,
            description: body.description,
            content: stored_content(content),
            owner_id: user.user_id,
            is_shared: body.is_shared.unwrap_or(false),
        },
    )?;
    tracing::info!(template_id = template.id, owner = user.user_id, "template created");
    Ok((StatusCode::CREATED, Json(template)))
}

/// `GET /api/templates/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Template>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(find_template(&conn, id)?))
}

/// `PUT /api/templates/:id` — owner only.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
    Json(body): Json<TemplateBody>,
) -> Result<Json<Template>, ApiError> {
    let conn = ctx.open_db()?;
    owned_template(&conn, id, &user, "modify")?;
    let name = body.name.map(|n| required_text(Some(n), "name")).transpose()?;

    let template = db::update_template(
        &conn,
        id,
        &TemplateChanges {
            name,
            description: body.description,
            content: body.content.map(stored_content),
            is_shared: body.is_shared,
        },
    )?;
    Ok(Json(template))
}

/// `DELETE /api/templates/:id` — owner only.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    owned_template(&conn, id, &user, "delete")?;
    db::delete_template(&conn, id)?;
    tracing::info!(template_id = id, "template deleted");
    Ok(Json(DeletedResponse {
        message: "Template deleted",
    }))
}

/// `POST /api/patients/:id/records/:rid/save_as_template`
pub async fn save_from_record(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path((patient_id, record_id)): Path<(i64, i64)>,
    body: Option<Json<SaveAsTemplateBody>>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let conn = ctx.open_db()?;
    require_patient(&conn, patient_id)?;
    let record = db::get_patient_record(&conn, patient_id, record_id)?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            format!(
                "Template - {} - {}",
                record.id,
                record.record_date.format("%Y%m%d")
            )
        });

    let mut content = serde_json::Map::new();
    if let Some(symptom) = &record.symptom {
        content.insert("symptom".into(), Value::from(symptom.as_str()));
    }
    content.insert("diagnosis".into(), Value::from(record.diagnosis.as_str()));
    content.insert(
        "treatment_plan".into(),
        Value::from(record.treatment_plan.as_str()),
    );

    let template = db::insert_template(
        &conn,
        &NewTemplate {
            name,
            description: Some(body.description.unwrap_or_default()),
            content: Value::Object(content).to_string(),
            owner_id: user.user_id,
            is_shared: false,
        },
    )?;
    tracing::info!(template_id = template.id, record_id, "record saved as template");
    Ok((StatusCode::CREATED, Json(template)))
}
