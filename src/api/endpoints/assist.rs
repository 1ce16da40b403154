//! Assist endpoints: record drafting and template suggestions.
//!
//! Generator calls are blocking, so both AI paths run on the blocking pool.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use super::patients::require_patient;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::assist::{
    DraftRequest, DraftResult, KeywordScorer, RecordDrafter, Suggestion, TemplateRecommender,
    KEYWORD_MODE_LIMIT,
};
use crate::db;

#[derive(Deserialize)]
pub struct RecordSuggestionBody {
    #[serde(flatten)]
    pub draft: DraftRequest,
    pub patient_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct TemplateSuggestionBody {
    #[serde(default)]
    pub symptom: String,
    pub mine: Option<bool>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuggestionMode {
    Ai,
    Keyword,
}

impl SuggestionMode {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("ai") => Ok(Self::Ai),
            Some("keyword") => Ok(Self::Keyword),
            Some(other) => Err(ApiError::BadRequest(format!(
                "Unknown suggestion mode: {other}"
            ))),
        }
    }
}

/// `POST /api/ai/record_suggestion`
///
/// With `patient_id`, missing age and gender are taken from the patient.
pub async fn record_suggestion(
    State(ctx): State<ApiContext>,
    Json(body): Json<RecordSuggestionBody>,
) -> Result<Json<DraftResult>, ApiError> {
    let mut request = body.draft;
    if let Some(patient_id) = body.patient_id {
        let conn = ctx.open_db()?;
        let patient = require_patient(&conn, patient_id)?;
        request.age = request.age.or(patient.age);
        request.gender = request.gender.or(patient.gender);
    }

    let generator = Arc::clone(&ctx.generator);
    let language = ctx.response_language().to_string();
    let result = tokio::task::spawn_blocking(move || {
        RecordDrafter::new(&*generator, &language).draft(&request)
    })
    .await?;

    if !result.message.is_empty() {
        tracing::info!(message = %result.message, "record draft returned a message");
    }
    Ok(Json(result))
}

/// `POST /api/ai/template_suggestions`
pub async fn template_suggestions(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<TemplateSuggestionBody>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let mode = SuggestionMode::parse(body.mode.as_deref())?;
    let mine = body.mine.unwrap_or(true);
    let templates = {
        let conn = ctx.open_db()?;
        db::list_templates(&conn, user.user_id, mine)?
    };

    let suggestions = match mode {
        SuggestionMode::Keyword => KeywordScorer::rank(&body.symptom, &templates, KEYWORD_MODE_LIMIT),
        SuggestionMode::Ai => {
            let generator = Arc::clone(&ctx.generator);
            let language = ctx.response_language().to_string();
            let symptom = body.symptom;
            tokio::task::spawn_blocking(move || {
                TemplateRecommender::new(&*generator, &language).recommend(&symptom, &templates)
            })
            .await?
        }
    };
    Ok(Json(suggestions))
}
