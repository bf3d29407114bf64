//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the education form endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HandlerError};
use crate::web::extract::JsonBody;
use crate::web::state::{AppState, SessionId};
use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use diabetes_education_core::{
    domain::{validate_activity_minutes, validate_sleep_hours},
    ports::{PortError, SummaryDocument},
    prompt::build_summary_request,
    reference::{ReferenceMaterial, REFERENCE_MATERIAL},
    compute_lifestyle_scores, split_sections, tally_survey_answers, DeliveryRoute, DiabetesType,
    DietAdherence, FastingRange, LifestyleScores, MonitoringFrequency, PreferenceRecord,
    ProfileForm, ProfileInput, SummarySection, SurveyAnswer, TherapyType, Topic, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        form_options_handler,
        reference_handler,
        lifestyle_scores_handler,
        create_summary_handler,
        export_pdf_handler,
        save_preference_handler,
        preference_tally_handler,
    ),
    components(
        schemas(
            HealthResponse, FormOptions, ChoiceOption, LifestylePayload, ScoresResponse,
            ChartBar, SummaryPayload, SummaryResponse, PdfPayload, PreferencePayload,
            PreferenceResponse, TallyResponse, ErrorBody
        )
    ),
    tags(
        (name = "Diabetes Education API", description = "Backend for the patient education summary form.")
    )
)]
pub struct ApiDoc;

pub const PDF_FILENAME: &str = "diabetes-education-summary.pdf";
pub const DEFAULT_PDF_TITLE: &str = "Your Diabetes Education Summary";

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// One selectable value of a form field.
#[derive(Serialize, ToSchema)]
pub struct ChoiceOption {
    value: String,
    label: String,
}

/// Every choice list the form renders.
#[derive(Serialize, ToSchema)]
pub struct FormOptions {
    diabetes_types: Vec<ChoiceOption>,
    therapy_types: Vec<ChoiceOption>,
    fasting_ranges: Vec<ChoiceOption>,
    routes: Vec<ChoiceOption>,
    diet_adherence: Vec<ChoiceOption>,
    monitoring_frequencies: Vec<ChoiceOption>,
    topics: Vec<ChoiceOption>,
    default_topics: Vec<String>,
    survey_answers: Vec<ChoiceOption>,
}

/// The lifestyle subset of the form, scored on its own for the live chart.
#[derive(Deserialize, ToSchema)]
pub struct LifestylePayload {
    activity_minutes: i64,
    #[serde(default)]
    sleep_hours: Option<f64>,
    #[schema(value_type = String)]
    diet_adherence: DietAdherence,
    #[schema(value_type = String)]
    monitoring_frequency: MonitoringFrequency,
}

#[derive(Serialize, ToSchema)]
pub struct ChartBar {
    label: String,
    score: u8,
}

#[derive(Serialize, ToSchema)]
pub struct ScoresResponse {
    #[schema(value_type = Object)]
    scores: LifestyleScores,
    chart: Vec<ChartBar>,
}

#[derive(Deserialize, ToSchema)]
pub struct SummaryPayload {
    /// The patient confirmed the summary is education only, not medical advice.
    consent: bool,
    #[schema(value_type = Object)]
    profile: ProfileForm,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    session_id: Uuid,
    generated_at: DateTime<Utc>,
    summary_text: String,
    #[schema(value_type = Vec<Object>)]
    sections: Vec<SummarySection>,
    #[schema(value_type = Object)]
    scores: LifestyleScores,
    chart: Vec<ChartBar>,
    focus_areas: Vec<String>,
    /// False when the preference log could not be written; the summary is still valid.
    logged: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct PdfPayload {
    summary_text: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    generated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct PreferencePayload {
    #[schema(value_type = String)]
    consider_buccal: SurveyAnswer,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    profile: Option<ProfileForm>,
}

#[derive(Serialize, ToSchema)]
pub struct PreferenceResponse {
    session_id: Uuid,
    saved: bool,
}

#[derive(Serialize, ToSchema)]
pub struct TallyResponse {
    yes: usize,
    no: usize,
    unsure: usize,
    answered: usize,
    total_records: usize,
}

fn choices<T: Copy>(
    all: &[T],
    describe: impl Fn(T) -> (&'static str, &'static str),
) -> Vec<ChoiceOption> {
    all.iter()
        .map(|choice| {
            let (value, label) = describe(*choice);
            ChoiceOption {
                value: value.to_string(),
                label: label.to_string(),
            }
        })
        .collect()
}

fn chart_for(scores: &LifestyleScores) -> Vec<ChartBar> {
    scores
        .bars()
        .iter()
        .map(|(label, score)| ChartBar {
            label: label.to_string(),
            score: *score,
        })
        .collect()
}

/// Appends a record, logging rather than propagating a failure so the
/// patient still sees the content that was already produced.
async fn log_record(app_state: &AppState, record: PreferenceRecord) -> bool {
    let session_id = record.session_id;
    match app_state.preference_store.append_record(record).await {
        Ok(()) => true,
        Err(e) => {
            error!(session_id = %session_id, "Failed to append preference record: {}", e);
            false
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// List the choices for every form field.
#[utoipa::path(
    get,
    path = "/form/options",
    responses((status = 200, description = "Form choice lists", body = FormOptions))
)]
pub async fn form_options_handler() -> Json<FormOptions> {
    Json(FormOptions {
        diabetes_types: choices(DiabetesType::ALL, |c| (c.value(), c.label())),
        therapy_types: choices(TherapyType::ALL, |c| (c.value(), c.label())),
        fasting_ranges: choices(FastingRange::ALL, |c| (c.value(), c.label())),
        routes: choices(DeliveryRoute::ALL, |c| (c.value(), c.label())),
        diet_adherence: choices(DietAdherence::ALL, |c| (c.value(), c.label())),
        monitoring_frequencies: choices(MonitoringFrequency::ALL, |c| (c.value(), c.label())),
        topics: choices(Topic::ALL, |c| (c.value(), c.label())),
        default_topics: Topic::DEFAULTS.iter().map(|t| t.value().to_string()).collect(),
        survey_answers: choices(SurveyAnswer::ALL, |c| (c.value(), c.label())),
    })
}

/// Static reference material shown beside every summary.
#[utoipa::path(
    get,
    path = "/reference",
    responses((status = 200, description = "ADA targets, safety rules and references"))
)]
pub async fn reference_handler() -> Json<ReferenceMaterial> {
    Json(REFERENCE_MATERIAL)
}

/// Score the lifestyle answers for the bar chart.
#[utoipa::path(
    post,
    path = "/lifestyle/scores",
    request_body = LifestylePayload,
    responses(
        (status = 200, description = "Lifestyle scores", body = ScoresResponse),
        (status = 422, description = "Out-of-range input", body = ErrorBody)
    )
)]
pub async fn lifestyle_scores_handler(
    JsonBody(payload): JsonBody<LifestylePayload>,
) -> Result<Json<ScoresResponse>, HandlerError> {
    let activity_minutes = validate_activity_minutes(payload.activity_minutes)?;
    let sleep_hours = validate_sleep_hours(payload.sleep_hours)?;
    let scores = compute_lifestyle_scores(
        activity_minutes,
        sleep_hours,
        payload.diet_adherence,
        payload.monitoring_frequency,
    );
    Ok(Json(ScoresResponse {
        chart: chart_for(&scores),
        scores,
    }))
}

/// Generate an education summary for a submitted profile.
///
/// The summary is returned even if the preference log cannot be written.
#[utoipa::path(
    post,
    path = "/summaries",
    request_body = SummaryPayload,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 400, description = "Consent not given", body = ErrorBody),
        (status = 422, description = "Invalid profile", body = ErrorBody),
        (status = 429, description = "Language model quota exceeded", body = ErrorBody),
        (status = 502, description = "Language model authentication or other failure", body = ErrorBody),
        (status = 504, description = "Language model timed out", body = ErrorBody)
    )
)]
pub async fn create_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    JsonBody(payload): JsonBody<SummaryPayload>,
) -> Result<Json<SummaryResponse>, HandlerError> {
    // 1. Gate on consent and validate before anything leaves the process
    if !payload.consent {
        return Err(HandlerError::ConsentRequired);
    }
    let profile = ProfileInput::try_from(payload.profile)?;

    // 2. Score and build the prompt
    let scores = LifestyleScores::for_profile(&profile);
    let generated_at = Utc::now();
    let request = build_summary_request(&profile, &scores, generated_at);

    // 3. Ask the language model
    let summary_text = app_state.summary_adapter.generate_summary(&request).await?;
    let sections = split_sections(&summary_text);
    if sections.is_empty() {
        warn!(session_id = %session_id, "Generated summary contained no numbered headings");
    }

    // 4. Log the event; a failure here must not hide the summary
    let record = PreferenceRecord::summary_generated(session_id.0, &profile, generated_at);
    let logged = log_record(&app_state, record).await;

    info!(
        session_id = %session_id,
        sections = sections.len(),
        "Education summary generated"
    );

    Ok(Json(SummaryResponse {
        session_id: session_id.0,
        generated_at,
        summary_text,
        sections,
        chart: chart_for(&scores),
        scores,
        focus_areas: profile.topics().map(|t| t.label().to_string()).collect(),
        logged,
    }))
}

/// Download a summary as a PDF.
#[utoipa::path(
    post,
    path = "/summaries/pdf",
    request_body = PdfPayload,
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 422, description = "Empty summary", body = ErrorBody)
    )
)]
pub async fn export_pdf_handler(
    State(app_state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<PdfPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.summary_text.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "summary_text",
        }
        .into());
    }

    let document = SummaryDocument {
        title: payload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PDF_TITLE.to_string()),
        generated_at: payload.generated_at.unwrap_or_else(Utc::now),
        text: payload.summary_text,
    };

    let renderer = Arc::clone(&app_state.renderer);
    let content_type = renderer.content_type();
    let pdf = tokio::task::spawn_blocking(move || renderer.render_summary(&document))
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))??;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", PDF_FILENAME),
            ),
        ],
        Bytes::from(pdf),
    ))
}

/// Record the patient's answer to the delivery-option survey.
#[utoipa::path(
    post,
    path = "/preferences",
    request_body = PreferencePayload,
    responses(
        (status = 201, description = "Preference recorded", body = PreferenceResponse),
        (status = 202, description = "Accepted but the log could not be written", body = PreferenceResponse),
        (status = 422, description = "Invalid profile", body = ErrorBody)
    )
)]
pub async fn save_preference_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    JsonBody(payload): JsonBody<PreferencePayload>,
) -> Result<impl IntoResponse, HandlerError> {
    let profile = payload.profile.map(ProfileInput::try_from).transpose()?;

    let record = PreferenceRecord::preference_saved(
        session_id.0,
        payload.consider_buccal,
        payload.comment,
        profile.as_ref(),
        Utc::now(),
    );
    let saved = log_record(&app_state, record).await;
    let status = if saved {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };

    Ok((
        status,
        Json(PreferenceResponse {
            session_id: session_id.0,
            saved,
        }),
    ))
}

/// Count survey answers across the preference log.
#[utoipa::path(
    get,
    path = "/preferences/tally",
    responses(
        (status = 200, description = "Survey answer counts", body = TallyResponse),
        (status = 500, description = "Log could not be read", body = ErrorBody)
    )
)]
pub async fn preference_tally_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TallyResponse>, HandlerError> {
    let records = app_state.preference_store.read_records().await?;
    let tally = tally_survey_answers(&records);
    Ok(Json(TallyResponse {
        yes: tally.yes,
        no: tally.no,
        unsure: tally.unsure,
        answered: tally.answered(),
        total_records: tally.total_records,
    }))
}
