use crate::{
    dto::generation_dto::{GenerateQuestionsPayload, GenerateQuestionsResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};
use axum::{extract::State, response::IntoResponse, Extension, Json};
use validator::Validate;

/// POST /api/questions/generate
///
/// The auth middleware has already resolved the bearer token into Claims;
/// everything after owner resolution is the linear generation pipeline.
#[axum::debug_handler]
pub async fn generate_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateQuestionsPayload>,
) -> Result<impl IntoResponse> {
    let owner = claims
        .owner_id()
        .ok_or_else(|| Error::Unauthorized("invalid subject claim".to_string()))?;

    payload.validate()?;
    let config = crate::config::get_config();
    let request = payload.into_request(config.max_generated_questions)?;

    let count = state.generation_service.generate(owner, &request).await?;

    Ok(Json(GenerateQuestionsResponse {
        message: "Questions generated and saved successfully!".to_string(),
        count,
    }))
}
