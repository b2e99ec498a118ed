use crate::{error::Result, AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ByExam {
    pub exam_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ByCourse {
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BySubject {
    pub subject_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ByUnit {
    pub unit_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ByChapter {
    pub chapter_id: Uuid,
}

pub async fn list_exams(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.exams().await?))
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ByExam>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.courses(query.exam_id).await?))
}

pub async fn list_subjects(
    State(state): State<AppState>,
    Query(query): Query<ByCourse>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.subjects(query.course_id).await?))
}

pub async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<BySubject>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.units(query.subject_id).await?))
}

pub async fn list_chapters(
    State(state): State<AppState>,
    Query(query): Query<ByUnit>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.chapters(query.unit_id).await?))
}

pub async fn list_topics(
    State(state): State<AppState>,
    Query(query): Query<ByChapter>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.topics(query.chapter_id).await?))
}

pub async fn list_parts(
    State(state): State<AppState>,
    Query(query): Query<ByCourse>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.parts(query.course_id).await?))
}

pub async fn list_slots(
    State(state): State<AppState>,
    Query(query): Query<ByCourse>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.taxonomy_service.slots(query.course_id).await?))
}
