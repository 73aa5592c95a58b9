//! Note analysis endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{analyses, notes, AnalysisResponse};
use crate::AppState;

use super::auth::Identity;
use super::error::{ApiError, ApiSuccess};
use super::validation::validate_uuid;

/// Run the analyzer over a note and persist the result. Re-analysis
/// replaces the previous record.
pub async fn create_analysis(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiSuccess<AnalysisResponse>>), ApiError> {
    if let Err(e) = validate_uuid(&id, "note_id") {
        return Err(ApiError::validation_field("note_id", e));
    }

    // The caller must own the note being analyzed
    let note = notes::get_by_id(&state.db, &id, &identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    let result = state.analyzer.analyze(&note.content).await.map_err(|e| {
        tracing::error!("Analysis failed for note {}: {}", id, e);
        ApiError::internal("Analysis is currently unavailable")
    })?;

    let analysis = analyses::record(
        &state.db,
        &id,
        &result.awareness_points,
        &result.counselor_topics,
        &result.emotion_distribution,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to record analysis for note {}: {}", id, e);
        ApiError::database("Failed to save analysis")
    })?;

    Ok((StatusCode::CREATED, ApiSuccess::data(analysis.into())))
}
