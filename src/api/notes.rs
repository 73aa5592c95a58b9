//! Note CRUD endpoints.
//!
//! Every operation runs as the authenticated owner; a note owned by
//! someone else is reported exactly like one that does not exist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{notes, CreateNoteRequest, Note, NoteWithAnalysis, UpdateNoteRequest};
use crate::AppState;

use super::auth::Identity;
use super::error::{ApiError, ApiSuccess, ValidationErrorBuilder};
use super::validation::{validate_note_content, validate_note_title, validate_uuid};

fn validate_note_fields(title: &str, content: &str) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_note_title(title) {
        errors.add("title", e);
    }
    if let Err(e) = validate_note_content(content) {
        errors.add("content", e);
    }

    errors.finish()
}

/// List the caller's notes, newest first, with analyses attached
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ApiSuccess<Vec<NoteWithAnalysis>>>, ApiError> {
    let notes = notes::list_by_owner(&state.db, &identity.user_id).await?;
    Ok(ApiSuccess::data(notes))
}

/// Fetch one of the caller's notes
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<NoteWithAnalysis>>, ApiError> {
    if let Err(e) = validate_uuid(&id, "note_id") {
        return Err(ApiError::validation_field("note_id", e));
    }

    let note = notes::get_by_id(&state.db, &id, &identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(ApiSuccess::data(note))
}

/// Create a note
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<ApiSuccess<Note>>), ApiError> {
    validate_note_fields(&req.title, &req.content)?;

    let note = notes::create(&state.db, &identity.user_id, &req.title, &req.content)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create note: {}", e);
            ApiError::database("Failed to create note")
        })?;

    Ok((StatusCode::CREATED, ApiSuccess::data(note)))
}

/// Rewrite a note's title and content
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<ApiSuccess<NoteWithAnalysis>>, ApiError> {
    if let Err(e) = validate_uuid(&id, "note_id") {
        return Err(ApiError::validation_field("note_id", e));
    }
    validate_note_fields(&req.title, &req.content)?;

    let updated = notes::update(&state.db, &id, &identity.user_id, &req.title, &req.content)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update note {}: {}", id, e);
            ApiError::database("Failed to update note")
        })?;

    if !updated {
        return Err(ApiError::not_found("Note not found"));
    }

    let note = notes::get_by_id(&state.db, &id, &identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(ApiSuccess::data(note))
}

/// Delete a note and its analysis
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    if let Err(e) = validate_uuid(&id, "note_id") {
        return Err(ApiError::validation_field("note_id", e));
    }

    let deleted = notes::delete(&state.db, &id, &identity.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete note {}: {}", id, e);
            ApiError::database("Failed to delete note")
        })?;

    if !deleted {
        return Err(ApiError::not_found("Note not found"));
    }

    Ok(ApiSuccess::empty())
}
