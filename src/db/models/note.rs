//! Note models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::analysis::AnalysisResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Note with its analysis attached, for list and detail views.
#[derive(Debug, Clone, Serialize)]
pub struct NoteWithAnalysis {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub analysis: Option<AnalysisResponse>,
}

impl NoteWithAnalysis {
    pub fn new(note: Note, analysis: Option<AnalysisResponse>) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
            analysis,
        }
    }
}

/// Both fields default to empty: a note saved before the user types
/// anything is legal.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}
