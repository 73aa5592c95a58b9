//! Owner-scoped note repository.
//!
//! Every lookup conjoins the note id with the owner id in a single
//! predicate, so a note belonging to another user is indistinguishable
//! from one that does not exist.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::analyses;
use super::{Note, NoteWithAnalysis};

/// Insert a new note for the owner. Empty title and content are valid.
pub async fn create(
    pool: &SqlitePool,
    owner_id: &str,
    title: &str,
    content: &str,
) -> sqlx::Result<Note> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO notes (id, user_id, title, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(title)
    .bind(content)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
}

/// All notes for the owner, newest first, each carrying its analysis when
/// one exists.
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: &str,
) -> sqlx::Result<Vec<NoteWithAnalysis>> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT * FROM notes WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut results = Vec::with_capacity(notes.len());
    for note in notes {
        let analysis = analyses::get_for_note(pool, &note.id).await?;
        results.push(NoteWithAnalysis::new(note, analysis.map(Into::into)));
    }
    Ok(results)
}

/// Fetch a single note. Returns None for a missing id and for an id owned
/// by someone else; callers cannot tell the two apart.
pub async fn get_by_id(
    pool: &SqlitePool,
    note_id: &str,
    owner_id: &str,
) -> sqlx::Result<Option<NoteWithAnalysis>> {
    let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ? AND user_id = ?")
        .bind(note_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

    match note {
        Some(note) => {
            let analysis = analyses::get_for_note(pool, &note.id).await?;
            Ok(Some(NoteWithAnalysis::new(note, analysis.map(Into::into))))
        }
        None => Ok(None),
    }
}

/// Rewrite title and content. Returns false when no row matched the
/// conjoined predicate. Id and owner never change.
pub async fn update(
    pool: &SqlitePool,
    note_id: &str,
    owner_id: &str,
    title: &str,
    content: &str,
) -> sqlx::Result<bool> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(title)
    .bind(content)
    .bind(&now)
    .bind(note_id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a note and its analysis. Returns false when no row matched.
///
/// The analysis is removed explicitly inside the transaction rather than
/// relying on the schema cascade alone, which only fires on connections
/// with foreign_keys enabled.
pub async fn delete(pool: &SqlitePool, note_id: &str, owner_id: &str) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM analyses WHERE note_id = ? AND note_id IN (SELECT id FROM notes WHERE id = ? AND user_id = ?)")
        .bind(note_id)
        .bind(note_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
        .bind(note_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}
