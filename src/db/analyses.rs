//! Analysis persistence. One record per note; re-analysis replaces it.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::Analysis;

/// Persist an analysis for a note, replacing any previous record.
pub async fn record(
    pool: &SqlitePool,
    note_id: &str,
    awareness_points: &[String],
    counselor_topics: &[String],
    emotion_distribution: &BTreeMap<String, f64>,
) -> sqlx::Result<Analysis> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let points = serde_json::to_string(awareness_points).unwrap_or_else(|_| "[]".to_string());
    let topics = serde_json::to_string(counselor_topics).unwrap_or_else(|_| "[]".to_string());
    let emotions = serde_json::to_string(emotion_distribution).unwrap_or_else(|_| "{}".to_string());

    sqlx::query(
        r#"
        INSERT INTO analyses (id, note_id, awareness_points, counselor_topics, emotion_distribution, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(note_id) DO UPDATE SET
            awareness_points = excluded.awareness_points,
            counselor_topics = excluded.counselor_topics,
            emotion_distribution = excluded.emotion_distribution,
            created_at = excluded.created_at
        "#,
    )
    .bind(&id)
    .bind(note_id)
    .bind(&points)
    .bind(&topics)
    .bind(&emotions)
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Analysis>("SELECT * FROM analyses WHERE note_id = ?")
        .bind(note_id)
        .fetch_one(pool)
        .await
}

pub async fn get_for_note(pool: &SqlitePool, note_id: &str) -> sqlx::Result<Option<Analysis>> {
    sqlx::query_as::<_, Analysis>("SELECT * FROM analyses WHERE note_id = ?")
        .bind(note_id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::notes;
    use crate::db::notes::tests::{seed_user, test_pool};

    fn sample_emotions() -> BTreeMap<String, f64> {
        let mut emotions = BTreeMap::new();
        emotions.insert("Stress".to_string(), 40.0);
        emotions.insert("Other".to_string(), 60.0);
        emotions
    }

    #[tokio::test]
    async fn test_record_then_fetch() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        let note = notes::create(&pool, "alice", "T", "C").await.unwrap();

        let points = vec!["point".to_string()];
        let topics = vec!["topic".to_string()];
        let analysis = record(&pool, &note.id, &points, &topics, &sample_emotions())
            .await
            .unwrap();

        assert_eq!(analysis.note_id, note.id);
        assert_eq!(analysis.get_awareness_points(), points);
        assert_eq!(analysis.get_counselor_topics(), topics);
        assert_eq!(analysis.get_emotion_distribution(), sample_emotions());

        let fetched = get_for_note(&pool, &note.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, analysis.id);
    }

    #[tokio::test]
    async fn test_reanalysis_replaces_previous_record() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        let note = notes::create(&pool, "alice", "T", "C").await.unwrap();

        let first = record(
            &pool,
            &note.id,
            &["old".to_string()],
            &[],
            &sample_emotions(),
        )
        .await
        .unwrap();
        let second = record(
            &pool,
            &note.id,
            &["new".to_string()],
            &[],
            &sample_emotions(),
        )
        .await
        .unwrap();

        // Same row, updated in place
        assert_eq!(second.id, first.id);
        assert_eq!(second.get_awareness_points(), vec!["new"]);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analyses WHERE note_id = ?")
            .bind(&note.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_note_deletion_removes_analysis() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        let note = notes::create(&pool, "alice", "T", "C").await.unwrap();

        record(&pool, &note.id, &[], &[], &sample_emotions())
            .await
            .unwrap();
        assert!(notes::delete(&pool, &note.id, "alice").await.unwrap());

        assert!(get_for_note(&pool, &note.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notes_list_carries_analysis() {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        let analyzed = notes::create(&pool, "alice", "analyzed", "").await.unwrap();
        let plain = notes::create(&pool, "alice", "plain", "").await.unwrap();

        record(
            &pool,
            &analyzed.id,
            &["point".to_string()],
            &[],
            &sample_emotions(),
        )
        .await
        .unwrap();

        let listed = notes::list_by_owner(&pool, "alice").await.unwrap();
        let analyzed_row = listed.iter().find(|n| n.id == analyzed.id).unwrap();
        let plain_row = listed.iter().find(|n| n.id == plain.id).unwrap();

        assert!(analyzed_row.analysis.is_some());
        assert!(plain_row.analysis.is_none());
    }
}
