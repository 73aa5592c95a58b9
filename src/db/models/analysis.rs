//! Analysis models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Raw analysis row. The list and map fields are JSON stored in TEXT
/// columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Analysis {
    pub id: String,
    pub note_id: String,
    pub awareness_points: String,
    pub counselor_topics: String,
    pub emotion_distribution: String,
    pub created_at: String,
}

impl Analysis {
    /// Parse awareness points from the JSON column
    pub fn get_awareness_points(&self) -> Vec<String> {
        serde_json::from_str(&self.awareness_points).unwrap_or_default()
    }

    /// Parse counselor topics from the JSON column
    pub fn get_counselor_topics(&self) -> Vec<String> {
        serde_json::from_str(&self.counselor_topics).unwrap_or_default()
    }

    /// Parse the emotion label -> weight mapping from the JSON column
    pub fn get_emotion_distribution(&self) -> BTreeMap<String, f64> {
        serde_json::from_str(&self.emotion_distribution).unwrap_or_default()
    }
}

/// Analysis as exposed to clients, with the JSON columns parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub note_id: String,
    pub awareness_points: Vec<String>,
    pub counselor_topics: Vec<String>,
    pub emotion_distribution: BTreeMap<String, f64>,
    pub created_at: String,
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        let awareness_points = analysis.get_awareness_points();
        let counselor_topics = analysis.get_counselor_topics();
        let emotion_distribution = analysis.get_emotion_distribution();
        Self {
            id: analysis.id,
            note_id: analysis.note_id,
            awareness_points,
            counselor_topics,
            emotion_distribution,
            created_at: analysis.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_columns_parse() {
        let analysis = Analysis {
            id: "a1".to_string(),
            note_id: "n1".to_string(),
            awareness_points: r#"["one","two"]"#.to_string(),
            counselor_topics: r#"["topic"]"#.to_string(),
            emotion_distribution: r#"{"Stress":40.0,"Other":60.0}"#.to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        assert_eq!(analysis.get_awareness_points(), vec!["one", "two"]);
        assert_eq!(analysis.get_counselor_topics(), vec!["topic"]);
        assert_eq!(analysis.get_emotion_distribution().get("Stress"), Some(&40.0));
    }

    #[test]
    fn test_malformed_json_columns_parse_as_empty() {
        let analysis = Analysis {
            id: "a1".to_string(),
            note_id: "n1".to_string(),
            awareness_points: "not json".to_string(),
            counselor_topics: String::new(),
            emotion_distribution: "[]".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        assert!(analysis.get_awareness_points().is_empty());
        assert!(analysis.get_counselor_topics().is_empty());
        assert!(analysis.get_emotion_distribution().is_empty());
    }
}
