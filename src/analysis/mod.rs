//! Content analysis boundary.
//!
//! The engine that inspects journal content lives behind a trait so the
//! backing implementation can change without touching the HTTP layer. The
//! only implementation today is a mock that waits out a fixed delay and
//! returns a static result set.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analysis engine unavailable: {0}")]
    Unavailable(String),
}

/// Result of analyzing a note's content.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub awareness_points: Vec<String>,
    pub counselor_topics: Vec<String>,
    /// Emotion label -> percentage weight.
    pub emotion_distribution: BTreeMap<String, f64>,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, content: &str) -> Result<AnalysisResult, AnalyzerError>;
}

/// Stand-in analyzer. Ignores the content entirely.
pub struct MockAnalyzer {
    delay: Duration,
}

impl MockAnalyzer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, _content: &str) -> Result<AnalysisResult, AnalyzerError> {
        tokio::time::sleep(self.delay).await;

        let mut emotion_distribution = BTreeMap::new();
        emotion_distribution.insert("Stress".to_string(), 40.0);
        emotion_distribution.insert("Happiness".to_string(), 30.0);
        emotion_distribution.insert("Anxiety".to_string(), 20.0);
        emotion_distribution.insert("Other".to_string(), 10.0);

        Ok(AnalysisResult {
            awareness_points: vec![
                "Sensitivity around work-life balance".to_string(),
                "Heightened need for control in uncertain moments".to_string(),
                "Energy dips after social interaction".to_string(),
            ],
            counselor_topics: vec![
                "Recurring symbols in last week's dream".to_string(),
                "Difficulty with boundary-setting practices".to_string(),
            ],
            emotion_distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_analyzer_returns_fixed_result() {
        let analyzer = MockAnalyzer::new(0);
        let result = analyzer.analyze("anything at all").await.unwrap();

        assert_eq!(result.awareness_points.len(), 3);
        assert_eq!(result.counselor_topics.len(), 2);

        let total: f64 = result.emotion_distribution.values().sum();
        assert_eq!(total, 100.0);
    }

    #[tokio::test]
    async fn test_mock_analyzer_is_content_independent() {
        let analyzer = MockAnalyzer::new(0);
        let a = analyzer.analyze("").await.unwrap();
        let b = analyzer.analyze("a completely different entry").await.unwrap();

        assert_eq!(a.awareness_points, b.awareness_points);
        assert_eq!(a.emotion_distribution, b.emotion_distribution);
    }
}
