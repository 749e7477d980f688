//! Video-generation outcome records.
//!
//! One of these is serialized into `dreams.video_metadata` after every
//! orchestration attempt, success or failure, so the last known outcome
//! is always readable alongside the dream state.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Recorded when an orchestration run fully succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generated_at: Timestamp,
    /// Render-pipeline cost estimate, in the pipeline's currency unit.
    pub cost_estimate: f64,
    /// Opaque metadata reported by the rendering pipeline.
    pub pipeline: serde_json::Value,
    pub transcript_chars: usize,
    pub segment_count: usize,
}

/// Recorded when an orchestration run fails; the dream stays `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub error: String,
    pub failed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_record_round_trips_through_json() {
        let failure = GenerationFailure {
            error: "render service unreachable".into(),
            failed_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["error"], "render service unreachable");
        let back: GenerationFailure = serde_json::from_value(value).unwrap();
        assert_eq!(back.error, failure.error);
    }

    #[test]
    fn success_record_serializes_expected_fields() {
        let record = GenerationRecord {
            generated_at: chrono::Utc::now(),
            cost_estimate: 0.42,
            pipeline: serde_json::json!({ "frames": 120 }),
            transcript_chars: 11,
            segment_count: 2,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["cost_estimate"], 0.42);
        assert_eq!(value["pipeline"]["frames"], 120);
        assert_eq!(value["segment_count"], 2);
    }
}
