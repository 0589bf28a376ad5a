use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, NormalizedHobby};

/// Response for ranking and search operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Response for hobby normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub hobbies: Vec<NormalizedHobby>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
