use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};
use crate::models::domain::UserRecord;

/// Request to rank a candidate pool against the current user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(nested)]
    #[serde(alias = "current_user", rename = "currentUser")]
    pub current_user: UserRecord,
    #[serde(default)]
    pub candidates: Vec<UserRecord>,
}

impl MatchRequest {
    /// Validate the current user and every candidate in the pool
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        for candidate in &self.candidates {
            candidate.validate()?;
        }
        Ok(())
    }
}

/// Request to find candidates who can teach one hobby
///
/// A blank `hobby` is accepted here; the search treats it as "no results".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub pool: MatchRequest,
    #[serde(default)]
    pub hobby: String,
}

impl SearchRequest {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.pool.validate_all()
    }
}
