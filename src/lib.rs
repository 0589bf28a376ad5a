//! SkillSwap Match - hobby normalization and skill-swap matching engine
//!
//! Users list hobbies they can teach and hobbies they want to learn. Free-text
//! hobby names are normalized into canonical tags by an external completion
//! service, then every candidate in a pool is scored by how many hobbies the
//! two users can swap in either direction.

pub mod cli;
pub mod config;
pub mod core;
pub mod models;
pub mod services;

use std::sync::Arc;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::core::{MatchError, Matcher};
pub use crate::models::{MatchResult, NormalizedHobby, UserHobbyProfile, UserRecord};
pub use crate::services::{HobbyNormalizer, NormalizationError};

use crate::services::{CachedNormalizer, LlmClient, LlmError, LlmHobbyNormalizer, StaticNormalizer};

/// Build a matcher from settings
///
/// `offline` swaps the completion service for the built-in synonym table.
/// The normalization cache wraps whichever normalizer is chosen.
pub fn build_matcher(settings: &Settings, offline: bool) -> Result<Matcher, LlmError> {
    let normalizer: Arc<dyn HobbyNormalizer> = if offline {
        tracing::info!("Using offline hobby normalizer");
        Arc::new(StaticNormalizer::with_defaults())
    } else {
        let client = LlmClient::new(&settings.llm)?;
        tracing::info!("Using completion model {} at {}", client.model(), settings.llm.base_url);
        Arc::new(LlmHobbyNormalizer::new(client))
    };

    let normalizer: Arc<dyn HobbyNormalizer> = if settings.cache.enabled {
        tracing::info!(
            "Normalization cache enabled ({} entries, TTL: {}s)",
            settings.cache.capacity,
            settings.cache.ttl_secs
        );
        Arc::new(CachedNormalizer::from_settings(normalizer, &settings.cache))
    } else {
        normalizer
    };

    Ok(Matcher::new(normalizer, settings.matching.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_matcher_normalizes_synonyms() {
        let matcher = build_matcher(&Settings::default(), true).unwrap();

        let hobbies = matcher
            .normalize_hobby_list(&["Guitar Playing".to_string()])
            .await
            .unwrap();

        assert_eq!(hobbies[0].tag, "guitar");
    }

    #[test]
    fn test_online_matcher_builds_without_network() {
        let mut settings = Settings::default();
        settings.cache.enabled = true;
        settings.matching.max_results = Some(5);

        let matcher = build_matcher(&settings, false).unwrap();
        assert_eq!(matcher.settings().max_results, Some(5));
    }
}
