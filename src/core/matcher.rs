use crate::config::MatchingSettings;
use crate::core::{
    filters::{canonical_hobby_list, filter_teachers, validate_query},
    scoring::score_candidate,
};
use crate::models::{tag_set, MatchResponse, MatchResult, NormalizedHobby, UserHobbyProfile, UserRecord};
use crate::services::{HobbyNormalizer, NormalizationError};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Errors that abort a ranking or search
#[derive(Debug, Error)]
pub enum MatchError {
    /// The current user's hobbies, or the search query, failed to normalize
    #[error("Failed to normalize hobbies: {0}")]
    Normalization(#[from] NormalizationError),

    /// One candidate's hobbies failed to normalize and failures are not isolated
    #[error("Failed to normalize hobbies for candidate {user_id}: {source}")]
    Candidate {
        user_id: String,
        #[source]
        source: NormalizationError,
    },
}

type TagOutcome = Result<BTreeSet<String>, NormalizationError>;

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Normalize the current user's want and know lists
/// 2. Normalize every distinct candidate list (deduplicated, bounded concurrency)
/// 3. Score each candidate and drop zero scores
/// 4. Stable sort by score, descending
///
/// Search runs the same pipeline and keeps the candidates who can teach the
/// normalized query hobby.
#[derive(Clone)]
pub struct Matcher {
    normalizer: Arc<dyn HobbyNormalizer>,
    settings: MatchingSettings,
}

impl Matcher {
    pub fn new(normalizer: Arc<dyn HobbyNormalizer>, settings: MatchingSettings) -> Self {
        Self {
            normalizer,
            settings,
        }
    }

    pub fn with_default_settings(normalizer: Arc<dyn HobbyNormalizer>) -> Self {
        Self::new(normalizer, MatchingSettings::default())
    }

    pub fn settings(&self) -> &MatchingSettings {
        &self.settings
    }

    /// Normalize a raw hobby list as-is, for client-side tagging
    pub async fn normalize_hobby_list(
        &self,
        raw_hobbies: &[String],
    ) -> Result<Vec<NormalizedHobby>, NormalizationError> {
        self.normalizer.normalize(raw_hobbies).await
    }

    /// Rank a candidate pool against the current user and wrap the result
    pub async fn compute_matches(
        &self,
        current: &UserRecord,
        pool: &[UserRecord],
    ) -> Result<MatchResponse, MatchError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "compute_matches",
            request_id = %request_id,
            user_id = %current.id,
            pool = pool.len()
        );

        async move {
            let matches = self.rank(current, pool).await?;

            tracing::info!(
                "Returning {} matches for user {} (from {} candidates)",
                matches.len(),
                current.id,
                pool.len()
            );

            Ok::<_, MatchError>(response(matches, pool.len(), request_id))
        }
        .instrument(span)
        .await
    }

    /// Search the pool for candidates who can teach `hobby` and wrap the result
    pub async fn search_teachers(
        &self,
        current: &UserRecord,
        pool: &[UserRecord],
        hobby: &str,
    ) -> Result<MatchResponse, MatchError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "search_teachers",
            request_id = %request_id,
            user_id = %current.id,
            pool = pool.len(),
            hobby = %hobby
        );

        async move {
            let matches = self.search(current, pool, hobby).await?;

            tracing::info!(
                "Found {} teachers for user {} (from {} candidates)",
                matches.len(),
                current.id,
                pool.len()
            );

            Ok::<_, MatchError>(response(matches, pool.len(), request_id))
        }
        .instrument(span)
        .await
    }

    /// Rank a candidate pool against the current user
    ///
    /// The current user (matched by id) is never part of the output, and
    /// candidates with no overlap are dropped. Equal scores keep pool order.
    pub async fn rank(
        &self,
        current: &UserRecord,
        pool: &[UserRecord],
    ) -> Result<Vec<MatchResult>, MatchError> {
        let mut matches = self.rank_all(current, pool).await?;
        self.apply_limit(&mut matches);
        Ok(matches)
    }

    /// Rank the pool, keeping only candidates who can teach `query`
    ///
    /// A blank query is logged and yields no results without contacting the
    /// normalizer. The query is case-insensitive.
    pub async fn search(
        &self,
        current: &UserRecord,
        pool: &[UserRecord],
        query: &str,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let query = match validate_query(query) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("Rejected hobby search for user {}: {}", current.id, e);
                return Ok(Vec::new());
            }
        };

        let tag = self
            .normalizer
            .normalize(std::slice::from_ref(&query))
            .await?
            .into_iter()
            .map(|h| h.tag.trim().to_lowercase())
            .find(|t| !t.is_empty());

        let Some(tag) = tag else {
            tracing::info!("Search hobby {:?} normalized to nothing", query);
            return Ok(Vec::new());
        };

        tracing::debug!("Search hobby {:?} normalized to {:?}", query, tag);

        let ranked = self.rank_all(current, pool).await?;
        let mut teachers = filter_teachers(ranked, &tag);
        self.apply_limit(&mut teachers);

        Ok(teachers)
    }

    async fn rank_all(
        &self,
        current: &UserRecord,
        pool: &[UserRecord],
    ) -> Result<Vec<MatchResult>, MatchError> {
        let current_profile = self.hobby_profile(current).await?;

        // Exclude self before any normalization work
        let candidates: Vec<&UserRecord> = pool.iter().filter(|c| c.id != current.id).collect();

        // Distinct canonical lists, in first-seen order
        let mut lists: Vec<Vec<String>> = Vec::new();
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let slots: Vec<(usize, usize)> = candidates
            .iter()
            .map(|c| {
                let know = intern(&mut lists, &mut index, canonical_hobby_list(&c.hobbies_know));
                let want = intern(&mut lists, &mut index, canonical_hobby_list(&c.hobbies_want));
                (know, want)
            })
            .collect();

        tracing::debug!(
            "Normalizing {} distinct hobby lists for {} candidates",
            lists.len(),
            candidates.len()
        );

        let mut outcomes: Vec<TagOutcome> = stream::iter(lists.iter())
            .map(|list| self.normalize_canonical(list))
            .buffered(self.settings.max_concurrent_normalizations.max(1))
            .collect()
            .await;

        if !self.settings.isolate_candidate_failures {
            let failure = candidates.iter().zip(&slots).find_map(|(c, &(know, want))| {
                [know, want]
                    .into_iter()
                    .find(|&slot| outcomes[slot].is_err())
                    .map(|slot| (c.id.clone(), slot))
            });

            if let Some((user_id, slot)) = failure {
                if let Err(source) = outcomes.swap_remove(slot) {
                    tracing::error!("Aborting ranking, candidate {} failed: {}", user_id, source);
                    return Err(MatchError::Candidate { user_id, source });
                }
            }
        }

        let mut matches: Vec<MatchResult> = candidates
            .into_iter()
            .zip(slots)
            .filter_map(|(candidate, (know, want))| {
                let (Ok(hobbies_know), Ok(hobbies_want)) = (&outcomes[know], &outcomes[want]) else {
                    if let Some(e) = outcomes[know].as_ref().err().or(outcomes[want].as_ref().err()) {
                        tracing::warn!("Skipping candidate {}: {}", candidate.id, e);
                    }
                    return None;
                };

                let profile = UserHobbyProfile {
                    id: candidate.id.clone(),
                    hobbies_know: hobbies_know.clone(),
                    hobbies_want: hobbies_want.clone(),
                };

                score_candidate(&current_profile, &profile)
                    .map(|overlap| MatchResult::new(profile, candidate.profile.clone(), overlap))
            })
            .collect();

        // Stable: equal scores keep pool order
        matches.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(matches)
    }

    /// Normalize both of a user's lists into tag sets
    async fn hobby_profile(&self, user: &UserRecord) -> Result<UserHobbyProfile, NormalizationError> {
        let want = canonical_hobby_list(&user.hobbies_want);
        let know = canonical_hobby_list(&user.hobbies_know);

        let (hobbies_want, hobbies_know) =
            futures::try_join!(self.normalize_canonical(&want), self.normalize_canonical(&know))?;

        Ok(UserHobbyProfile {
            id: user.id.clone(),
            hobbies_know,
            hobbies_want,
        })
    }

    async fn normalize_canonical(&self, list: &[String]) -> TagOutcome {
        if list.is_empty() {
            return Ok(BTreeSet::new());
        }

        let hobbies = self.normalizer.normalize(list).await?;
        Ok(tag_set(hobbies.iter().map(|h| h.tag.as_str())))
    }

    fn apply_limit(&self, matches: &mut Vec<MatchResult>) {
        if let Some(limit) = self.settings.max_results {
            matches.truncate(limit);
        }
    }
}

fn intern(lists: &mut Vec<Vec<String>>, index: &mut HashMap<Vec<String>, usize>, list: Vec<String>) -> usize {
    *index.entry(list).or_insert_with_key(|list| {
        lists.push(list.clone());
        lists.len() - 1
    })
}

fn response(matches: Vec<MatchResult>, total_candidates: usize, request_id: String) -> MatchResponse {
    MatchResponse {
        matches,
        total_candidates,
        request_id,
        generated_at: chrono::Utc::now(),
    }
}
