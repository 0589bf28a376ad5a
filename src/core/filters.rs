use crate::models::MatchResult;
use thiserror::Error;

/// Rejected hobby search query
///
/// Search treats this as "no results" rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("search hobby must not be blank")]
    Blank,
}

/// Validate a search query, returning its trimmed lowercase form
pub fn validate_query(query: &str) -> Result<String, QueryError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(QueryError::Blank);
    }
    Ok(query.to_lowercase())
}

/// Canonical form of a raw hobby list
///
/// Trimmed, lowercased, blanks dropped, sorted and deduplicated. Two users
/// listing the same hobbies in a different order or case produce the same
/// list, which is what lets a ranking normalize each distinct list once.
pub fn canonical_hobby_list(raw: &[String]) -> Vec<String> {
    let mut list: Vec<String> = raw
        .iter()
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty())
        .collect();
    list.sort();
    list.dedup();
    list
}

/// Keep only the matches who can teach `tag`
pub fn filter_teachers(matches: Vec<MatchResult>, tag: &str) -> Vec<MatchResult> {
    matches.into_iter().filter(|m| m.teaches(tag)).collect()
}
