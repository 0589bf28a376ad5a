use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use validator::Validate;

/// A hobby after normalization: canonical tag plus semantically related terms
///
/// Only `tag` takes part in matching; `related` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedHobby {
    #[serde(rename = "hobby", alias = "tag")]
    pub tag: String,
    #[serde(default)]
    pub related: Vec<String>,
}

impl NormalizedHobby {
    pub fn new(tag: impl Into<String>, related: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            related,
        }
    }
}

/// Raw user profile as supplied by the caller
///
/// Hobby lists are free text. Every other field is opaque profile metadata
/// that is carried through to the match results untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserRecord {
    #[validate(length(min = 1))]
    #[serde(alias = "_id", alias = "userId")]
    pub id: String,
    #[serde(rename = "hobbiesKnow", alias = "hobbies_know", default)]
    pub hobbies_know: Vec<String>,
    #[serde(rename = "hobbiesWant", alias = "hobbies_want", default)]
    pub hobbies_want: Vec<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    pub fn new<K, W>(id: impl Into<String>, hobbies_know: K, hobbies_want: W) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            id: id.into(),
            hobbies_know: hobbies_know.into_iter().map(Into::into).collect(),
            hobbies_want: hobbies_want.into_iter().map(Into::into).collect(),
            profile: Map::new(),
        }
    }

    /// Attach an opaque metadata field (name, bio, avatar...)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}

/// A user's normalized hobby tags
///
/// Tags are unique and lowercase; `BTreeSet` keeps every derived list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHobbyProfile {
    pub id: String,
    #[serde(rename = "hobbiesKnow")]
    pub hobbies_know: BTreeSet<String>,
    #[serde(rename = "hobbiesWant")]
    pub hobbies_want: BTreeSet<String>,
}

impl UserHobbyProfile {
    pub fn new<K, W>(id: impl Into<String>, hobbies_know: K, hobbies_want: W) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        Self {
            id: id.into(),
            hobbies_know: tag_set(hobbies_know),
            hobbies_want: tag_set(hobbies_want),
        }
    }
}

/// Build a tag set, trimming and lowercasing each entry and dropping blanks
pub fn tag_set<I>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Bidirectional hobby overlap between the current user and one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HobbyOverlap {
    /// Tags the candidate can teach that the current user wants to learn
    pub they_know_you_want: Vec<String>,
    /// Tags the current user can teach that the candidate wants to learn
    pub they_want_you_know: Vec<String>,
}

impl HobbyOverlap {
    #[inline]
    pub fn score(&self) -> u32 {
        (self.they_know_you_want.len() + self.they_want_you_know.len()) as u32
    }
}

/// Scored match result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub user: UserHobbyProfile,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub profile: Map<String, Value>,
    pub score: u32,
    #[serde(rename = "theyKnowYouWant")]
    pub they_know_you_want: Vec<String>,
    #[serde(rename = "theyWantYouKnow")]
    pub they_want_you_know: Vec<String>,
}

impl MatchResult {
    pub fn new(user: UserHobbyProfile, profile: Map<String, Value>, overlap: HobbyOverlap) -> Self {
        Self {
            score: overlap.score(),
            user,
            profile,
            they_know_you_want: overlap.they_know_you_want,
            they_want_you_know: overlap.they_want_you_know,
        }
    }

    /// Whether this candidate can teach the given normalized tag
    #[inline]
    pub fn teaches(&self, tag: &str) -> bool {
        self.they_know_you_want.iter().any(|t| t == tag)
    }
}
