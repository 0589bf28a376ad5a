// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{canonical_hobby_list, filter_teachers, validate_query, QueryError};
pub use matcher::{MatchError, Matcher};
pub use scoring::{calculate_overlap, score_candidate};
