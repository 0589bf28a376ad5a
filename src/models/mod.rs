// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{tag_set, HobbyOverlap, MatchResult, NormalizedHobby, UserHobbyProfile, UserRecord};
pub use requests::{MatchRequest, SearchRequest};
pub use responses::{ErrorResponse, MatchResponse, NormalizeResponse};
