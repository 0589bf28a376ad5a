use crate::models::{HobbyOverlap, UserHobbyProfile};

/// Compute the bidirectional hobby overlap between two users
///
/// - `they_know_you_want` = candidate.knows ∩ current.wants
/// - `they_want_you_know` = candidate.wants ∩ current.knows
///
/// Tags compare by exact equality. Both lists come out sorted because the
/// profiles hold their tags in ordered sets.
pub fn calculate_overlap(current: &UserHobbyProfile, candidate: &UserHobbyProfile) -> HobbyOverlap {
    HobbyOverlap {
        they_know_you_want: candidate
            .hobbies_know
            .intersection(&current.hobbies_want)
            .cloned()
            .collect(),
        they_want_you_know: candidate
            .hobbies_want
            .intersection(&current.hobbies_know)
            .cloned()
            .collect(),
    }
}

/// Score a candidate against the current user
///
/// Returns `None` when nothing overlaps; zero-score candidates never make it
/// into a match list.
#[inline]
pub fn score_candidate(current: &UserHobbyProfile, candidate: &UserHobbyProfile) -> Option<HobbyOverlap> {
    let overlap = calculate_overlap(current, candidate);
    if overlap.score() == 0 {
        None
    } else {
        Some(overlap)
    }
}
