// Unit tests for SkillSwap Match

use skillswap_match::core::{
    calculate_overlap, canonical_hobby_list, score_candidate, validate_query, QueryError,
};
use skillswap_match::models::UserHobbyProfile;
use skillswap_match::services::{
    extract_json_array, parse_normalized, HobbyNormalizer, NormalizationError, StaticNormalizer,
};

fn profile(id: &str, know: &[&str], want: &[&str]) -> UserHobbyProfile {
    UserHobbyProfile::new(id, know.iter().copied(), want.iter().copied())
}

#[test]
fn test_overlap_independent_of_input_order() {
    let current = profile("me", &["coding", "soccer"], &["guitar", "cooking"]);
    let a = profile("a", &["guitar", "cooking", "tennis"], &["soccer"]);
    let b = profile("b", &["tennis", "cooking", "guitar"], &["soccer"]);

    assert_eq!(calculate_overlap(&current, &a), calculate_overlap(&current, &b));
}

#[test]
fn test_score_is_sum_of_both_intersections() {
    let users = [
        profile("u1", &["guitar", "chess"], &["coding"]),
        profile("u2", &["coding", "soccer"], &["guitar", "cooking"]),
        profile("u3", &["cooking"], &["chess", "soccer"]),
        profile("u4", &["tennis"], &["swimming"]),
    ];

    for u in &users {
        for v in &users {
            if u.id == v.id {
                continue;
            }
            let expected = v.hobbies_know.intersection(&u.hobbies_want).count()
                + v.hobbies_want.intersection(&u.hobbies_know).count();
            let actual = calculate_overlap(u, v).score() as usize;

            assert_eq!(actual, expected, "score({}, {})", u.id, v.id);
            assert_eq!(score_candidate(u, v).is_some(), expected > 0);
        }
    }
}

#[test]
fn test_profile_tags_are_lowercase_sets() {
    let p = profile("p", &["Guitar", "guitar", " GUITAR "], &[]);
    assert_eq!(p.hobbies_know.len(), 1);
    assert!(p.hobbies_know.contains("guitar"));
}

#[test]
fn test_tag_matching_is_exact() {
    let current = profile("me", &[], &["guitar"]);
    let candidate = profile("c", &["guitars", "electric guitar"], &[]);

    assert!(score_candidate(&current, &candidate).is_none());
}

#[test]
fn test_blank_queries_are_validation_errors() {
    assert_eq!(validate_query(""), Err(QueryError::Blank));
    assert_eq!(validate_query("  \n "), Err(QueryError::Blank));
    assert_eq!(validate_query("GUITAR"), validate_query("guitar"));
}

#[test]
fn test_canonical_list_ignores_order_and_case() {
    let a = vec!["Yoga".to_string(), "chess".to_string()];
    let b = vec!["chess".to_string(), "yoga ".to_string(), "CHESS".to_string()];

    assert_eq!(canonical_hobby_list(&a), canonical_hobby_list(&b));
}

#[test]
fn test_parse_fenced_completion() {
    let completion = r#"Here are the normalized hobbies:

```json
[
  {"hobby": "Guitar", "related": ["music", "instrument"]},
  {"hobby": "wellness", "related": ["health"]}
]
```"#;

    let hobbies = parse_normalized(completion).unwrap();

    assert_eq!(hobbies.len(), 2);
    assert_eq!(hobbies[0].tag, "guitar");
    assert_eq!(hobbies[0].related, vec!["music", "instrument"]);
    assert_eq!(hobbies[1].tag, "wellness");
}

#[test]
fn test_missing_related_defaults_to_empty() {
    let hobbies = parse_normalized(r#"[{"hobby":"chess"}]"#).unwrap();
    assert!(hobbies[0].related.is_empty());
}

#[test]
fn test_truncated_completion_is_hard_failure() {
    let err = parse_normalized(r#"[{"hobby":"chess","related":["board games"]"#).unwrap_err();
    assert!(matches!(err, NormalizationError::InvalidJson(_)));
}

#[test]
fn test_extract_spans_first_to_last_bracket() {
    assert_eq!(extract_json_array("x [1, [2]] y"), "[1, [2]]");
    assert_eq!(extract_json_array("] backwards ["), "] backwards [");
}

#[test]
fn test_offline_table_groups_prompt_synonyms() {
    let normalizer = StaticNormalizer::with_defaults();
    let raw: Vec<String> = ["Football", "playing soccer", "Baking Bread", "origami"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let hobbies = tokio_test::block_on(normalizer.normalize(&raw)).unwrap();
    let tags: Vec<&str> = hobbies.iter().map(|h| h.tag.as_str()).collect();

    assert_eq!(tags, vec!["soccer", "soccer", "baking", "origami"]);
}
