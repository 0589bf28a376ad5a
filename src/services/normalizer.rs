use crate::models::NormalizedHobby;
use crate::services::llm::{LlmClient, LlmError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while normalizing hobby names
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("Completion request failed: {0}")]
    LlmError(#[from] LlmError),

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Response does not contain a hobby array: {0}")]
    UnexpectedShape(String),
}

/// Maps free-text hobby strings to canonical tags
///
/// This is the only seam between the matching pipeline and the outside
/// world, so ranking and search can run against a deterministic stub.
#[async_trait]
pub trait HobbyNormalizer: Send + Sync {
    async fn normalize(&self, raw_hobbies: &[String]) -> Result<Vec<NormalizedHobby>, NormalizationError>;
}

/// Worked examples embedded in every classification prompt
const PROMPT_EXAMPLES: &[(&[&str], &str, &[&str])] = &[
    (&["guitar playing"], "guitar", &["music", "instrument", "strings"]),
    (&["playing soccer", "football"], "soccer", &["sports", "team sports", "ball games"]),
    (&["yoga", "meditation", "mindfulness"], "wellness", &["health", "relaxation", "fitness"]),
    (&["baking bread"], "baking", &["cooking", "food", "pastry"]),
];

/// Build the classification prompt for a list of raw hobbies
pub fn build_prompt(raw_hobbies: &[String]) -> String {
    let mut prompt = String::from(
        "You normalize hobby names for a skill-swap platform.\n\
         Map each hobby below to a short, lowercase canonical name and list a few related terms.\n\
         Hobbies that mean the same thing must share one canonical name.\n\n\
         Examples:\n",
    );

    for (inputs, tag, related) in PROMPT_EXAMPLES {
        let related = related
            .iter()
            .map(|r| format!("\"{}\"", r))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(
            "- {} -> {{\"hobby\": \"{}\", \"related\": [{}]}}\n",
            inputs.join(", "),
            tag,
            related
        ));
    }

    prompt.push_str("\nHobbies:\n");
    for hobby in raw_hobbies {
        prompt.push_str(&format!("- {}\n", hobby));
    }

    prompt.push_str(
        "\nRespond with ONLY a JSON array of objects shaped like \
         {\"hobby\": string, \"related\": [string]}. No prose, no code fences.",
    );

    prompt
}

/// Pull the JSON array out of a completion
///
/// Models often wrap the array in prose or code fences, so this takes the
/// span from the first `[` to the last `]`. Without such a span the whole
/// text is returned and left for the parser to reject.
pub fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

/// Parse a completion into normalized hobbies
///
/// Tags are trimmed and lowercased; entries with an empty tag are dropped.
pub fn parse_normalized(text: &str) -> Result<Vec<NormalizedHobby>, NormalizationError> {
    let value: Value = serde_json::from_str(extract_json_array(text))?;

    if !value.is_array() {
        return Err(NormalizationError::UnexpectedShape(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    }

    let hobbies: Vec<NormalizedHobby> = serde_json::from_value(value)
        .map_err(|e| NormalizationError::UnexpectedShape(e.to_string()))?;

    Ok(hobbies
        .into_iter()
        .filter_map(|h| {
            let tag = h.tag.trim().to_lowercase();
            if tag.is_empty() {
                None
            } else {
                Some(NormalizedHobby::new(tag, h.related))
            }
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalizer backed by an external completion service
pub struct LlmHobbyNormalizer {
    client: LlmClient,
}

impl LlmHobbyNormalizer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HobbyNormalizer for LlmHobbyNormalizer {
    async fn normalize(&self, raw_hobbies: &[String]) -> Result<Vec<NormalizedHobby>, NormalizationError> {
        let raw_hobbies: Vec<String> = raw_hobbies
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .cloned()
            .collect();

        if raw_hobbies.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(&raw_hobbies);
        let completion = self.client.complete(&prompt).await?;

        let hobbies = parse_normalized(&completion).map_err(|e| {
            tracing::warn!("Discarding unparsable normalization response: {}", e);
            e
        })?;

        tracing::debug!(
            "Normalized {} raw hobbies into {} tags",
            raw_hobbies.len(),
            hobbies.len()
        );

        Ok(hobbies)
    }
}

/// Deterministic normalizer driven by a synonym table
///
/// Unknown hobbies normalize to their own trimmed, lowercased text. Used for
/// offline runs and as the stub behind the matching tests.
#[derive(Debug, Clone, Default)]
pub struct StaticNormalizer {
    synonyms: HashMap<String, String>,
}

impl StaticNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the same groupings the LLM prompt teaches
    pub fn with_defaults() -> Self {
        PROMPT_EXAMPLES
            .iter()
            .fold(Self::new(), |normalizer, (inputs, tag, _)| {
                inputs
                    .iter()
                    .fold(normalizer, |n, input| n.with_synonym(input, tag))
            })
    }

    pub fn with_synonym(mut self, raw: &str, tag: &str) -> Self {
        self.synonyms
            .insert(raw.trim().to_lowercase(), tag.trim().to_lowercase());
        self
    }

    pub fn tag_for(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        self.synonyms.get(&key).cloned().unwrap_or(key)
    }

    fn related_to(&self, tag: &str, raw: &str) -> Vec<String> {
        let mut related: Vec<String> = self
            .synonyms
            .iter()
            .filter(|(k, v)| v.as_str() == tag && k.as_str() != raw && k.as_str() != tag)
            .map(|(k, _)| k.clone())
            .collect();
        related.sort();
        related
    }
}

#[async_trait]
impl HobbyNormalizer for StaticNormalizer {
    async fn normalize(&self, raw_hobbies: &[String]) -> Result<Vec<NormalizedHobby>, NormalizationError> {
        Ok(raw_hobbies
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                let tag = self.tag_for(raw);
                let related = self.related_to(&tag, &raw.trim().to_lowercase());
                NormalizedHobby::new(tag, related)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prompt_embeds_hobbies_and_examples() {
        let prompt = build_prompt(&strings(&["playing the ukulele", "sourdough"]));

        assert!(prompt.contains("- playing the ukulele\n"));
        assert!(prompt.contains("- sourdough\n"));
        assert!(prompt.contains("guitar playing -> {\"hobby\": \"guitar\""));
        assert!(prompt.contains("yoga, meditation, mindfulness -> {\"hobby\": \"wellness\""));
    }

    #[test]
    fn test_extract_array_from_prose() {
        let text = "Sure! Here you go:\n```json\n[{\"hobby\":\"guitar\",\"related\":[\"music\"]}]\n```";
        assert_eq!(
            extract_json_array(text),
            "[{\"hobby\":\"guitar\",\"related\":[\"music\"]}]"
        );
    }

    #[test]
    fn test_extract_without_brackets_returns_body() {
        assert_eq!(extract_json_array("  {\"hobby\":\"x\"} "), "{\"hobby\":\"x\"}");
    }

    #[test]
    fn test_parse_normalized_lowercases_tags() {
        let hobbies =
            parse_normalized(r#"[{"hobby":" Guitar ","related":["music"]},{"hobby":""}]"#).unwrap();

        assert_eq!(hobbies, vec![NormalizedHobby::new("guitar", vec!["music".to_string()])]);
    }

    #[test]
    fn test_parse_normalized_rejects_object() {
        let err = parse_normalized(r#"{"hobby":"guitar"}"#).unwrap_err();
        assert!(matches!(err, NormalizationError::UnexpectedShape(_)));
    }

    #[test]
    fn test_parse_normalized_rejects_garbage() {
        let err = parse_normalized("I could not classify these hobbies.").unwrap_err();
        assert!(matches!(err, NormalizationError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_normalized_rejects_wrong_element_shape() {
        let err = parse_normalized(r#"["guitar", "cooking"]"#).unwrap_err();
        assert!(matches!(err, NormalizationError::UnexpectedShape(_)));
    }

    #[tokio::test]
    async fn test_static_normalizer_synonyms() {
        let normalizer = StaticNormalizer::with_defaults();
        let hobbies = normalizer
            .normalize(&strings(&["Meditation", "chess", "  "]))
            .await
            .unwrap();

        assert_eq!(hobbies.len(), 2);
        assert_eq!(hobbies[0].tag, "wellness");
        assert_eq!(hobbies[0].related, vec!["mindfulness", "yoga"]);
        assert_eq!(hobbies[1].tag, "chess");
        assert!(hobbies[1].related.is_empty());
    }

    fn llm_normalizer(base_url: String) -> LlmHobbyNormalizer {
        let settings = crate::config::LlmSettings {
            base_url,
            ..Default::default()
        };
        LlmHobbyNormalizer::new(LlmClient::new(&settings).unwrap())
    }

    #[tokio::test]
    async fn test_llm_normalizer_skips_blank_entries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex(r"Hobbies:\\n- chess\\n\\n".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"[{\"hobby\":\"chess\"}]"}}]}"#)
            .create_async()
            .await;

        let hobbies = llm_normalizer(server.url())
            .normalize(&strings(&["   ", "chess", ""]))
            .await
            .unwrap();

        assert_eq!(hobbies, vec![NormalizedHobby::new("chess", vec![])]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_llm_normalizer_all_blank_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let hobbies = llm_normalizer(server.url())
            .normalize(&strings(&["  ", "\t"]))
            .await
            .unwrap();

        assert!(hobbies.is_empty());
        mock.assert_async().await;
    }
}
