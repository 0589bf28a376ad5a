// Service exports
pub mod cache;
pub mod llm;
pub mod normalizer;

pub use cache::{CachedNormalizer, CacheStats};
pub use llm::{LlmClient, LlmError};
pub use normalizer::{
    build_prompt, extract_json_array, parse_normalized, HobbyNormalizer, LlmHobbyNormalizer,
    NormalizationError, StaticNormalizer,
};
