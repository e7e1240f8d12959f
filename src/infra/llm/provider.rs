use crate::domain::{GenerationError, GenerationResult};

/// One text-generation backend. Implementations make exactly one attempt per call.
pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    fn generate(&self, prompt: &str) -> Result<GenerationResult, GenerationError>;
}
