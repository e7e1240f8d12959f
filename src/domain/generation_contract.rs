use serde::{Deserialize, Serialize};

use super::GenerationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub enabled: bool,
    pub priority: usize,
}

/// A generation request is a single prompt; it must contain something besides whitespace.
pub fn validate_prompt(prompt: &str) -> Result<(), GenerationError> {
    if prompt.trim().is_empty() {
        return Err(GenerationError::invalid_input(
            "Prompt must be a non-empty string",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub provider: String,
    pub model: String,
    pub output: String,
    pub tokens_used: Option<u32>,
}

impl GenerationResult {
    pub fn succeeded(
        provider: impl Into<String>,
        model: impl Into<String>,
        output: impl Into<String>,
        tokens_used: Option<u32>,
    ) -> Self {
        Self {
            success: true,
            provider: provider.into(),
            model: model.into(),
            output: output.into(),
            tokens_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationResult, validate_prompt};
    use crate::domain::ErrorCode;

    #[test]
    fn validate_prompt_rejects_blank_prompt() {
        let error = validate_prompt(" \t\n").expect_err("blank prompt should fail");

        assert_eq!(error.code(), ErrorCode::InvalidInput);
        assert_eq!(error.message, "Prompt must be a non-empty string");
        assert_eq!(error.provider(), None);
        assert!(validate_prompt("Rust ownership").is_ok());
    }

    #[test]
    fn generation_result_serializes_with_camel_case_keys() {
        let result = GenerationResult::succeeded("groq", "llama-3.1-8b-instant", "{}", None);
        let value = serde_json::to_value(&result).expect("result should serialize");

        assert_eq!(value["success"], true);
        assert_eq!(value["provider"], "groq");
        assert!(value["tokensUsed"].is_null());
    }
}
