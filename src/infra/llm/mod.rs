mod config;
mod env;
mod openai_compatible;
mod prompt_builder;
mod provider;
mod provider_registry;
mod response_parsing;
pub mod sanitizer;
pub mod schema_validator;

pub use config::{DEFAULT_TIMEOUT, LlmConfig, ProviderSettings};
pub use openai_compatible::{OpenAiCompatibleProvider, SYSTEM_INSTRUCTION, TEMPERATURE};
pub use prompt_builder::PromptBuilder;
pub use provider::LlmProvider;
pub use provider_registry::ProviderRegistry;
pub use sanitizer::{SanitizeOptions, is_parse_failure, safe_parse_json};
