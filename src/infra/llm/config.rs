use std::time::Duration;

use crate::domain::GenerationError;

use super::env::{
    is_enabled_flag, non_empty_owned, parse_timeout_seconds, read_env_var, resolve_timeout,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_GLOBAL_TIMEOUT_SECS: &str = "COURSEGEN_LLM_TIMEOUT_SECS";
const DEFAULT_OPENROUTER_REFERER: &str = "http://localhost:5000";
const DEFAULT_OPENROUTER_TITLE: &str = "Course Builder";

struct DeclaredProvider {
    name: &'static str,
    display_name: &'static str,
    env_prefix: &'static str,
    default_model: &'static str,
}

/// Declaration order is the fallback order.
const DECLARED_PROVIDERS: &[DeclaredProvider] = &[
    DeclaredProvider {
        name: "groq",
        display_name: "Groq",
        env_prefix: "GROQ",
        default_model: "llama-3.1-8b-instant",
    },
    DeclaredProvider {
        name: "openrouter",
        display_name: "OpenRouter",
        env_prefix: "OPENROUTER",
        default_model: "meta-llama/llama-3.1-8b-instruct",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub name: String,
    pub display_name: String,
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub extra_headers: Vec<(String, String)>,
}

impl ProviderSettings {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            enabled: true,
            api_key: None,
            base_url: None,
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            extra_headers: Vec::new(),
        }
    }

    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.base_url = Some(base_url.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Provider configuration resolved once at startup and passed to the registry and adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    providers: Vec<ProviderSettings>,
}

impl LlmConfig {
    pub fn new(providers: Vec<ProviderSettings>) -> Self {
        Self { providers }
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Self::from_lookup(read_env_var)
    }

    /// Builds the configuration from any `name -> value` source, such as a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GenerationError>
    where
        F: Fn(&str) -> Result<Option<String>, GenerationError>,
    {
        let global_timeout = || -> Result<Option<Duration>, GenerationError> {
            lookup(ENV_GLOBAL_TIMEOUT_SECS)?
                .map(|value| parse_timeout_seconds(ENV_GLOBAL_TIMEOUT_SECS, &value))
                .transpose()
        };

        let mut providers = Vec::with_capacity(DECLARED_PROVIDERS.len());
        for declared in DECLARED_PROVIDERS {
            let flag_name = format!("ENABLE_{}", declared.env_prefix);
            // An unreadable flag is just another value that is not `true`.
            let flag = lookup(&flag_name).unwrap_or_else(|error| {
                tracing::warn!(flag = %flag_name, %error, "treating unreadable flag as disabled");
                None
            });
            if !is_enabled_flag(flag.as_deref()) {
                providers.push(
                    ProviderSettings::new(
                        declared.name,
                        declared.display_name,
                        declared.default_model,
                    )
                    .disabled(),
                );
                continue;
            }
            providers.push(enabled_provider(declared, &lookup, &global_timeout)?);
        }

        Ok(Self { providers })
    }

    /// Every declared provider, enabled or not, in fallback order.
    pub fn providers(&self) -> &[ProviderSettings] {
        &self.providers
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.iter().find(|settings| settings.name == name)
    }
}

/// Settings of an enabled provider. Only enabled providers have their variables parsed.
fn enabled_provider<F, G>(
    declared: &DeclaredProvider,
    lookup: &F,
    global_timeout: &G,
) -> Result<ProviderSettings, GenerationError>
where
    F: Fn(&str) -> Result<Option<String>, GenerationError>,
    G: Fn() -> Result<Option<Duration>, GenerationError>,
{
    let prefix = declared.env_prefix;
    let read = |suffix: &str| -> Result<Option<String>, GenerationError> {
        Ok(lookup(&format!("{prefix}_{suffix}"))?
            .as_deref()
            .and_then(non_empty_owned))
    };

    let timeout_name = format!("{prefix}_TIMEOUT_SECS");
    let provider_timeout = lookup(&timeout_name)?
        .map(|value| parse_timeout_seconds(&timeout_name, &value))
        .transpose()?;

    let mut settings = ProviderSettings::new(
        declared.name,
        declared.display_name,
        read("MODEL")?.unwrap_or_else(|| declared.default_model.to_string()),
    );
    settings.api_key = read("API_KEY")?;
    settings.base_url = read("BASE_URL")?;
    settings.timeout = resolve_timeout(provider_timeout, global_timeout, DEFAULT_TIMEOUT)?;

    if declared.name == "openrouter" {
        let referer = read("REFERER")?.unwrap_or_else(|| DEFAULT_OPENROUTER_REFERER.to_string());
        settings.extra_headers = vec![
            ("HTTP-Referer".to_string(), referer),
            ("X-Title".to_string(), DEFAULT_OPENROUTER_TITLE.to_string()),
        ];
    }

    Ok(settings)
}
