use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{GenerationError, ProviderDescriptor};

use super::{LlmConfig, LlmProvider, OpenAiCompatibleProvider};

/// Ordered view of the enabled providers plus the adapters bound to them.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    /// Keeps only enabled entries, in declaration order. Later duplicates of a name are ignored.
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let mut seen = Vec::<String>::new();
        let mut descriptors = Vec::new();
        for (priority, (name, enabled)) in flags.into_iter().enumerate() {
            let name = name.into();
            if seen.contains(&name) {
                tracing::warn!(provider = %name, "ignoring duplicate provider declaration");
                continue;
            }
            seen.push(name.clone());
            if enabled {
                descriptors.push(ProviderDescriptor {
                    name,
                    enabled,
                    priority,
                });
            }
        }

        Self {
            descriptors,
            providers: HashMap::new(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::from_flags(
            config
                .providers()
                .iter()
                .map(|settings| (settings.name.clone(), settings.enabled)),
        )
    }

    /// Registry with an OpenAI-compatible adapter bound to every enabled provider.
    pub fn with_default_adapters(config: &LlmConfig) -> Result<Self, GenerationError> {
        let mut registry = Self::from_config(config);
        for settings in config.providers().iter().filter(|settings| settings.enabled) {
            registry.register(OpenAiCompatibleProvider::from_settings(settings)?)?;
        }
        Ok(registry)
    }

    pub fn register<P>(&mut self, provider: P) -> Result<(), GenerationError>
    where
        P: LlmProvider + 'static,
    {
        self.register_shared(Arc::new(provider))
    }

    pub fn register_shared(
        &mut self,
        provider: Arc<dyn LlmProvider>,
    ) -> Result<(), GenerationError> {
        let provider_id = provider.provider_id().trim();
        if provider_id.is_empty() {
            return Err(GenerationError::invalid_input(
                "provider_id must not be empty",
            ));
        }
        if self.providers.contains_key(provider_id) {
            return Err(GenerationError::invalid_input(format!(
                "provider '{provider_id}' is already registered"
            )));
        }

        self.providers.insert(provider_id.to_string(), provider);
        Ok(())
    }

    pub fn enabled_providers(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.name == name)
    }

    pub fn adapter(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(name).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
