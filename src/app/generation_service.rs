use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::domain::{
    GenerationError, GenerationResult, OrchestrationError, validate_prompt,
};
use crate::infra::llm::{LlmProvider, ProviderRegistry};

/// Sequential fallback across the registry's enabled providers. First success wins.
#[derive(Clone)]
pub struct GenerationService {
    registry: Arc<ProviderRegistry>,
}

impl GenerationService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn generate(&self, prompt: &str) -> Result<GenerationResult, OrchestrationError> {
        self.generate_with_cancel(prompt, || false)
    }

    /// Like [`generate`](Self::generate), but checks `is_cancelled` before every provider
    /// attempt and skips the remaining providers once it returns `true`.
    pub fn generate_with_cancel<F>(
        &self,
        prompt: &str,
        is_cancelled: F,
    ) -> Result<GenerationResult, OrchestrationError>
    where
        F: Fn() -> bool,
    {
        validate_prompt(prompt).map_err(|err| OrchestrationError::invalid_input(err.message))?;

        let mut errors = Vec::new();
        for descriptor in self.registry.enabled_providers() {
            if is_cancelled() {
                tracing::debug!(attempts = errors.len(), "generation cancelled");
                return Err(OrchestrationError::Cancelled { errors });
            }

            let Some(provider) = self.registry.adapter(&descriptor.name) else {
                tracing::debug!(provider = %descriptor.name, "no adapter registered, skipping");
                continue;
            };

            tracing::debug!(
                provider = %descriptor.name,
                priority = descriptor.priority,
                "attempting generation"
            );
            match invoke_provider(provider.as_ref(), &descriptor.name, prompt) {
                Ok(result) if result.success => {
                    tracing::info!(
                        provider = %result.provider,
                        model = %result.model,
                        tokens_used = ?result.tokens_used,
                        "generation succeeded"
                    );
                    return Ok(result);
                }
                Ok(_) => {
                    let error = GenerationError::unknown(
                        "provider returned an unsuccessful result",
                        &descriptor.name,
                    );
                    tracing::warn!(provider = %descriptor.name, %error, "provider attempt failed");
                    errors.push(error);
                }
                Err(error) => {
                    tracing::warn!(provider = %descriptor.name, %error, "provider attempt failed");
                    errors.push(error);
                }
            }
        }

        tracing::warn!(attempts = errors.len(), "all AI providers failed");
        Err(OrchestrationError::AllProvidersFailed { errors })
    }
}

/// Runs one adapter call. A panicking adapter is reported as `UNKNOWN_ERROR`.
fn invoke_provider(
    provider: &dyn LlmProvider,
    provider_name: &str,
    prompt: &str,
) -> Result<GenerationResult, GenerationError> {
    match panic::catch_unwind(AssertUnwindSafe(|| provider.generate(prompt))) {
        Ok(result) => result.map_err(|err| err.with_default_provider(provider_name)),
        Err(payload) => Err(GenerationError::unknown(
            panic_message(payload.as_ref()),
            provider_name,
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "provider panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::GenerationService;
    use crate::domain::{ErrorCode, GenerationError, GenerationResult, OrchestrationError};
    use crate::infra::llm::{LlmProvider, ProviderRegistry};

    enum Behavior {
        Succeed,
        Fail(ErrorCode),
        FailWithoutProvider,
        Unsuccessful,
        Panic,
    }

    struct ScriptedProvider {
        provider_id: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl LlmProvider for ScriptedProvider {
        fn provider_id(&self) -> &str {
            self.provider_id
        }

        fn generate(&self, prompt: &str) -> Result<GenerationResult, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed => Ok(GenerationResult::succeeded(
                    self.provider_id,
                    "scripted-model",
                    format!("{} says: {prompt}", self.provider_id),
                    Some(7),
                )),
                Behavior::Fail(code) => Err(GenerationError::for_provider(
                    code,
                    format!("{} failed", self.provider_id),
                    self.provider_id,
                )),
                Behavior::FailWithoutProvider => {
                    Err(GenerationError::new(ErrorCode::InvalidResponse, "bad payload"))
                }
                Behavior::Unsuccessful => {
                    let mut result = GenerationResult::succeeded(
                        self.provider_id,
                        "scripted-model",
                        "",
                        None,
                    );
                    result.success = false;
                    Ok(result)
                }
                Behavior::Panic => panic!("adapter bug"),
            }
        }
    }

    fn service_with(
        providers: Vec<(&'static str, Behavior)>,
    ) -> (GenerationService, Vec<Arc<AtomicUsize>>) {
        let mut registry =
            ProviderRegistry::from_flags(providers.iter().map(|(name, _)| (*name, true)));
        let mut counters = Vec::new();
        for (provider_id, behavior) in providers {
            let calls = Arc::new(AtomicUsize::new(0));
            counters.push(Arc::clone(&calls));
            registry
                .register(ScriptedProvider {
                    provider_id,
                    behavior,
                    calls,
                })
                .expect("provider registration should succeed");
        }
        (GenerationService::new(registry), counters)
    }

    #[test]
    fn generate_returns_first_success_without_calling_later_providers() {
        let (service, calls) = service_with(vec![
            ("groq", Behavior::Succeed),
            ("openrouter", Behavior::Succeed),
        ]);

        let result = service.generate("Rust traits").expect("generation should succeed");

        assert_eq!(result.provider, "groq");
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generate_falls_back_to_second_provider() {
        let (service, calls) = service_with(vec![
            ("groq", Behavior::Fail(ErrorCode::RateLimit)),
            ("openrouter", Behavior::Succeed),
        ]);

        let result = service.generate("Rust traits").expect("fallback should succeed");

        assert_eq!(
            result,
            GenerationResult::succeeded(
                "openrouter",
                "scripted-model",
                "openrouter says: Rust traits",
                Some(7)
            )
        );
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(calls[1].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn generate_with_no_enabled_providers_fails_with_empty_error_list() {
        let service = GenerationService::new(ProviderRegistry::from_flags([
            ("groq", false),
            ("openrouter", false),
        ]));

        let error = service
            .generate("Rust traits")
            .expect_err("no providers should fail");

        assert_eq!(error, OrchestrationError::AllProvidersFailed { errors: Vec::new() });
        assert_eq!(error.status_code(), 503);
    }

    #[test]
    fn generate_aggregates_every_provider_error_in_order() {
        let (service, _) = service_with(vec![
            ("groq", Behavior::Fail(ErrorCode::NetworkError)),
            ("openrouter", Behavior::Fail(ErrorCode::HttpError)),
        ]);

        let error = service.generate("Rust traits").expect_err("all providers fail");
        let summary = error
            .errors()
            .iter()
            .map(|err| (err.provider(), err.code()))
            .collect::<Vec<_>>();

        assert_eq!(error.code(), ErrorCode::AllProvidersFailed);
        assert_eq!(
            summary,
            vec![
                (Some("groq"), ErrorCode::NetworkError),
                (Some("openrouter"), ErrorCode::HttpError),
            ]
        );
    }

    #[test]
    fn generate_stamps_provider_on_errors_without_one() {
        let (service, _) = service_with(vec![("groq", Behavior::FailWithoutProvider)]);

        let error = service.generate("Rust traits").expect_err("provider fails");

        assert_eq!(error.errors()[0].provider(), Some("groq"));
        assert_eq!(error.errors()[0].code(), ErrorCode::InvalidResponse);
    }

    #[test]
    fn generate_wraps_non_conforming_failures_as_unknown_error() {
        let (service, calls) = service_with(vec![
            ("groq", Behavior::Panic),
            ("openrouter", Behavior::Unsuccessful),
            ("together", Behavior::Succeed),
        ]);

        let result = service.generate("Rust traits").expect("third provider succeeds");
        assert_eq!(result.provider, "together");
        assert!(calls.iter().all(|calls| calls.load(Ordering::SeqCst) == 1));

        let (service, _) = service_with(vec![
            ("groq", Behavior::Panic),
            ("openrouter", Behavior::Unsuccessful),
        ]);
        let error = service.generate("Rust traits").expect_err("both fail");
        assert_eq!(error.errors().len(), 2);
        assert!(
            error
                .errors()
                .iter()
                .all(|err| err.code() == ErrorCode::UnknownError)
        );
        assert_eq!(error.errors()[0].message, "adapter bug");
    }

    #[test]
    fn generate_skips_enabled_provider_without_adapter() {
        let mut registry = ProviderRegistry::from_flags([("groq", true), ("openrouter", true)]);
        let calls = Arc::new(AtomicUsize::new(0));
        registry
            .register(ScriptedProvider {
                provider_id: "openrouter",
                behavior: Behavior::Succeed,
                calls: Arc::clone(&calls),
            })
            .expect("provider registration should succeed");

        let result = GenerationService::new(registry)
            .generate("Rust traits")
            .expect("bound provider should succeed");

        assert_eq!(result.provider, "openrouter");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn generate_ignores_adapters_for_disabled_providers() {
        let mut registry = ProviderRegistry::from_flags([("groq", false)]);
        let calls = Arc::new(AtomicUsize::new(0));
        registry
            .register(ScriptedProvider {
                provider_id: "groq",
                behavior: Behavior::Succeed,
                calls: Arc::clone(&calls),
            })
            .expect("provider registration should succeed");

        let error = GenerationService::new(registry)
            .generate("Rust traits")
            .expect_err("disabled provider must not be used");

        assert!(error.errors().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generate_rejects_blank_prompt_before_any_provider_call() {
        let (service, calls) = service_with(vec![("groq", Behavior::Succeed)]);

        let error = service.generate(" \n").expect_err("blank prompt should fail");

        assert_eq!(error.code(), ErrorCode::InvalidInput);
        assert_eq!(calls[0].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generate_with_cancel_skips_remaining_providers() {
        let (service, calls) = service_with(vec![
            ("groq", Behavior::Fail(ErrorCode::RateLimit)),
            ("openrouter", Behavior::Succeed),
        ]);
        let checks = AtomicUsize::new(0);

        let error = service
            .generate_with_cancel("Rust traits", || checks.fetch_add(1, Ordering::SeqCst) >= 1)
            .expect_err("cancellation should stop the fallback");

        assert_eq!(error.code(), ErrorCode::Cancelled);
        assert_eq!(error.errors().len(), 1);
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generate_is_safe_to_call_from_many_threads() {
        let (service, calls) = service_with(vec![
            ("groq", Behavior::Fail(ErrorCode::RateLimit)),
            ("openrouter", Behavior::Succeed),
        ]);

        let handles = (0..8)
            .map(|index| {
                let service = service.clone();
                std::thread::spawn(move || service.generate(&format!("prompt {index}")))
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let result = handle
                .join()
                .expect("worker should not panic")
                .expect("generation should succeed");
            assert_eq!(result.provider, "openrouter");
        }
        assert_eq!(calls[0].load(Ordering::SeqCst), 8);
        assert_eq!(calls[1].load(Ordering::SeqCst), 8);
    }
}
