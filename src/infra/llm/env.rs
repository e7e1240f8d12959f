use std::time::Duration;

use crate::domain::{ErrorCode, GenerationError};

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, GenerationError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(GenerationError::new(
            ErrorCode::ConfigMissing,
            format!("{name} could not be read: {error}"),
        )),
    }
}

/// Only the case-insensitive string `true` enables a flag; anything else, including unset, is off.
pub(crate) fn is_enabled_flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Timeouts are whole, non-zero seconds.
pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, GenerationError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(GenerationError::invalid_input(format!(
            "{name} must be at least 1 second"
        ))),
        Ok(seconds) => Ok(Duration::from_secs(seconds)),
        Err(_) => Err(GenerationError::invalid_input(format!(
            "{name} must be a whole number of seconds, got '{value}'"
        ))),
    }
}

/// Provider timeout, then the shared timeout, then `default`. The shared lookup only runs
/// when the provider has no timeout of its own.
pub(crate) fn resolve_timeout<F>(
    provider_timeout: Option<Duration>,
    shared_timeout: F,
    default: Duration,
) -> Result<Duration, GenerationError>
where
    F: FnOnce() -> Result<Option<Duration>, GenerationError>,
{
    match provider_timeout {
        Some(timeout) => Ok(timeout),
        None => shared_timeout().map(|timeout| timeout.unwrap_or(default)),
    }
}

pub(crate) fn non_empty_owned(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use crate::domain::{ErrorCode, GenerationError};

    use super::{is_enabled_flag, non_empty_owned, parse_timeout_seconds, resolve_timeout};

    #[test]
    fn is_enabled_flag_accepts_only_true_spelling() {
        assert!(is_enabled_flag(Some("true")));
        assert!(is_enabled_flag(Some("TRUE")));
        assert!(is_enabled_flag(Some("True")));

        assert!(!is_enabled_flag(None));
        assert!(!is_enabled_flag(Some("1")));
        assert!(!is_enabled_flag(Some("yes")));
        assert!(!is_enabled_flag(Some(" true ")));
        assert!(!is_enabled_flag(Some("")));
    }

    #[test]
    fn non_empty_owned_trims_and_drops_blank_values() {
        assert_eq!(non_empty_owned("  gsk_123 "), Some("gsk_123".to_string()));
        assert_eq!(non_empty_owned(" \t"), None);
    }

    #[test]
    fn parse_timeout_seconds_reads_whole_seconds() {
        assert_eq!(
            parse_timeout_seconds("GROQ_TIMEOUT_SECS", " 45 ").expect("timeout should parse"),
            Duration::from_secs(45)
        );

        let zero = parse_timeout_seconds("GROQ_TIMEOUT_SECS", "0").expect_err("zero is rejected");
        assert_eq!(zero.code(), ErrorCode::InvalidInput);
        assert_eq!(zero.message, "GROQ_TIMEOUT_SECS must be at least 1 second");

        let fractional =
            parse_timeout_seconds("GROQ_TIMEOUT_SECS", "2.5").expect_err("fractions are rejected");
        assert_eq!(
            fractional.message,
            "GROQ_TIMEOUT_SECS must be a whole number of seconds, got '2.5'"
        );
    }

    #[test]
    fn resolve_timeout_skips_shared_lookup_when_provider_sets_one() {
        let shared_read = Cell::new(false);

        let timeout = resolve_timeout(
            Some(Duration::from_secs(3)),
            || {
                shared_read.set(true);
                Err(GenerationError::invalid_input("unreachable"))
            },
            Duration::from_secs(30),
        )
        .expect("provider timeout wins");

        assert_eq!(timeout, Duration::from_secs(3));
        assert!(!shared_read.get());
    }

    #[test]
    fn resolve_timeout_prefers_shared_over_default() {
        let shared = resolve_timeout(
            None,
            || Ok(Some(Duration::from_secs(12))),
            Duration::from_secs(30),
        )
        .expect("shared timeout applies");
        let fallback = resolve_timeout(None, || Ok(None), Duration::from_secs(30))
            .expect("default applies");

        assert_eq!(shared, Duration::from_secs(12));
        assert_eq!(fallback, Duration::from_secs(30));
    }
}
