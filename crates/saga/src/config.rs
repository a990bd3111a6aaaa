//! Saga configuration loaded from environment variables.

/// Default cap on load-apply-save attempts when the version check fails.
const DEFAULT_MAX_PERSIST_ATTEMPTS: u32 = 3;

/// Saga configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `APPROVAL_MAX_PERSIST_ATTEMPTS` — bounded retry cap for version
///   conflicts (default: `3`)
#[derive(Debug, Clone)]
pub struct SagaConfig {
    pub max_persist_attempts: u32,
}

impl SagaConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            max_persist_attempts: std::env::var("APPROVAL_MAX_PERSIST_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&attempts| attempts > 0)
                .unwrap_or(DEFAULT_MAX_PERSIST_ATTEMPTS),
        }
    }
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            max_persist_attempts: DEFAULT_MAX_PERSIST_ATTEMPTS,
        }
    }
}
