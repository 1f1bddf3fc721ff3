//! Disabled backend used when no provider is configured.

use async_trait::async_trait;

use crate::{BackendError, LanguageBackend};

/// Always fails with [`BackendError::Disabled`]; callers detect it up front
/// via [`LanguageBackend::is_enabled`] and go straight to their deterministic
/// path.
pub struct NoopBackend;

#[async_trait]
impl LanguageBackend for NoopBackend {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, BackendError> {
        Err(BackendError::Disabled)
    }

    fn name(&self) -> &'static str {
        "noop"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_always_disabled() {
        let backend = NoopBackend;
        assert!(!backend.is_enabled());
        let err = backend.generate("sys", "user").await.unwrap_err();
        assert!(matches!(err, BackendError::Disabled));
    }
}
