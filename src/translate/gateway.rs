//! Routing translation requests to the configured backends

use crate::error::{RelayError, RelayResult};
use crate::record::Backend;
use crate::translate::translator::Translator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One [`Translator`] per backend
#[derive(Clone, Default)]
pub struct TranslationGateway {
    backends: HashMap<Backend, Arc<dyn Translator>>,
}

impl TranslationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Backend, translator: Arc<dyn Translator>) -> Self {
        self.backends.insert(backend, translator);
        self
    }

    /// Translate `text` through `backend`, flattened to a single string
    ///
    /// Empty input yields an empty result without contacting the backend.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        backend: Backend,
    ) -> RelayResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let translator = self.backends.get(&backend).ok_or_else(|| {
            RelayError::Config(format!("No translator configured for {} backend", backend))
        })?;

        debug!(
            backend = %backend,
            provider = translator.provider_name(),
            "Translating {} characters",
            text.chars().count()
        );
        let translation = translator.translate(text, source_lang, target_lang).await?;
        Ok(translation.into_text())
    }
}

impl std::fmt::Debug for TranslationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<(Backend, &str)> = self
            .backends
            .iter()
            .map(|(b, t)| (*b, t.provider_name()))
            .collect();
        names.sort();
        f.debug_struct("TranslationGateway")
            .field("backends", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::mock::{MockMode, MockTranslator};

    #[tokio::test]
    async fn test_routes_to_requested_backend() {
        let primary = MockTranslator::new(MockMode::Suffix);
        let secondary = MockTranslator::new(MockMode::NoOp);
        let gateway = TranslationGateway::new()
            .with_backend(Backend::Primary, Arc::new(primary.clone()))
            .with_backend(Backend::Secondary, Arc::new(secondary.clone()));

        let result = gateway
            .translate("안녕", "ko", "ja", Backend::Primary)
            .await
            .unwrap();
        assert_eq!(result, "안녕_ja");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_never_calls_backend() {
        let mock = MockTranslator::new(MockMode::Error("should not be called".to_string()));
        let gateway =
            TranslationGateway::new().with_backend(Backend::Secondary, Arc::new(mock.clone()));

        let result = gateway
            .translate("", "ko", "ja", Backend::Secondary)
            .await
            .unwrap();
        assert_eq!(result, "");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_multiple_segments_are_joined() {
        let gateway = TranslationGateway::new().with_backend(
            Backend::Primary,
            Arc::new(MockTranslator::new(MockMode::Segmented)),
        );
        let result = gateway
            .translate("a\nb", "ko", "ja", Backend::Primary)
            .await
            .unwrap();
        assert_eq!(result, "a_ja\nb_ja");
    }

    #[tokio::test]
    async fn test_missing_backend_is_config_error() {
        let gateway = TranslationGateway::new();
        assert!(matches!(
            gateway.translate("text", "ko", "ja", Backend::Secondary).await,
            Err(RelayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_backend_errors_are_surfaced() {
        let gateway = TranslationGateway::new().with_backend(
            Backend::Primary,
            Arc::new(MockTranslator::new(MockMode::Malformed)),
        );
        assert!(matches!(
            gateway.translate("text", "ko", "ja", Backend::Primary).await,
            Err(RelayError::ValidationGap { .. })
        ));
    }
}
