/// Machine translation backends
///
/// Every provider implements [`Translator`]. The pipeline reaches them only
/// through a [`TranslationGateway`], which maps each [`crate::record::Backend`]
/// to a provider and flattens multi-segment answers into one string.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tweet_relay::record::Backend;
/// use tweet_relay::translate::{GoogleTranslateProvider, NaverTranslateProvider, TranslationGateway};
///
/// let gateway = TranslationGateway::new()
///     .with_backend(Backend::Primary, Arc::new(GoogleTranslateProvider::new(key)?))
///     .with_backend(Backend::Secondary, Arc::new(NaverTranslateProvider::new(id, secret)?));
///
/// let text = gateway.translate("안녕하세요", "ko", "ja", Backend::Primary).await?;
/// ```
pub mod gateway;
pub mod google;
pub mod mock;
pub mod naver;
pub mod translator;

pub use gateway::TranslationGateway;
pub use google::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use naver::NaverTranslateProvider;
pub use translator::{Translation, Translator};
