//! Provider resolution and request dispatch

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{build_prompt, InsightConfig, SupportedModel};
use crate::error::{InsightError, Result};
use crate::providers::{HttpProviderFactory, ProviderFactory};
use crate::settings::SettingsStore;
use crate::upload::ImageInput;

/// Where the credential for a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Key saved by the user in the settings record
    UserSettings,
    /// Key supplied by the process environment
    Environment,
}

/// The model and key a request will be sent with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub model: SupportedModel,
    pub api_key: String,
    pub source: CredentialSource,
}

/// Resolves which provider to use and sends one analysis request to it
pub struct InsightDispatcher {
    store: Arc<dyn SettingsStore>,
    factory: Arc<dyn ProviderFactory>,
    fallback_gemini_key: Option<String>,
}

impl InsightDispatcher {
    /// Create a dispatcher backed by the real HTTP providers
    ///
    /// # Arguments
    /// * `store` - Settings store read before every request
    /// * `config` - Endpoints and the fallback Gemini key; a blank key counts as absent
    pub fn new(store: Arc<dyn SettingsStore>, config: InsightConfig) -> Self {
        let fallback_gemini_key = config.fallback_gemini_key.clone();
        Self::with_factory(
            store,
            Arc::new(HttpProviderFactory::new(config)),
            fallback_gemini_key,
        )
    }

    /// Create a dispatcher with a custom provider factory
    ///
    /// # Arguments
    /// * `store` - Settings store read before every request
    /// * `factory` - Builds the provider for the resolved model and key
    /// * `fallback_gemini_key` - Key used when no API key is saved
    pub fn with_factory(
        store: Arc<dyn SettingsStore>,
        factory: Arc<dyn ProviderFactory>,
        fallback_gemini_key: Option<String>,
    ) -> Self {
        Self {
            store,
            factory,
            fallback_gemini_key: fallback_gemini_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Pick the model and credential for the next request.
    ///
    /// A stored key selects the stored model. Without one, Gemini is used
    /// with the environment key.
    ///
    /// # Returns
    /// The route, or `UnsupportedModel` / `NoCredential` without any network call
    pub async fn resolve(&self) -> Result<Route> {
        if let Some(settings) = self.store.load().await.filter(|s| s.has_api_key()) {
            let model = SupportedModel::from_id(&settings.model)
                .ok_or_else(|| InsightError::UnsupportedModel(settings.model.clone()))?;
            return Ok(Route {
                model,
                api_key: settings.api_key,
                source: CredentialSource::UserSettings,
            });
        }

        let api_key = self
            .fallback_gemini_key
            .clone()
            .ok_or(InsightError::NoCredential)?;

        Ok(Route {
            model: SupportedModel::Gemini,
            api_key,
            source: CredentialSource::Environment,
        })
    }

    /// Analyze a blood test report and return the provider's Markdown text
    ///
    /// # Arguments
    /// * `image` - The uploaded report, consumed by encoding
    /// * `description` - Optional context; blank means none
    ///
    /// # Returns
    /// The first textual completion, never empty
    pub async fn generate_insights(&self, image: ImageInput, description: &str) -> Result<String> {
        let route = self.resolve().await?;
        info!(
            "Dispatching to {} via {} ({:?} key)",
            route.model.label(),
            route.model.provider(),
            route.source
        );

        let provider = self.factory.create(route.model, &route.api_key);
        let prompt = build_prompt(description);
        let encoded = image.into_encoded();
        debug!("Prompt: {}", prompt);

        provider.analyze(&encoded, &prompt).await
    }
}
