//! Generation request lifecycle.
//!
//! One controller drives a single in-flight request through
//! `Idle -> Validating -> AwaitingRemote -> {Succeeded, Failed} -> Idle`,
//! where a remote failure detours through the mock fallback before
//! returning to idle. The busy flag is checked and claimed synchronously
//! before any suspension point, so at most one generation runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::ApiClient;
use crate::credentials::CredentialStore;
use crate::error::HubError;
use crate::mock::MockGenerator;
use crate::registry::{Provider, Registry};
use crate::ui::{Severity, UiSink};

/// Backend caps mirrored client-side so violations fail before the wire.
pub const MAX_PROMPT_CHARS: usize = 50_000;
pub const MAX_TOKENS_LIMIT: u32 = 32_000;

/// Transient per-call value; discarded once the request resolves.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Where a generation's content actually came from. The original interface
/// presents both identically; the tag keeps them distinguishable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    MockFallback,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub content: String,
    pub origin: Origin,
}

pub struct GenerationController {
    api: ApiClient,
    credentials: CredentialStore,
    mock: MockGenerator,
    busy: AtomicBool,
}

/// Releases the busy flag when the request resolves, on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GenerationController {
    pub fn new(api: ApiClient, credentials: CredentialStore, mock: MockGenerator) -> Self {
        Self {
            api,
            credentials,
            mock,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one generation.
    ///
    /// Preconditions are checked in order (busy, prompt, model, credential)
    /// and each failure is a distinct error with no side effects. Once the
    /// remote call is issued there is no cancellation: the request runs to
    /// the transport timeout, and any remote failure degrades to the mock
    /// fallback, which always terminates in success.
    pub async fn generate(
        &self,
        registry: &Registry,
        model_id: Option<&str>,
        prompt: &str,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
        sink: &dyn UiSink,
    ) -> Result<Generation, HubError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(HubError::GenerationInFlight);
        }
        let _busy = BusyGuard(&self.busy);

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(HubError::EmptyPrompt);
        }
        let len = prompt.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(HubError::PromptTooLong {
                len,
                max: MAX_PROMPT_CHARS,
            });
        }

        let model = match model_id {
            Some(id) if !id.trim().is_empty() => registry
                .find_by_id(id)
                .ok_or_else(|| HubError::ModelNotFound(id.to_string()))?,
            _ => return Err(HubError::NoModelSelected),
        };

        if let Some(requested) = max_tokens
            && requested > MAX_TOKENS_LIMIT
        {
            return Err(HubError::MaxTokensExceeded {
                requested,
                limit: MAX_TOKENS_LIMIT,
            });
        }

        let api_key =
            self.credentials
                .get(model.provider)
                .ok_or_else(|| HubError::MissingCredential {
                    provider: model.provider.to_string(),
                })?;

        let request = GenerationRequest {
            prompt: prompt.to_string(),
            provider: model.provider,
            model: model.id.clone(),
            temperature: temperature.unwrap_or(model.default_temperature),
            max_tokens: max_tokens.unwrap_or_else(|| model.max_tokens.min(MAX_TOKENS_LIMIT)),
        };

        tracing::info!(
            model = %request.model,
            provider = %request.provider,
            "generation started"
        );
        sink.show_progress(0.0);

        match self.api.generate(&request, &api_key).await {
            Ok(content) => {
                sink.show_progress(100.0);
                sink.hide_progress();
                tracing::info!(model = %request.model, "generation succeeded");
                Ok(Generation {
                    content,
                    origin: Origin::Remote,
                })
            }
            Err(e) => {
                tracing::warn!(model = %request.model, "generation failed: {e}");
                sink.notify(
                    &format!("Generation failed: {}", e.user_message()),
                    Severity::Error,
                );
                sink.hide_progress();

                // Degrade to the canned pool so the interface stays usable
                // without a live backend.
                sink.show_progress(0.0);
                let content = self.mock.run(sink).await;
                sink.hide_progress();
                Ok(Generation {
                    content: content.to_string(),
                    origin: Origin::MockFallback,
                })
            }
        }
    }
}
