use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("a generation is already in flight")]
    GenerationInFlight,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("prompt too long: {len} chars (max {max})")]
    PromptTooLong { len: usize, max: usize },

    #[error("max_tokens {requested} exceeds limit {limit}")]
    MaxTokensExceeded { requested: u32, limit: u32 },

    #[error("no model selected")]
    NoModelSelected,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("no API key configured for {provider}")]
    MissingCredential { provider: String },

    #[error("upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("schema parse error: {0}")]
    SchemaParse(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("unknown learning rate tier: {0}")]
    UnknownTier(String),
}

impl HubError {
    /// Returns true for errors caught before any network call is issued.
    /// Precondition failures leave the system idle with no side effects.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::GenerationInFlight
                | Self::EmptyPrompt
                | Self::PromptTooLong { .. }
                | Self::MaxTokensExceeded { .. }
                | Self::NoModelSelected
                | Self::ModelNotFound(_)
                | Self::MissingCredential { .. }
        )
    }

    /// Returns true for failures of the remote call itself (transport,
    /// non-2xx status, malformed response). These trigger degraded paths
    /// rather than hard failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Upstream { .. } | Self::SchemaParse(_)
        )
    }

    /// Produce a sanitized message suitable for a user-facing notification.
    /// Does not leak internal URLs or raw transport errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::GenerationInFlight => "a generation is already running".to_string(),
            Self::EmptyPrompt => "please enter a prompt".to_string(),
            Self::PromptTooLong { len, max } => {
                format!("prompt too long: {len} chars (max {max})")
            }
            Self::MaxTokensExceeded { requested, limit } => {
                format!("max tokens {requested} exceeds the limit of {limit}")
            }
            Self::NoModelSelected => "please select a model first".to_string(),
            Self::ModelNotFound(id) => format!("model not found: {id}"),
            Self::MissingCredential { provider } => {
                format!("please configure the {provider} API key in settings first")
            }
            Self::Upstream {
                provider, message, ..
            } => format!("error from {provider}: {message}"),
            Self::SchemaParse(_) => "failed to parse backend response".to_string(),
            Self::Request(_) => "request to backend failed".to_string(),
            Self::InvalidFeedback(msg) => msg.clone(),
            Self::UnknownTier(tier) => format!("unknown learning rate tier: {tier}"),
        }
    }
}
