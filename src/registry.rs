use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Upstream model vendors the hub knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Anthropic,
    Deepseek,
    Kimi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Deepseek => "deepseek",
            Self::Kimi => "kimi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Openai => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Deepseek => "Deepseek",
            Self::Kimi => "Kimi K2",
        }
    }

    pub const ALL: [Provider; 4] = [
        Provider::Openai,
        Provider::Anthropic,
        Provider::Deepseek,
        Provider::Kimi,
    ];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "anthropic" => Ok(Self::Anthropic),
            "deepseek" => Ok(Self::Deepseek),
            "kimi" => Ok(Self::Kimi),
            other => Err(HubError::ModelNotFound(format!("unknown provider: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Available,
    Unavailable,
}

/// Immutable catalog entry for a selectable model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    pub status: ModelStatus,
    pub description: String,
    pub max_tokens: u32,
    pub default_temperature: f64,
}

/// Static, in-memory model catalog. Built once at startup, read-only after.
pub struct Registry {
    models: Vec<ModelDescriptor>,
}

impl Registry {
    /// The four built-in descriptors the hub ships with.
    pub fn builtin() -> Self {
        let models = vec![
            ModelDescriptor {
                id: "deepseek-chat".to_string(),
                name: "Deepseek Chat".to_string(),
                provider: Provider::Deepseek,
                status: ModelStatus::Available,
                description: "Advanced conversational AI".to_string(),
                max_tokens: 4000,
                default_temperature: 0.7,
            },
            ModelDescriptor {
                id: "kimi-k2".to_string(),
                name: "Kimi K2".to_string(),
                provider: Provider::Kimi,
                status: ModelStatus::Available,
                description: "Creative content generation".to_string(),
                max_tokens: 8000,
                default_temperature: 0.8,
            },
            ModelDescriptor {
                id: "gpt-4".to_string(),
                name: "GPT-4".to_string(),
                provider: Provider::Openai,
                status: ModelStatus::Available,
                description: "Multi-modal AI assistant".to_string(),
                max_tokens: 8000,
                default_temperature: 0.6,
            },
            ModelDescriptor {
                id: "claude-3".to_string(),
                name: "Claude 3".to_string(),
                provider: Provider::Anthropic,
                status: ModelStatus::Available,
                description: "Helpful and harmless AI".to_string(),
                max_tokens: 200_000,
                default_temperature: 0.5,
            },
        ];
        Self { models }
    }

    /// All descriptors in stable insertion order.
    pub fn list(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn filter_by_provider(&self, provider: Provider) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.provider == provider)
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
