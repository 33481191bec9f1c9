use crate::api::ApiClient;
use crate::credentials::CredentialStore;
use crate::error::HubError;
use crate::registry::Provider;

/// Outcome of a backend-mediated provider connection check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Failed { message: Option<String> },
}

/// Check that the stored credential for a provider actually works, by way
/// of the backend's test-connection endpoint. A missing credential is a
/// precondition error; a backend "no" is a normal `Failed` outcome.
pub async fn test_connection(
    api: &ApiClient,
    credentials: &CredentialStore,
    provider: Provider,
) -> Result<ConnectionStatus, HubError> {
    let api_key = credentials
        .get(provider)
        .ok_or_else(|| HubError::MissingCredential {
            provider: provider.to_string(),
        })?;

    let response = api.test_connection(provider, &api_key).await?;
    if response.success {
        tracing::info!(provider = %provider, "connection test passed");
        Ok(ConnectionStatus::Connected)
    } else {
        tracing::warn!(provider = %provider, "connection test failed");
        Ok(ConnectionStatus::Failed {
            message: response.message,
        })
    }
}
