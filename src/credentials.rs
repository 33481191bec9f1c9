use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::registry::Provider;

/// Read-side adapter over the persistent credential key-value store.
///
/// The store is a flat JSON object owned by the settings surface; this core
/// only reads it. Keys follow the `"<provider>_api_key"` convention. No
/// format validation happens here; bad keys are the backend's problem.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the API key for a provider. Absent file, unreadable JSON, or
    /// a missing/empty entry all read as "not configured".
    pub fn get(&self, provider: Provider) -> Option<String> {
        let entries = self.read_entries()?;
        entries
            .get(&storage_key(provider))
            .filter(|v| !v.is_empty())
            .cloned()
    }

    pub fn exists(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }

    /// Per-provider configured/not-configured summary, in catalog order.
    pub fn status(&self) -> Vec<(Provider, bool)> {
        Provider::ALL
            .iter()
            .map(|p| (*p, self.exists(*p)))
            .collect()
    }

    fn read_entries(&self) -> Option<HashMap<String, String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("credential store unreadable at {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!("credential store malformed at {}: {e}", self.path.display());
                None
            }
        }
    }
}

fn storage_key(provider: Provider) -> String {
    format!("{}_api_key", provider.as_str())
}
