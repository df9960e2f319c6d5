// # Memory Secret Store
//
// In-memory implementation of SecretStore.
//
// ## Purpose
//
// Holds secrets in a map keyed by (namespace, secret name). Useful for
// tests and for embedding the solver in a host that already resolved its
// credentials.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::secret_store::SecretStore;
use crate::Error;

type SecretData = HashMap<String, String>;

/// In-memory secret store implementation
///
/// # Example
///
/// ```rust,no_run
/// use pdd_core::secrets::MemorySecretStore;
/// use pdd_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///     store.insert("cert-manager", "pdd-token", "token", "s3cr3t").await;
///
///     let token = store.get_secret_value("cert-manager", "pdd-token", "token").await?;
///     assert_eq!(token, "s3cr3t");
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<(String, String), SecretData>>>,
}

// Values are credentials and stay out of Debug output.
impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore").finish_non_exhaustive()
    }
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one key of a secret, creating the secret if needed
    pub async fn insert(
        &self,
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .entry((namespace.into(), secret_name.into()))
            .or_default()
            .insert(key.into(), value.into());
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret_value(
        &self,
        namespace: &str,
        secret_name: &str,
        key: &str,
    ) -> Result<String, Error> {
        let guard = self.inner.read().await;
        let secret = guard
            .get(&(namespace.to_string(), secret_name.to_string()))
            .ok_or_else(|| Error::not_found(format!("secret \"{namespace}/{secret_name}\"")))?;

        secret.get(key).cloned().ok_or_else(|| {
            Error::not_found(format!(
                "key {key:?} not found in secret \"{namespace}/{secret_name}\""
            ))
        })
    }
}
