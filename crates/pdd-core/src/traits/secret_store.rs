// # Secret Store Trait
//
// Defines how the solver obtains provider credentials.
//
// ## Purpose
//
// Issuer configuration only names a secret (`name` + `key`); the token
// itself lives in whatever secret backend the host runs with. The solver
// receives that backend as an injected capability so the reconciler and
// provider client can be exercised without a cluster.
//
// ## Implementations
//
// - In-memory: `MemorySecretStore`
// - Mounted secret volumes: `FileSecretStore`
//
// ## Usage
//
// ```rust,ignore
// use pdd_core::SecretStore;
//
// async fn token(store: &dyn SecretStore) -> pdd_core::Result<String> {
//     store.get_secret_value("cert-manager", "pdd-token", "token").await
// }
// ```

use async_trait::async_trait;

/// Trait for secret store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// Returned values are treated as opaque by the caller.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get one key of a secret
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The secret value
    /// - `Err(Error::NotFound)`: The secret or the key does not exist
    /// - `Err(Error)`: The backend could not be read
    async fn get_secret_value(
        &self,
        namespace: &str,
        secret_name: &str,
        key: &str,
    ) -> Result<String, crate::Error>;
}
