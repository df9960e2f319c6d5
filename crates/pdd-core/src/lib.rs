// # pdd-core
//
// Core library for solving ACME DNS-01 challenges against the PDD DNS API.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for managing records via a provider API
// - **SecretStore**: Trait for resolving provider credentials
// - **Reconciler**: Converges one TXT record to a desired state (create/update/delete)
// - **Solver**: Adapts host challenge requests to reconciler calls
//
// ## Design Principles
//
// 1. **Provider is the source of truth**: records are listed fresh on every call
// 2. **Two failure axes**: transport failures and provider rejections stay distinct
// 3. **No hidden retries**: every call is one pass; the host owns retry policy
// 4. **Idempotency**: presenting twice or cleaning up twice is harmless

pub mod traits;
pub mod reconciler;
pub mod solver;
pub mod config;
pub mod error;
pub mod secrets;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsProviderFactory, DnsRecord, ProviderResult, RecordType, SecretStore};
pub use reconciler::{ChallengeTarget, ReconcileOutcome, Reconciler};
pub use solver::{ChallengeRequest, Solver};
pub use config::{ReconcileSettings, SecretKeySelector, SolverConfig};
pub use error::{Error, Operation, Result, TransportError};
pub use secrets::{FileSecretStore, MemorySecretStore};
