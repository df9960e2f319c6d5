//! TXT record reconciler
//!
//! The Reconciler converges the provider's TXT record for a
//! (domain, subdomain) pair to a desired state:
//! - Lists the zone's records via DnsProvider
//! - Picks the first TXT record whose subdomain matches exactly
//! - Creates, overwrites or deletes it
//!
//! ## State Machine
//!
//! ```text
//! START ──► LOOKUP ──┬── FOUND ─────► WRITE (update | delete) ──► SUCCESS
//!                    │                                       └──► FAILED
//!                    └── NOT_FOUND ─► WRITE (create) ─────────► SUCCESS
//!                                 └─► DONE (absent already)    FAILED
//! ```
//!
//! Each call is one pass through this machine. Nothing is retried and
//! nothing is remembered between calls: the provider is the source of
//! truth and may be mutated by other actors at any time.
//!
//! ## Limitations
//!
//! - Several TXT records under the same subdomain are left alone except the
//!   first in listing order.
//! - List-then-write is not atomic; two concurrent reconciliations of the
//!   same name can lose an update. The provider offers no conditional writes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Operation, Result};
use crate::traits::{DnsProvider, DnsRecord, ProviderCall};

/// Desired TXT record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTarget {
    /// Zone, without trailing dot
    pub domain: String,
    /// Entry relative to the zone, without trailing dot
    pub subdomain: String,
    /// Expected TXT content
    pub value: String,
    /// TTL in seconds
    pub ttl: u32,
}

impl ChallengeTarget {
    /// Create a new target
    pub fn new(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            value: value.into(),
            ttl,
        }
    }

    /// Human-readable record name, used in logs and errors
    pub fn record_name(&self) -> String {
        record_name(&self.domain, &self.subdomain)
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No matching record existed; one was created
    Created {
        /// The record as returned by the provider
        record: DnsRecord,
    },
    /// A matching record was overwritten
    Updated {
        /// The record as returned by the provider
        record: DnsRecord,
        /// Content before the overwrite
        previous_content: String,
    },
    /// A matching record was deleted
    Deleted {
        /// Id of the deleted record
        record_id: u64,
    },
    /// No matching record existed; nothing was written
    AlreadyAbsent,
}

impl ReconcileOutcome {
    /// Whether the pass issued a write call
    pub fn wrote(&self) -> bool {
        !matches!(self, ReconcileOutcome::AlreadyAbsent)
    }
}

/// Idempotent TXT record reconciler
///
/// Holds only its provider. A reconciler can be built per challenge or
/// shared read-only between concurrent calls.
pub struct Reconciler {
    provider: Box<dyn DnsProvider>,
}

impl Reconciler {
    /// Create a reconciler driving `provider`
    pub fn new(provider: Box<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Find the TXT record managed for `subdomain` in `domain`
    ///
    /// Returns the first record in listing order whose type is TXT and whose
    /// subdomain equals `subdomain` exactly. A missing record is `Ok(None)`;
    /// list failures are errors, never absence.
    pub async fn find(&self, domain: &str, subdomain: &str) -> Result<Option<DnsRecord>> {
        let name = record_name(domain, subdomain);
        debug!(domain = %domain, subdomain = %subdomain, "Looking up TXT record");

        let records = settle(
            self.provider.list_records(domain).await,
            Operation::List,
            &name,
        )?;

        let mut matches = records.into_iter().filter(|r| r.is_txt_for(subdomain));
        let found = matches.next();
        let extra = matches.count();
        if extra > 0 {
            warn!(
                record = %name,
                extra,
                "Multiple TXT records share this name; managing the first one only"
            );
        }

        match &found {
            Some(record) => debug!(record = %name, record_id = record.record_id, "TXT record found"),
            None => debug!(record = %name, "No TXT record found"),
        }
        Ok(found)
    }

    /// Make sure the TXT record exists with the target content
    ///
    /// An existing record is overwritten with the target value and TTL even
    /// when it already matches, so calling this twice is harmless.
    pub async fn ensure_present(&self, target: &ChallengeTarget) -> Result<ReconcileOutcome> {
        let name = target.record_name();

        match self.find(&target.domain, &target.subdomain).await? {
            Some(existing) => {
                info!(
                    record = %name,
                    record_id = existing.record_id,
                    provider = self.provider_name(),
                    "Updating TXT record"
                );
                let record = settle(
                    self.provider
                        .update_record(
                            existing.record_id,
                            &target.domain,
                            &target.subdomain,
                            &target.value,
                            target.ttl,
                        )
                        .await,
                    Operation::Update,
                    &name,
                )?;
                info!(record = %name, record_id = record.record_id, "TXT record updated");
                Ok(ReconcileOutcome::Updated {
                    record,
                    previous_content: existing.content,
                })
            }
            None => {
                info!(record = %name, provider = self.provider_name(), "Creating TXT record");
                let record = settle(
                    self.provider
                        .create_record(&target.domain, &target.subdomain, &target.value, target.ttl)
                        .await,
                    Operation::Create,
                    &name,
                )?;
                info!(record = %name, record_id = record.record_id, "TXT record created");
                Ok(ReconcileOutcome::Created { record })
            }
        }
    }

    /// Make sure no TXT record exists for `subdomain` in `domain`
    ///
    /// Absence is success: cleanup may be invoked repeatedly or after a
    /// partial failure.
    pub async fn ensure_absent(&self, domain: &str, subdomain: &str) -> Result<ReconcileOutcome> {
        let name = record_name(domain, subdomain);

        let Some(existing) = self.find(domain, subdomain).await? else {
            info!(record = %name, "TXT record already absent");
            return Ok(ReconcileOutcome::AlreadyAbsent);
        };

        info!(
            record = %name,
            record_id = existing.record_id,
            provider = self.provider_name(),
            "Deleting TXT record"
        );
        settle(
            self.provider.delete_record(existing.record_id, domain).await,
            Operation::Delete,
            &name,
        )?;
        info!(record = %name, record_id = existing.record_id, "TXT record deleted");

        Ok(ReconcileOutcome::Deleted {
            record_id: existing.record_id,
        })
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("provider", &self.provider_name())
            .finish()
    }
}

/// Flatten a provider call into the crate result, attaching context
fn settle<T>(call: ProviderCall<T>, operation: Operation, target: &str) -> Result<T> {
    call.map_err(|source| Error::transport(operation, target, source))?
        .into_result()
        .map_err(|message| Error::provider(operation, target, message))
}

fn record_name(domain: &str, subdomain: &str) -> String {
    if subdomain.is_empty() || subdomain == "@" {
        domain.to_string()
    } else {
        format!("{}.{}", subdomain, domain)
    }
}
