//! DNS-01 challenge solver
//!
//! Thin adapter between a host challenge framework and the [`Reconciler`]:
//! decodes the issuer config, resolves the PDD token through the injected
//! [`SecretStore`], splits the resolved FQDN into zone and entry, and runs
//! one reconciliation pass.
//!
//! The host owns retries and backoff; every call here is a single attempt.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ReconcileSettings, SolverConfig};
use crate::error::{Error, Operation, Result};
use crate::reconciler::{ChallengeTarget, ReconcileOutcome, Reconciler};
use crate::traits::{DnsProviderFactory, SecretStore};

/// Solver name as referenced from issuer configuration
pub const SOLVER_NAME: &str = "yandexConnect";

/// A DNS-01 challenge as handed over by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Namespace the issuer's secrets live in
    pub resource_namespace: String,
    /// Zone the record goes into, usually with a trailing dot
    pub resolved_zone: String,
    /// Full record name, usually with a trailing dot
    pub resolved_fqdn: String,
    /// TXT content to publish
    pub key: String,
    /// Raw issuer configuration block
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Split a resolved FQDN into `(domain, subdomain)`
///
/// Trailing dots are dropped from both inputs. The FQDN must be the zone
/// itself or lie under it; the zone apex is returned as `@`.
///
/// ```
/// use pdd_core::solver::split_fqdn;
///
/// let (domain, subdomain) = split_fqdn("_acme-challenge.example.com.", "example.com.").unwrap();
/// assert_eq!(domain, "example.com");
/// assert_eq!(subdomain, "_acme-challenge");
/// ```
pub fn split_fqdn(fqdn: &str, zone: &str) -> Result<(String, String)> {
    let domain = zone.trim_end_matches('.');
    let name = fqdn.trim_end_matches('.');

    if domain.is_empty() {
        return Err(Error::invalid_input("resolved zone is empty"));
    }

    if name == domain {
        return Ok((domain.to_string(), "@".to_string()));
    }

    match name.strip_suffix(domain).and_then(|rest| rest.strip_suffix('.')) {
        Some(entry) if !entry.is_empty() => Ok((domain.to_string(), entry.to_string())),
        _ => Err(Error::invalid_input(format!(
            "FQDN {fqdn:?} is not inside zone {zone:?}"
        ))),
    }
}

/// DNS-01 solver backed by the PDD DNS API
pub struct Solver {
    secrets: Arc<dyn SecretStore>,
    factory: Box<dyn DnsProviderFactory>,
    settings: ReconcileSettings,
}

impl Solver {
    /// Create a solver
    ///
    /// # Parameters
    ///
    /// - `secrets`: Where PDD tokens are looked up
    /// - `factory`: Builds an authenticated provider client per challenge
    /// - `settings`: Record TTL and other solver-wide knobs
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        factory: Box<dyn DnsProviderFactory>,
        settings: ReconcileSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            secrets,
            factory,
            settings,
        })
    }

    /// Solver name as referenced from issuer configuration
    pub fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    /// Publish the challenge TXT record
    ///
    /// Safe to call repeatedly with the same request.
    pub async fn present(&self, request: &ChallengeRequest) -> Result<ReconcileOutcome> {
        info!(
            namespace = %request.resource_namespace,
            zone = %request.resolved_zone,
            fqdn = %request.resolved_fqdn,
            "Presenting DNS-01 challenge"
        );

        let reconciler = self.reconciler_for(request).await?;
        let (domain, subdomain) = split_fqdn(&request.resolved_fqdn, &request.resolved_zone)?;
        let target = ChallengeTarget::new(domain, subdomain, &request.key, self.settings.ttl);
        debug!(domain = %target.domain, subdomain = %target.subdomain, "Resolved challenge target");

        reconciler.ensure_present(&target).await.map_err(|e| {
            let step = match e.operation() {
                Some(Operation::Update) => "unable to change TXT record",
                Some(Operation::Create) => "unable to create TXT record",
                _ => "unable to check TXT record",
            };
            e.context(step)
        })
    }

    /// Remove the challenge TXT record
    ///
    /// Succeeds without writing when the record is already gone.
    pub async fn clean_up(&self, request: &ChallengeRequest) -> Result<ReconcileOutcome> {
        info!(
            namespace = %request.resource_namespace,
            zone = %request.resolved_zone,
            fqdn = %request.resolved_fqdn,
            "Cleaning up DNS-01 challenge"
        );

        let reconciler = self.reconciler_for(request).await?;
        let (domain, subdomain) = split_fqdn(&request.resolved_fqdn, &request.resolved_zone)?;

        reconciler.ensure_absent(&domain, &subdomain).await.map_err(|e| {
            let step = match e.operation() {
                Some(Operation::Delete) => "unable to remove TXT record",
                _ => "unable to check TXT record",
            };
            e.context(step)
        })
    }

    async fn reconciler_for(&self, request: &ChallengeRequest) -> Result<Reconciler> {
        let config = SolverConfig::from_json(request.config.as_ref())
            .and_then(|config| config.validate().map(|_| config))
            .map_err(|e| e.context("unable to load config"))?;

        let selector = &config.pdd_token_secret_ref;
        debug!(secret = %selector.name, key = %selector.key, "Loading PDD token");

        let token = self
            .secrets
            .get_secret_value(&request.resource_namespace, &selector.name, &selector.key)
            .await
            .map_err(|e| e.context("unable to get PDD token"))?;

        let provider = self.factory.create(&token)?;
        Ok(Reconciler::new(provider))
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("name", &SOLVER_NAME)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
