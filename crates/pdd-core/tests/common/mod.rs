//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock provider keeps an in-memory zone and records every call so tests
//! can assert on exactly which API operations a reconciliation issued.

#![allow(dead_code)]

use pdd_core::error::TransportError;
use pdd_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, ProviderCall, ProviderResult, RecordType,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One API call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        domain: String,
    },
    Create {
        domain: String,
        subdomain: String,
        content: String,
        ttl: u32,
    },
    Update {
        record_id: u64,
        domain: String,
        subdomain: String,
        content: String,
        ttl: u32,
    },
    Delete {
        record_id: u64,
        domain: String,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::List { .. })
    }
}

/// Which endpoint a scripted failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    List,
    Create,
    Update,
    Delete,
}

/// A scripted failure
#[derive(Debug, Clone)]
pub enum Failure {
    /// HTTP 200 with `success: "error"`
    Reject(String),
    /// Request timed out
    Timeout,
    /// Non-200 status
    Status(u16),
}

impl Failure {
    fn into_call<T>(self) -> ProviderCall<T> {
        match self {
            Failure::Reject(message) => Ok(ProviderResult::rejected(message)),
            Failure::Timeout => Err(TransportError::Timeout {
                after: Duration::from_secs(30),
            }),
            Failure::Status(status) => Err(TransportError::Status {
                status,
                body: String::new(),
            }),
        }
    }
}

#[derive(Default)]
struct ZoneState {
    records: Vec<DnsRecord>,
    calls: Vec<Call>,
    failures: HashMap<Endpoint, Failure>,
}

/// In-memory DnsProvider that records calls
///
/// Clones share the same zone and call log.
#[derive(Clone)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ZoneState>>,
    next_id: Arc<AtomicU64>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ZoneState::default())),
            next_id: Arc::new(AtomicU64::new(1000)),
        }
    }

    /// Seed a record in listing order
    pub fn with_record(self, record: DnsRecord) -> Self {
        self.state.lock().unwrap().records.push(record);
        self
    }

    /// Make every call to `endpoint` fail with `failure`
    pub fn fail(&self, endpoint: Endpoint, failure: Failure) {
        self.state.lock().unwrap().failures.insert(endpoint, failure);
    }

    /// Stop failing calls to `endpoint`
    pub fn heal(&self, endpoint: Endpoint) {
        self.state.lock().unwrap().failures.remove(&endpoint);
    }

    /// Current zone contents
    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Every call issued so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the write calls issued so far
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn list_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn log(&self, call: Call) -> Option<Failure> {
        let endpoint = match &call {
            Call::List { .. } => Endpoint::List,
            Call::Create { .. } => Endpoint::Create,
            Call::Update { .. } => Endpoint::Update,
            Call::Delete { .. } => Endpoint::Delete,
        };
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.failures.get(&endpoint).cloned()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str) -> ProviderCall<Vec<DnsRecord>> {
        if let Some(failure) = self.log(Call::List {
            domain: domain.to_string(),
        }) {
            return failure.into_call();
        }

        let records = self
            .records()
            .into_iter()
            .filter(|r| r.domain == domain)
            .collect();
        Ok(ProviderResult::Success(records))
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord> {
        if let Some(failure) = self.log(Call::Create {
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            content: content.to_string(),
            ttl,
        }) {
            return failure.into_call();
        }

        let record = txt_record(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            domain,
            subdomain,
            content,
        );
        let record = DnsRecord { ttl, ..record };
        self.state.lock().unwrap().records.push(record.clone());
        Ok(ProviderResult::Success(record))
    }

    async fn update_record(
        &self,
        record_id: u64,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord> {
        if let Some(failure) = self.log(Call::Update {
            record_id,
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            content: content.to_string(),
            ttl,
        }) {
            return failure.into_call();
        }

        let mut state = self.state.lock().unwrap();
        match state.records.iter_mut().find(|r| r.record_id == record_id) {
            Some(record) => {
                record.subdomain = subdomain.to_string();
                record.content = content.to_string();
                record.ttl = ttl;
                Ok(ProviderResult::Success(record.clone()))
            }
            None => Ok(ProviderResult::rejected("not_found")),
        }
    }

    async fn delete_record(&self, record_id: u64, domain: &str) -> ProviderCall<()> {
        if let Some(failure) = self.log(Call::Delete {
            record_id,
            domain: domain.to_string(),
        }) {
            return failure.into_call();
        }

        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| r.record_id != record_id);
        if state.records.len() == before {
            return Ok(ProviderResult::rejected("not_found"));
        }
        Ok(ProviderResult::Success(()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out clones of one mock and remembering tokens
#[derive(Clone)]
pub struct MockFactory {
    pub provider: MockDnsProvider,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl MockFactory {
    pub fn new(provider: MockDnsProvider) -> Self {
        Self {
            provider,
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Tokens the factory was asked to authenticate with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl DnsProviderFactory for MockFactory {
    fn create(&self, token: &str) -> pdd_core::Result<Box<dyn DnsProvider>> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(Box::new(self.provider.clone()))
    }
}

/// Build a TXT record in `domain`
pub fn txt_record(record_id: u64, domain: &str, subdomain: &str, content: &str) -> DnsRecord {
    DnsRecord {
        record_id,
        record_type: RecordType::Txt,
        domain: domain.to_string(),
        fqdn: format!("{}.{}", subdomain, domain),
        subdomain: subdomain.to_string(),
        content: content.to_string(),
        ttl: 300,
        priority: 0,
    }
}

/// Build a record of another type in `domain`
pub fn other_record(
    record_id: u64,
    record_type: RecordType,
    domain: &str,
    subdomain: &str,
    content: &str,
) -> DnsRecord {
    DnsRecord {
        record_type,
        ..txt_record(record_id, domain, subdomain, content)
    }
}
