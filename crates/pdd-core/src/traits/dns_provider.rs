// # DNS Provider Trait
//
// Defines the record-management interface the reconciler drives.
//
// ## Implementations
//
// - Yandex PDD: `pdd-provider-yandex` crate
//
// ## Usage
//
// ```rust,ignore
// use pdd_core::error::TransportError;
// use pdd_core::traits::{DnsProvider, ProviderResult};
//
// async fn show(provider: &dyn DnsProvider) -> Result<(), TransportError> {
//     match provider.list_records("example.com").await? {
//         ProviderResult::Success(records) => println!("{} records", records.len()),
//         ProviderResult::Error { message } => println!("rejected: {message}"),
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TransportError;

/// DNS record type as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Srv,
    Soa,
    Txt,
    /// Any type this crate does not manage
    #[serde(other)]
    Other,
}

/// A DNS record held by the provider
///
/// Records are fetched fresh on every reconciliation and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub record_id: u64,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Zone the record lives in
    #[serde(default)]
    pub domain: String,

    /// Fully qualified name, informational only
    #[serde(default)]
    pub fqdn: String,

    /// Name relative to the zone, `@` for the zone apex
    #[serde(default)]
    pub subdomain: String,

    /// Record value
    #[serde(default)]
    pub content: String,

    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: u32,

    /// MX/SRV priority, unused for TXT
    #[serde(default, deserialize_with = "lenient_u32")]
    pub priority: u32,
}

impl DnsRecord {
    /// Whether this is the TXT record published under `subdomain`
    ///
    /// The comparison is exact and case-sensitive; `_acme-challenge-old`
    /// does not match `_acme-challenge`.
    pub fn is_txt_for(&self, subdomain: &str) -> bool {
        self.record_type == RecordType::Txt && self.subdomain == subdomain
    }
}

// The API reports priority as a number for MX/SRV and as "" or null elsewhere.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(0),
    }
}

/// Outcome of a provider call that reached the API
///
/// The provider answers HTTP 200 whether or not it accepted the request;
/// acceptance is read from the body. Transport failures are reported
/// separately as [`TransportError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResult<T> {
    /// The provider accepted the request
    Success(T),
    /// The provider rejected the request
    Error {
        /// Provider-supplied error string
        message: String,
    },
}

impl<T> ProviderResult<T> {
    /// Build a rejection
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Convert into a `Result`, keeping the provider message as the error
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error { message } => Err(message),
        }
    }
}

/// Return type of every provider call
pub type ProviderCall<T> = Result<ProviderResult<T>, TransportError>;

/// Trait for DNS provider clients
///
/// Implementations speak one provider's record-management protocol and
/// nothing else.
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the host framework owns retry policy)
/// - ❌ Search for records on write paths (callers resolve ids via `list_records`)
/// - ❌ Cache records between calls
/// - ❌ Spawn tasks that outlive a call
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record in `domain`, in provider order
    async fn list_records(&self, domain: &str) -> ProviderCall<Vec<DnsRecord>>;

    /// Create a TXT record and return it with its assigned id
    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord>;

    /// Overwrite the TXT record `record_id`
    async fn update_record(
        &self,
        record_id: u64,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord>;

    /// Delete the record `record_id`
    async fn delete_record(&self, record_id: u64, domain: &str) -> ProviderCall<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from a credential
///
/// Credentials are looked up per challenge, so providers are built per
/// call rather than once at startup.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider authenticated with `token`
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_wire_shape() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "record_id": 42,
            "type": "TXT",
            "domain": "example.com",
            "fqdn": "_acme-challenge.example.com",
            "ttl": 300,
            "subdomain": "_acme-challenge",
            "content": "token",
            "priority": ""
        }))
        .unwrap();

        assert_eq!(record.record_id, 42);
        assert_eq!(record.record_type, RecordType::Txt);
        assert_eq!(record.priority, 0);
        assert!(record.is_txt_for("_acme-challenge"));
    }

    #[test]
    fn unknown_type_and_missing_optionals_are_tolerated() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "record_id": 1,
            "type": "CAA",
            "domain": "example.com",
            "subdomain": "@",
            "content": "0 issue \"letsencrypt.org\""
        }))
        .unwrap();

        assert_eq!(record.record_type, RecordType::Other);
        assert_eq!(record.ttl, 0);
        assert_eq!(record.fqdn, "");
    }

    #[test]
    fn numeric_priority_in_either_form() {
        for priority in [serde_json::json!(10), serde_json::json!("10")] {
            let record: DnsRecord = serde_json::from_value(serde_json::json!({
                "record_id": 3,
                "type": "MX",
                "domain": "example.com",
                "subdomain": "@",
                "content": "mx.example.com.",
                "priority": priority
            }))
            .unwrap();
            assert_eq!(record.priority, 10);
        }
    }

    #[test]
    fn match_is_exact_and_txt_only() {
        let mut record = DnsRecord {
            record_id: 5,
            record_type: RecordType::Txt,
            domain: "example.com".into(),
            fqdn: String::new(),
            subdomain: "_acme-challenge-old".into(),
            content: "x".into(),
            ttl: 300,
            priority: 0,
        };
        assert!(!record.is_txt_for("_acme-challenge"));
        assert!(!record.is_txt_for("_ACME-CHALLENGE-OLD"));

        record.record_type = RecordType::Cname;
        assert!(!record.is_txt_for("_acme-challenge-old"));
    }

    #[test]
    fn records_missing_text_fields_still_decode() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "record_id": 1,
            "type": "NS",
            "domain": "example.com",
            "subdomain": "@",
            "priority": ""
        }))
        .unwrap();
        assert_eq!(record.record_type, RecordType::Ns);
        assert_eq!(record.content, "");

        let bare: DnsRecord =
            serde_json::from_value(serde_json::json!({ "record_id": 2, "type": "TXT" })).unwrap();
        assert_eq!(bare.subdomain, "");
        assert!(!bare.is_txt_for("_acme-challenge"));
    }

    #[test]
    fn provider_result_into_result() {
        let ok: ProviderResult<u32> = ProviderResult::Success(2);
        assert_eq!(ok.into_result(), Ok(2));

        let err: ProviderResult<u32> = ProviderResult::rejected("no_auth");
        assert_eq!(err.into_result(), Err("no_auth".to_string()));
    }
}
