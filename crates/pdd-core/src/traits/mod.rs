//! Core traits for the PDD solver
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Manage records through a provider API
//! - [`SecretStore`]: Resolve credentials by namespace, secret and key

pub mod dns_provider;
pub mod secret_store;

pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, ProviderCall, ProviderResult, RecordType,
};
pub use secret_store::SecretStore;
