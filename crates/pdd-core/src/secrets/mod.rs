// # Secret Store Implementations
//
// This module provides implementations of the SecretStore trait for
// different credential backends.

pub mod file;
pub mod memory;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
