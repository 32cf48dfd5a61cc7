//! Core functionality for Counsel AI deployments: an encrypted record vault
//! and a fail-closed trust gate for the trusted-model registry.
//!
//! The two subsystems are independent and share only an error philosophy:
//! on any cryptographic or verification failure, refuse the operation
//! rather than proceeding with degraded trust.
//!
//! - [`vault`]: passphrase-derived authenticated encryption over a single
//!   snapshot file holding a map of versioned records.
//! - [`registry`]: existence, signature, hash, and freshness verification
//!   of the registry artifact set, run once at process bootstrap before any
//!   registry consumer is activated.

pub mod registry;
pub mod vault;
