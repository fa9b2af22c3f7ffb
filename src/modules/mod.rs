//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for the managed services the application delegates to:
//! object storage for binaries and a document store for metadata.

pub mod document_store;
pub mod storage;
