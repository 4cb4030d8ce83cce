//! # docgate-types: Core types for `docgate`
//!
//! This crate contains the identity and document types shared across the
//! `docgate` workspace:
//! - Document identifiers ([`DocId`])
//! - Principals ([`Principal`], [`UserPrincipal`], [`GroupPrincipal`])
//! - Domain-qualified name parsing ([`ParsedPrincipal`], [`DomainFormat`])

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub mod principal;

pub use principal::{
    DEFAULT_NAMESPACE, DomainFormat, GroupPrincipal, ParsedPrincipal, Principal, PrincipalError,
    PrincipalKind, UserPrincipal,
};

// ============================================================================
// Document IDs
// ============================================================================

/// Identifier of a document in the backend repository.
///
/// Opaque to the authorization engine; ACL inheritance refers to parents by
/// `DocId` rather than by holding the parent's ACL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
