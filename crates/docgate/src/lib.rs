//! # docgate
//!
//! Document authorization for search-appliance connectors.
//!
//! Connectors describe each document's access rules as an ACL that may
//! inherit from a parent document. The serving handler asks docgate whether
//! the requesting identity may see a document:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────────┐
//! │  Connector   │ →  │  Authorizer  │ →  │  docgate-acl      │
//! │ (builds ACLs)│    │ (config,     │    │ (chain + batch    │
//! │              │    │  audit log)  │    │  resolution)      │
//! └──────────────┘    └──────────────┘    └───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use docgate::{Acl, AuthnIdentity, Authorizer, AuthzStatus, DocId, DocgateConfig};
//!
//! let authz = Authorizer::from_config(&DocgateConfig::default()).without_audit();
//!
//! let alice = authz.user("alice")?;
//! let acl = authz.acl_builder().permit_users([alice.clone()]).build();
//!
//! let status = authz.authorize(&DocId::new("report.pdf"), &AuthnIdentity::new(alice), &[acl])?;
//! assert_eq!(status, AuthzStatus::Permit);
//! # Ok::<(), docgate::DocgateError>(())
//! ```

mod authorizer;
mod error;

pub use authorizer::Authorizer;
pub use error::{DocgateError, Result};

// Re-export the ACL model
pub use docgate_acl::{
    Acl, AclBuilder, AclError, AclRef, AclRetriever, AuthnIdentity, AuthzStatus, InheritanceType,
    RetrievalError, resolve_batch, resolve_chain,
};

// Re-export configuration
pub use docgate_config::{AuthzConfig, CaseSensitivity, ConfigLoader, DocgateConfig};

// Re-export core types
pub use docgate_types::{
    DocId, DomainFormat, GroupPrincipal, ParsedPrincipal, Principal, PrincipalError,
    PrincipalKind, UserPrincipal,
};
