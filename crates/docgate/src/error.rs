//! Error types for the docgate facade.

use docgate_acl::{AclError, AuthzStatus};
use docgate_types::{DocId, PrincipalError};
use thiserror::Error;

/// Error type for [`Authorizer`](crate::Authorizer) operations.
#[derive(Debug, Error)]
pub enum DocgateError {
    /// Resolution failed (malformed chain, retriever failure, null ACL).
    #[error(transparent)]
    Acl(#[from] AclError),

    /// A principal name was rejected.
    #[error(transparent)]
    Principal(#[from] PrincipalError),

    /// The identity may not see the document.
    #[error("Access denied to {doc_id}: {status}")]
    AccessDenied { doc_id: DocId, status: AuthzStatus },
}

/// Result type for docgate operations.
pub type Result<T> = std::result::Result<T, DocgateError>;
