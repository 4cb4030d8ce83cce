//! Error types for ACL construction and authorization.

use docgate_types::PrincipalError;
use thiserror::Error;

use crate::acl::AclRef;

/// Error returned by an [`AclRetriever`](crate::batch::AclRetriever).
///
/// Retrievers usually wrap I/O against a directory or metadata store, so any
/// error type is accepted.
pub type RetrievalError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for ACL operations.
#[derive(Debug, Error)]
pub enum AclError {
    /// A value handed to the ACL API was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An inheritance chain was empty or structurally inconsistent.
    #[error("Invalid ACL chain: {reason}")]
    InvalidChain { reason: String },

    /// A retriever returned an entry without an ACL.
    #[error("Retriever returned a null ACL for {acl_ref}")]
    NullAcl { acl_ref: AclRef },

    /// The retriever itself failed.
    #[error("ACL retrieval failed: {0}")]
    Retrieval(#[source] RetrievalError),

    /// A principal could not be constructed.
    #[error(transparent)]
    Principal(#[from] PrincipalError),
}

/// Result type for ACL operations.
pub type Result<T> = std::result::Result<T, AclError>;
