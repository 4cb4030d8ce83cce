//! # docgate-acl: Document access-control lists
//!
//! Decides whether an identity may see a document, given per-document ACLs
//! that may inherit from parent documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Identity (user + optional groups)           │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!        ┌──────────┴───────────┐
//!        ▼                      ▼
//! ┌──────────────┐   ┌──────────────────────────┐
//! │ resolve_chain│   │ resolve_batch             │
//! │ (one doc,    │   │ ├─ rounds of retrieval    │
//! │  eager chain)│   │ ├─ per-call cache         │
//! └──────┬───────┘   │ └─ cycle / missing checks │
//!        │           └────────────┬─────────────┘
//!        └──────────┬─────────────┘
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Chain fold                                  │
//! │  leaf local decision, then each ancestor's   │
//! │  InheritanceType toward the root             │
//! └─────────────────┬───────────────────────────┘
//!                   ▼
//!          PERMIT / DENY / INDETERMINATE
//! ```
//!
//! ## Inheritance rules
//!
//! | Rule              | Result of `combine(child, parent)`       |
//! |-------------------|------------------------------------------|
//! | `ChildOverrides`  | child, unless child is indeterminate     |
//! | `ParentOverrides` | parent, unless parent is indeterminate   |
//! | `AndBothPermit`   | permit only if both permit, else deny    |
//! | `LeafNode`        | deny (never combined on a valid chain)   |
//!
//! ## Examples
//!
//! ```
//! use docgate_acl::{Acl, AuthnIdentity, AuthzStatus, InheritanceType, resolve_chain};
//! use docgate_types::{GroupPrincipal, UserPrincipal};
//!
//! let engineering = GroupPrincipal::new("eng")?;
//! let site = Acl::builder()
//!     .permit_groups([engineering.clone()])
//!     .inheritance_type(InheritanceType::ChildOverrides)
//!     .build();
//! let page = Acl::builder()
//!     .deny_users([UserPrincipal::new("intern")?])
//!     .inherit_from("site")
//!     .build();
//!
//! let dev = AuthnIdentity::with_groups(UserPrincipal::new("dev")?, [engineering.clone()]);
//! let intern = AuthnIdentity::with_groups(UserPrincipal::new("intern")?, [engineering]);
//!
//! let chain = [site, page];
//! assert_eq!(resolve_chain(&dev, &chain)?, AuthzStatus::Permit);
//! assert_eq!(resolve_chain(&intern, &chain)?, AuthzStatus::Deny);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod acl;
pub mod batch;
pub mod chain;
pub mod error;
pub mod identity;
pub mod inheritance;
pub mod status;

pub use acl::{Acl, AclBuilder, AclRef};
pub use batch::{AclRetriever, resolve_batch};
pub use chain::{resolve_chain, validate_chain};
pub use error::{AclError, Result, RetrievalError};
pub use identity::AuthnIdentity;
pub use inheritance::InheritanceType;
pub use status::AuthzStatus;

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;
