//! Inheritance combination rules.
//!
//! Each rule folds the status accumulated below an ancestor (the "child")
//! with that ancestor's own local decision (the "parent"):
//!
//! | Rule              | Table (child, parent)               |
//! |-------------------|-------------------------------------|
//! | `ChildOverrides`  | (P,x)=P; (D,x)=D; (I,x)=x           |
//! | `ParentOverrides` | (x,P)=P; (x,D)=D; (x,I)=x           |
//! | `AndBothPermit`   | (P,P)=P; everything else D          |
//! | `LeafNode`        | always D                            |

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AclError;
use crate::status::AuthzStatus;

/// How an ACL combines with the ACLs that inherit from it.
///
/// The rule belongs to the ancestor: when a chain is folded, the ancestor's
/// rule decides how its local decision merges with everything beneath it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InheritanceType {
    /// The child's decision wins unless it is indeterminate.
    ChildOverrides,
    /// The parent's decision wins unless it is indeterminate.
    ParentOverrides,
    /// Access only when both sides permit.
    AndBothPermit,
    /// Nothing inherits from this ACL.
    #[default]
    LeafNode,
}

impl InheritanceType {
    pub const ALL: [InheritanceType; 4] = [
        InheritanceType::ChildOverrides,
        InheritanceType::ParentOverrides,
        InheritanceType::AndBothPermit,
        InheritanceType::LeafNode,
    ];

    /// Combines a child's accumulated status with a parent's local status.
    ///
    /// `LeafNode` never combines on a well-formed chain; invoked anyway it
    /// returns `Deny`.
    pub fn combine(self, child: AuthzStatus, parent: AuthzStatus) -> AuthzStatus {
        use AuthzStatus::{Deny, Indeterminate, Permit};

        match self {
            InheritanceType::ChildOverrides => match (child, parent) {
                (Permit, _) => Permit,
                (Deny, _) => Deny,
                (Indeterminate, parent) => parent,
            },
            InheritanceType::ParentOverrides => match (child, parent) {
                (_, Permit) => Permit,
                (_, Deny) => Deny,
                (child, Indeterminate) => child,
            },
            InheritanceType::AndBothPermit => match (child, parent) {
                (Permit, Permit) => Permit,
                (Permit | Deny | Indeterminate, Permit | Deny | Indeterminate) => Deny,
            },
            InheritanceType::LeafNode => Deny,
        }
    }

    /// Name used in feeds and configuration.
    pub fn common_form(self) -> &'static str {
        match self {
            InheritanceType::ChildOverrides => "child-overrides",
            InheritanceType::ParentOverrides => "parent-overrides",
            InheritanceType::AndBothPermit => "and-both-permit",
            InheritanceType::LeafNode => "leaf-node",
        }
    }
}

impl Display for InheritanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.common_form())
    }
}

impl FromStr for InheritanceType {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InheritanceType::ALL
            .into_iter()
            .find(|t| t.common_form() == s)
            .ok_or_else(|| AclError::InvalidArgument(format!("unknown inheritance type: {s:?}")))
    }
}
