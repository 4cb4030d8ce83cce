//! Three-valued authorization outcome.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Result of evaluating an identity against one ACL or a whole chain.
///
/// Only [`AuthzStatus::Permit`] grants access; callers serve both
/// `Deny` and `Indeterminate` as "no access".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthzStatus {
    Permit,
    Deny,
    /// The ACL says nothing about this identity.
    Indeterminate,
}

impl AuthzStatus {
    pub const ALL: [AuthzStatus; 3] = [
        AuthzStatus::Permit,
        AuthzStatus::Deny,
        AuthzStatus::Indeterminate,
    ];

    pub fn is_permit(self) -> bool {
        self == AuthzStatus::Permit
    }

    /// Merges two independent decisions about the same ACL.
    ///
    /// Deny dominates permit, and permit dominates indeterminate.
    pub fn dominant(self, other: AuthzStatus) -> AuthzStatus {
        match (self, other) {
            (AuthzStatus::Deny, _) | (_, AuthzStatus::Deny) => AuthzStatus::Deny,
            (AuthzStatus::Permit, _) | (_, AuthzStatus::Permit) => AuthzStatus::Permit,
            (AuthzStatus::Indeterminate, AuthzStatus::Indeterminate) => AuthzStatus::Indeterminate,
        }
    }

    /// Decision for one principal set pair: deny wins over permit.
    pub(crate) fn from_matches(denied: bool, permitted: bool) -> AuthzStatus {
        if denied {
            AuthzStatus::Deny
        } else if permitted {
            AuthzStatus::Permit
        } else {
            AuthzStatus::Indeterminate
        }
    }
}

impl Display for AuthzStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthzStatus::Permit => f.write_str("PERMIT"),
            AuthzStatus::Deny => f.write_str("DENY"),
            AuthzStatus::Indeterminate => f.write_str("INDETERMINATE"),
        }
    }
}
