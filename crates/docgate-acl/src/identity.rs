//! Authenticated identity as seen by the authorization engine.

use std::collections::BTreeSet;

use docgate_types::{GroupPrincipal, UserPrincipal};

/// An authenticated user and, when known, the groups the user belongs to.
///
/// `groups` is `None` when membership could not be determined; group entries
/// in an ACL then never match, which is different from an empty membership
/// only in intent, not in outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthnIdentity {
    user: UserPrincipal,
    groups: Option<BTreeSet<GroupPrincipal>>,
}

impl AuthnIdentity {
    /// Creates an identity whose group membership is unknown.
    pub fn new(user: UserPrincipal) -> Self {
        Self { user, groups: None }
    }

    /// Creates an identity with resolved group membership.
    pub fn with_groups(user: UserPrincipal, groups: impl IntoIterator<Item = GroupPrincipal>) -> Self {
        Self {
            user,
            groups: Some(groups.into_iter().collect()),
        }
    }

    pub fn user(&self) -> &UserPrincipal {
        &self.user
    }

    /// Groups of the user, or `None` if membership is unknown.
    pub fn groups(&self) -> Option<&BTreeSet<GroupPrincipal>> {
        self.groups.as_ref()
    }
}
