//! Access-control lists.
//!
//! An [`Acl`] is the permit/deny record attached to one document. It may
//! point at a parent document's ACL through an [`AclRef`]; the pointer is only
//! an identifier, resolved later by a chain or batch resolver.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display};

use docgate_types::{DocId, GroupPrincipal, ParsedPrincipal, Principal, PrincipalKind, UserPrincipal};
use serde::{Deserialize, Serialize};

use crate::error::{AclError, Result};
use crate::identity::AuthnIdentity;
use crate::inheritance::InheritanceType;
use crate::status::AuthzStatus;

// ============================================================================
// AclRef
// ============================================================================

/// Reference to the ACL of a document, optionally one of several named ACL
/// slots (fragments) on that document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAclRef")]
pub struct AclRef {
    doc_id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    fragment: Option<String>,
}

impl AclRef {
    /// References the primary ACL of `doc_id`.
    pub fn new(doc_id: impl Into<DocId>) -> Self {
        Self {
            doc_id: doc_id.into(),
            fragment: None,
        }
    }

    /// References the ACL slot `fragment` of `doc_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::InvalidArgument`] if `fragment` is blank.
    pub fn with_fragment(doc_id: impl Into<DocId>, fragment: impl Into<String>) -> Result<Self> {
        let fragment = fragment.into();
        if fragment.trim().is_empty() {
            return Err(AclError::InvalidArgument(
                "ACL fragment cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            doc_id: doc_id.into(),
            fragment: Some(fragment),
        })
    }

    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl Display for AclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{fragment}", self.doc_id),
            None => write!(f, "{}", self.doc_id),
        }
    }
}

impl From<DocId> for AclRef {
    fn from(doc_id: DocId) -> Self {
        Self::new(doc_id)
    }
}

impl From<&str> for AclRef {
    fn from(doc_id: &str) -> Self {
        Self::new(doc_id)
    }
}

#[derive(Deserialize)]
struct RawAclRef {
    doc_id: DocId,
    #[serde(default)]
    fragment: Option<String>,
}

impl TryFrom<RawAclRef> for AclRef {
    type Error = AclError;

    fn try_from(raw: RawAclRef) -> Result<Self> {
        match raw.fragment {
            Some(fragment) => AclRef::with_fragment(raw.doc_id, fragment),
            None => Ok(AclRef::new(raw.doc_id)),
        }
    }
}

// ============================================================================
// Acl
// ============================================================================

/// Immutable access-control list for one document.
///
/// Built with [`AclBuilder`]. The principal sets are only ever handed out as
/// shared references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Acl {
    permit_users: BTreeSet<UserPrincipal>,
    deny_users: BTreeSet<UserPrincipal>,
    permit_groups: BTreeSet<GroupPrincipal>,
    deny_groups: BTreeSet<GroupPrincipal>,
    inherit_from: Option<AclRef>,
    inheritance_type: InheritanceType,
    case_sensitive: bool,
}

impl Acl {
    /// ACL with no entries and no parent. Alone it is indeterminate for
    /// every identity.
    pub const EMPTY: Acl = Acl {
        permit_users: BTreeSet::new(),
        deny_users: BTreeSet::new(),
        permit_groups: BTreeSet::new(),
        deny_groups: BTreeSet::new(),
        inherit_from: None,
        inheritance_type: InheritanceType::LeafNode,
        case_sensitive: true,
    };

    pub fn builder() -> AclBuilder {
        AclBuilder::new()
    }

    /// Returns a builder pre-populated with a copy of this ACL.
    pub fn to_builder(&self) -> AclBuilder {
        AclBuilder {
            permit_users: self.permit_users.clone(),
            deny_users: self.deny_users.clone(),
            permit_groups: self.permit_groups.clone(),
            deny_groups: self.deny_groups.clone(),
            inherit_from: self.inherit_from.clone(),
            inheritance_type: self.inheritance_type,
            case_sensitive: self.case_sensitive,
        }
    }

    pub fn permit_users(&self) -> &BTreeSet<UserPrincipal> {
        &self.permit_users
    }

    pub fn deny_users(&self) -> &BTreeSet<UserPrincipal> {
        &self.deny_users
    }

    pub fn permit_groups(&self) -> &BTreeSet<GroupPrincipal> {
        &self.permit_groups
    }

    pub fn deny_groups(&self) -> &BTreeSet<GroupPrincipal> {
        &self.deny_groups
    }

    /// Parent ACL this one inherits from, if any.
    pub fn inherit_from(&self) -> Option<&AclRef> {
        self.inherit_from.as_ref()
    }

    pub fn inheritance_type(&self) -> InheritanceType {
        self.inheritance_type
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Decides access for `identity` from this ACL's entries alone,
    /// ignoring inheritance.
    ///
    /// User entries and group entries are decided separately; a deny from
    /// either side wins, then a permit, else the result is indeterminate.
    /// Group entries are only consulted when the identity's membership is
    /// known.
    ///
    /// # Postcondition
    ///
    /// Total: every ACL and identity yields a status.
    pub fn is_authorized_local(&self, identity: &AuthnIdentity) -> AuthzStatus {
        let (user_status, group_status) = if self.case_sensitive {
            self.decide_exact(identity)
        } else {
            self.decide_folded(identity)
        };

        user_status.dominant(group_status)
    }

    fn decide_exact(&self, identity: &AuthnIdentity) -> (AuthzStatus, AuthzStatus) {
        let user = identity.user();
        let user_status = AuthzStatus::from_matches(
            self.deny_users.contains(user),
            self.permit_users.contains(user),
        );

        let group_status = match identity.groups() {
            Some(groups) => AuthzStatus::from_matches(
                groups.iter().any(|g| self.deny_groups.contains(g)),
                groups.iter().any(|g| self.permit_groups.contains(g)),
            ),
            None => AuthzStatus::Indeterminate,
        };

        (user_status, group_status)
    }

    fn decide_folded(&self, identity: &AuthnIdentity) -> (AuthzStatus, AuthzStatus) {
        let user = common_form(identity.user());
        let user_status = AuthzStatus::from_matches(
            self.deny_users.iter().any(|u| common_form(u) == user),
            self.permit_users.iter().any(|u| common_form(u) == user),
        );

        let group_status = match identity.groups() {
            Some(groups) => {
                let held: HashSet<ParsedPrincipal> = groups.iter().map(|g| common_form(g)).collect();
                AuthzStatus::from_matches(
                    self.deny_groups.iter().any(|g| held.contains(&common_form(g))),
                    self.permit_groups.iter().any(|g| held.contains(&common_form(g))),
                )
            }
            None => AuthzStatus::Indeterminate,
        };

        (user_status, group_status)
    }
}

impl Default for Acl {
    fn default() -> Self {
        Acl::EMPTY
    }
}

fn common_form(principal: &Principal) -> ParsedPrincipal {
    principal.parse().common_form()
}

// ============================================================================
// AclBuilder
// ============================================================================

/// Builder for [`Acl`].
///
/// The builder owns its collections and [`AclBuilder::build`] snapshots
/// them, so a built ACL never observes later changes to the builder.
#[derive(Debug, Clone)]
pub struct AclBuilder {
    permit_users: BTreeSet<UserPrincipal>,
    deny_users: BTreeSet<UserPrincipal>,
    permit_groups: BTreeSet<GroupPrincipal>,
    deny_groups: BTreeSet<GroupPrincipal>,
    inherit_from: Option<AclRef>,
    inheritance_type: InheritanceType,
    case_sensitive: bool,
}

impl AclBuilder {
    pub fn new() -> Self {
        Acl::EMPTY.to_builder()
    }

    /// Replaces the permitted users.
    pub fn permit_users(mut self, users: impl IntoIterator<Item = UserPrincipal>) -> Self {
        self.permit_users = users.into_iter().collect();
        self
    }

    /// Replaces the denied users.
    pub fn deny_users(mut self, users: impl IntoIterator<Item = UserPrincipal>) -> Self {
        self.deny_users = users.into_iter().collect();
        self
    }

    /// Replaces the permitted groups.
    pub fn permit_groups(mut self, groups: impl IntoIterator<Item = GroupPrincipal>) -> Self {
        self.permit_groups = groups.into_iter().collect();
        self
    }

    /// Replaces the denied groups.
    pub fn deny_groups(mut self, groups: impl IntoIterator<Item = GroupPrincipal>) -> Self {
        self.deny_groups = groups.into_iter().collect();
        self
    }

    /// Replaces both permitted users and permitted groups from a mixed list.
    pub fn permits(self, principals: impl IntoIterator<Item = Principal>) -> Self {
        let (users, groups) = split_by_kind(principals);
        self.permit_users(users).permit_groups(groups)
    }

    /// Replaces both denied users and denied groups from a mixed list.
    pub fn denies(self, principals: impl IntoIterator<Item = Principal>) -> Self {
        let (users, groups) = split_by_kind(principals);
        self.deny_users(users).deny_groups(groups)
    }

    /// Sets the parent ACL.
    pub fn inherit_from(mut self, parent: impl Into<AclRef>) -> Self {
        self.inherit_from = Some(parent.into());
        self
    }

    /// Removes the parent ACL, making this a root.
    pub fn no_inheritance(mut self) -> Self {
        self.inherit_from = None;
        self
    }

    pub fn inheritance_type(mut self, inheritance_type: InheritanceType) -> Self {
        self.inheritance_type = inheritance_type;
        self
    }

    /// Sets whether principal names are matched case-sensitively.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn everything_case_sensitive(self) -> Self {
        self.case_sensitive(true)
    }

    pub fn everything_case_insensitive(self) -> Self {
        self.case_sensitive(false)
    }

    /// Builds an ACL from a snapshot of the builder's current contents.
    pub fn build(&self) -> Acl {
        Acl {
            permit_users: self.permit_users.clone(),
            deny_users: self.deny_users.clone(),
            permit_groups: self.permit_groups.clone(),
            deny_groups: self.deny_groups.clone(),
            inherit_from: self.inherit_from.clone(),
            inheritance_type: self.inheritance_type,
            case_sensitive: self.case_sensitive,
        }
    }
}

impl Default for AclBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn split_by_kind(
    principals: impl IntoIterator<Item = Principal>,
) -> (Vec<UserPrincipal>, Vec<GroupPrincipal>) {
    let mut users = Vec::new();
    let mut groups = Vec::new();
    for principal in principals {
        match principal.kind() {
            PrincipalKind::User => users.extend(UserPrincipal::try_from(principal).ok()),
            PrincipalKind::Group => groups.extend(GroupPrincipal::try_from(principal).ok()),
        }
    }
    (users, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(name: &str) -> UserPrincipal {
        UserPrincipal::new(name).unwrap()
    }

    fn group(name: &str) -> GroupPrincipal {
        GroupPrincipal::new(name).unwrap()
    }

    fn groups(names: &[&str]) -> Vec<GroupPrincipal> {
        names.iter().map(|n| group(n)).collect()
    }

    #[test]
    fn group_deny_dominates_group_permit() {
        let acl = Acl::builder()
            .permit_groups(groups(&["eng", "hr"]))
            .deny_groups(groups(&["eng", "finance", "interns"]))
            .build();
        let alice = AuthnIdentity::with_groups(user("alice"), groups(&["eng"]));

        assert_eq!(acl.is_authorized_local(&alice), AuthzStatus::Deny);
    }

    #[test]
    fn user_decisions() {
        let acl = Acl::builder()
            .permit_users([user("alice"), user("bob")])
            .deny_users([user("bob")])
            .build();

        let status = |name| acl.is_authorized_local(&AuthnIdentity::new(user(name)));
        assert_eq!(status("alice"), AuthzStatus::Permit);
        assert_eq!(status("bob"), AuthzStatus::Deny);
        assert_eq!(status("carol"), AuthzStatus::Indeterminate);
    }

    #[test]
    fn unknown_membership_never_matches_groups() {
        let acl = Acl::builder().deny_groups(groups(&["eng"])).build();

        let unknown = AuthnIdentity::new(user("alice"));
        let member = AuthnIdentity::with_groups(user("alice"), groups(&["eng"]));
        assert_eq!(acl.is_authorized_local(&unknown), AuthzStatus::Indeterminate);
        assert_eq!(acl.is_authorized_local(&member), AuthzStatus::Deny);
    }

    #[test]
    fn user_deny_beats_group_permit() {
        let acl = Acl::builder()
            .deny_users([user("alice")])
            .permit_groups(groups(&["eng"]))
            .build();
        let alice = AuthnIdentity::with_groups(user("alice"), groups(&["eng"]));
        assert_eq!(acl.is_authorized_local(&alice), AuthzStatus::Deny);
    }

    #[test]
    fn empty_acl_is_indeterminate() {
        let alice = AuthnIdentity::with_groups(user("alice"), groups(&["eng"]));
        assert_eq!(Acl::EMPTY.is_authorized_local(&alice), AuthzStatus::Indeterminate);
        assert_eq!(Acl::EMPTY.inherit_from(), None);
        assert_eq!(Acl::EMPTY.inheritance_type(), InheritanceType::LeafNode);
        assert_eq!(Acl::builder().build(), Acl::EMPTY);
    }

    #[test]
    fn case_sensitive_matching_is_exact() {
        let acl = Acl::builder().permit_users([user("Alice")]).build();
        assert_eq!(
            acl.is_authorized_local(&AuthnIdentity::new(user("alice"))),
            AuthzStatus::Indeterminate
        );
    }

    #[test]
    fn case_insensitive_matching_folds_domain_syntax() {
        let acl = Acl::builder()
            .permit_users([user("jdoe@Corp")])
            .deny_groups(groups(&["CORP\\Contractors"]))
            .everything_case_insensitive()
            .build();

        for name in ["jdoe@Corp", "CORP\\JDoe", "corp/jdoe"] {
            let id = AuthnIdentity::new(user(name));
            assert_eq!(acl.is_authorized_local(&id), AuthzStatus::Permit, "{name}");
        }

        let contractor = AuthnIdentity::with_groups(user("corp\\jdoe"), groups(&["contractors@corp"]));
        assert_eq!(acl.is_authorized_local(&contractor), AuthzStatus::Deny);

        // Stored values keep their casing.
        assert_eq!(acl.permit_users().iter().next().unwrap().name(), "jdoe@Corp");
    }

    #[test]
    fn case_insensitive_matching_respects_namespace() {
        let acl = Acl::builder()
            .permit_users([UserPrincipal::with_namespace("alice", "ns1").unwrap()])
            .everything_case_insensitive()
            .build();
        let other_ns = AuthnIdentity::new(UserPrincipal::with_namespace("ALICE", "ns2").unwrap());
        assert_eq!(acl.is_authorized_local(&other_ns), AuthzStatus::Indeterminate);
    }

    #[test]
    fn builder_changes_do_not_leak_into_built_acls() {
        let builder = Acl::builder().permit_users([user("alice")]);
        let first = builder.build();

        let builder = builder.permit_users([user("bob")]).inherit_from("parent");
        let second = builder.build();

        assert!(first.permit_users().contains(&user("alice")));
        assert!(!first.permit_users().contains(&user("bob")));
        assert_eq!(first.inherit_from(), None);
        assert!(second.permit_users().contains(&user("bob")));
        assert_eq!(second.inherit_from(), Some(&AclRef::new("parent")));
    }

    #[test]
    fn to_builder_copies() {
        let acl = Acl::builder()
            .deny_users([user("mallory")])
            .inheritance_type(InheritanceType::ParentOverrides)
            .build();
        let edited = acl.to_builder().deny_users([]).build();

        assert_eq!(acl.deny_users().len(), 1);
        assert!(edited.deny_users().is_empty());
        assert_eq!(edited.inheritance_type(), InheritanceType::ParentOverrides);
    }

    #[test]
    fn mixed_permits_split_by_kind() {
        let acl = Acl::builder()
            .permits([
                Principal::user("alice").unwrap(),
                Principal::group("eng").unwrap(),
            ])
            .denies([Principal::group("interns").unwrap()])
            .build();

        assert_eq!(acl.permit_users().len(), 1);
        assert_eq!(acl.permit_groups().len(), 1);
        assert!(acl.deny_users().is_empty());
        assert!(acl.deny_groups().contains(&group("interns")));
    }

    #[test]
    fn blank_fragment_is_rejected() {
        assert!(matches!(
            AclRef::with_fragment("doc", "  "),
            Err(AclError::InvalidArgument(_))
        ));

        let slot = AclRef::with_fragment("doc", "share").unwrap();
        assert_eq!(slot.to_string(), "doc#share");
        assert_eq!(AclRef::new("doc").to_string(), "doc");
    }

    #[test]
    fn serialization_roundtrip() {
        let acl = Acl::builder()
            .permit_users([user("alice")])
            .deny_groups(groups(&["interns"]))
            .inherit_from(AclRef::with_fragment("folder", "share").unwrap())
            .inheritance_type(InheritanceType::AndBothPermit)
            .everything_case_insensitive()
            .build();

        let json = serde_json::to_string(&acl).expect("serialize acl");
        let back: Acl = serde_json::from_str(&json).expect("deserialize acl");
        assert_eq!(back, acl);

        let empty: Acl = serde_json::from_str("{}").expect("deserialize empty acl");
        assert_eq!(empty, Acl::EMPTY);

        let bad_fragment = r#"{"inherit_from":{"doc_id":"d","fragment":""}}"#;
        assert!(serde_json::from_str::<Acl>(bad_fragment).is_err());
    }

    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    fn subset() -> impl Strategy<Value = Vec<&'static str>> {
        proptest::sample::subsequence(NAMES.to_vec(), 0..=NAMES.len())
    }

    proptest! {
        #[test]
        fn local_decision_respects_dominance(
            permit_users in subset(),
            deny_users in subset(),
            permit_groups in subset(),
            deny_groups in subset(),
            who in proptest::sample::select(NAMES.to_vec()),
            held in proptest::option::of(subset()),
        ) {
            let acl = Acl::builder()
                .permit_users(permit_users.iter().map(|n| user(n)))
                .deny_users(deny_users.iter().map(|n| user(n)))
                .permit_groups(permit_groups.iter().map(|n| group(n)))
                .deny_groups(deny_groups.iter().map(|n| group(n)))
                .build();
            let identity = match &held {
                Some(names) => AuthnIdentity::with_groups(user(who), names.iter().map(|n| group(n))),
                None => AuthnIdentity::new(user(who)),
            };
            let held = held.unwrap_or_default();

            let denied = deny_users.contains(&who) || held.iter().any(|g| deny_groups.contains(g));
            let permitted = permit_users.contains(&who) || held.iter().any(|g| permit_groups.contains(g));

            let status = acl.is_authorized_local(&identity);
            if denied {
                prop_assert_eq!(status, AuthzStatus::Deny);
            } else if permitted {
                prop_assert_eq!(status, AuthzStatus::Permit);
            } else {
                prop_assert_eq!(status, AuthzStatus::Indeterminate);
            }
        }
    }
}
