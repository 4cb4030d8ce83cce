//! Inheritance chain resolution.
//!
//! A chain lists ACLs from the outermost ancestor (root) to the document
//! being checked (leaf). Resolution starts from the leaf's local decision
//! and folds each ancestor in, walking toward the root, using the
//! ancestor's own [`InheritanceType`].

use tracing::warn;

use crate::acl::Acl;
use crate::error::{AclError, Result};
use crate::identity::AuthnIdentity;
use crate::inheritance::InheritanceType;
use crate::status::AuthzStatus;

/// Resolves `identity` against a root-to-leaf inheritance chain.
///
/// # Errors
///
/// Returns [`AclError::InvalidChain`] if the chain is empty, if the root
/// declares a parent, or if any later element does not.
///
/// # Examples
///
/// ```
/// use docgate_acl::{Acl, AuthnIdentity, AuthzStatus, InheritanceType, resolve_chain};
/// use docgate_types::UserPrincipal;
///
/// let alice = UserPrincipal::new("alice")?;
/// let folder = Acl::builder()
///     .permit_users([alice.clone()])
///     .inheritance_type(InheritanceType::ChildOverrides)
///     .build();
/// let file = Acl::builder().inherit_from("folder").build();
///
/// let status = resolve_chain(&AuthnIdentity::new(alice), &[folder, file])?;
/// assert_eq!(status, AuthzStatus::Permit);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve_chain(identity: &AuthnIdentity, chain: &[Acl]) -> Result<AuthzStatus> {
    validate_chain(chain)?;
    let links: Vec<&Acl> = chain.iter().collect();
    Ok(fold_chain(identity, &links))
}

/// Checks the root/non-root inheritance pointers of a chain.
pub fn validate_chain(chain: &[Acl]) -> Result<()> {
    let Some((root, rest)) = chain.split_first() else {
        return Err(AclError::InvalidChain {
            reason: "chain must contain at least one ACL".to_string(),
        });
    };

    if let Some(parent) = root.inherit_from() {
        return Err(AclError::InvalidChain {
            reason: format!("root ACL must not inherit, but inherits from {parent}"),
        });
    }

    if let Some(position) = rest.iter().position(|acl| acl.inherit_from().is_none()) {
        return Err(AclError::InvalidChain {
            reason: format!(
                "ACL at position {} has no parent but is not the root",
                position + 1
            ),
        });
    }

    Ok(())
}

/// Folds an already-validated (or deliberately truncated) chain.
///
/// An ancestor marked `LeafNode` means the chain was assembled wrongly; the
/// whole chain then resolves to `Indeterminate`.
pub(crate) fn fold_chain(identity: &AuthnIdentity, chain: &[&Acl]) -> AuthzStatus {
    let Some((leaf, ancestors)) = chain.split_last() else {
        return AuthzStatus::Indeterminate;
    };

    let mut status = leaf.is_authorized_local(identity);
    for (position, ancestor) in ancestors.iter().enumerate().rev() {
        let rule = ancestor.inheritance_type();
        if rule == InheritanceType::LeafNode {
            warn!(
                position,
                chain_len = chain.len(),
                "leaf-node ACL found above the leaf of an inheritance chain; resolving as indeterminate"
            );
            return AuthzStatus::Indeterminate;
        }
        status = rule.combine(status, ancestor.is_authorized_local(identity));
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_types::{GroupPrincipal, UserPrincipal};

    fn user(name: &str) -> UserPrincipal {
        UserPrincipal::new(name).unwrap()
    }

    fn identity(name: &str) -> AuthnIdentity {
        AuthnIdentity::new(user(name))
    }

    fn website_chain() -> Vec<Acl> {
        let website = Acl::builder()
            .permit_users([user("user")])
            .inheritance_type(InheritanceType::ChildOverrides)
            .build();
        let subsite = Acl::builder()
            .permit_users([user("user")])
            .inheritance_type(InheritanceType::ChildOverrides)
            .inherit_from("website")
            .build();
        let file = Acl::builder()
            .deny_users([user("user")])
            .inherit_from("subsite")
            .build();
        vec![website, subsite, file]
    }

    #[test]
    fn child_override_keeps_leaf_deny() {
        // file: DENY; subsite folds DENY (child) with PERMIT (parent) under
        // child-overrides -> DENY; website repeats the same step -> DENY.
        let status = resolve_chain(&identity("user"), &website_chain()).unwrap();
        assert_eq!(status, AuthzStatus::Deny);
    }

    #[test]
    fn indeterminate_leaf_inherits_from_parent() {
        let mut chain = website_chain();
        chain[2] = Acl::builder().inherit_from("subsite").build();

        assert_eq!(
            resolve_chain(&identity("user"), &chain).unwrap(),
            AuthzStatus::Permit
        );
        assert_eq!(
            resolve_chain(&identity("stranger"), &chain).unwrap(),
            AuthzStatus::Indeterminate
        );
    }

    #[test]
    fn parent_override_beats_child() {
        let root = Acl::builder()
            .deny_groups([GroupPrincipal::new("interns").unwrap()])
            .inheritance_type(InheritanceType::ParentOverrides)
            .build();
        let leaf = Acl::builder()
            .permit_users([user("ian")])
            .inherit_from("root")
            .build();

        let intern = AuthnIdentity::with_groups(user("ian"), [GroupPrincipal::new("interns").unwrap()]);
        let unknown_groups = identity("ian");

        let chain = [root, leaf];
        assert_eq!(resolve_chain(&intern, &chain).unwrap(), AuthzStatus::Deny);
        assert_eq!(
            resolve_chain(&unknown_groups, &chain).unwrap(),
            AuthzStatus::Permit
        );
    }

    #[test]
    fn and_both_permit_requires_both() {
        let root = Acl::builder()
            .permit_users([user("alice")])
            .inheritance_type(InheritanceType::AndBothPermit)
            .build();
        let permitted_leaf = Acl::builder()
            .permit_users([user("alice")])
            .inherit_from("root")
            .build();
        let silent_leaf = Acl::builder().inherit_from("root").build();

        let alice = identity("alice");
        assert_eq!(
            resolve_chain(&alice, &[root.clone(), permitted_leaf]).unwrap(),
            AuthzStatus::Permit
        );
        assert_eq!(
            resolve_chain(&alice, &[root, silent_leaf]).unwrap(),
            AuthzStatus::Deny
        );
    }

    #[test]
    fn empty_acl_alone_is_indeterminate() {
        assert_eq!(
            resolve_chain(&identity("anyone"), &[Acl::EMPTY]).unwrap(),
            AuthzStatus::Indeterminate
        );
    }

    #[test]
    fn empty_chain_is_rejected() {
        let result = resolve_chain(&identity("user"), &[]);
        assert!(matches!(result, Err(AclError::InvalidChain { .. })));
    }

    #[test]
    fn root_with_parent_is_rejected() {
        let chain = [Acl::builder().inherit_from("elsewhere").build()];
        match resolve_chain(&identity("user"), &chain) {
            Err(AclError::InvalidChain { reason }) => assert!(reason.contains("elsewhere")),
            other => panic!("expected InvalidChain, got {other:?}"),
        }
    }

    #[test]
    fn reordered_chain_is_rejected() {
        let mut chain = website_chain();
        chain.swap(0, 2);
        assert!(matches!(
            resolve_chain(&identity("user"), &chain),
            Err(AclError::InvalidChain { .. })
        ));
    }

    #[test]
    fn non_root_without_parent_is_rejected() {
        let mut chain = website_chain();
        chain[1] = chain[1].to_builder().no_inheritance().build();
        match resolve_chain(&identity("user"), &chain) {
            Err(AclError::InvalidChain { reason }) => assert!(reason.contains("position 1")),
            other => panic!("expected InvalidChain, got {other:?}"),
        }
    }

    #[test]
    fn non_terminal_leaf_node_is_indeterminate() {
        let root = Acl::builder().permit_users([user("user")]).build();
        let leaf = Acl::builder()
            .permit_users([user("user")])
            .inherit_from("root")
            .build();

        assert_eq!(root.inheritance_type(), InheritanceType::LeafNode);
        assert_eq!(
            resolve_chain(&identity("user"), &[root, leaf]).unwrap(),
            AuthzStatus::Indeterminate
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let chain = website_chain();
        let id = identity("user");
        let first = resolve_chain(&id, &chain).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve_chain(&id, &chain).unwrap(), first);
        }
    }
}
