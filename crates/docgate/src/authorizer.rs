//! Config-driven authorization entry point.
//!
//! Wraps chain and batch resolution with the configured principal namespace,
//! ACL case sensitivity, and decision audit logging.

use std::collections::HashMap;

use docgate_acl::{
    Acl, AclBuilder, AclRetriever, AuthnIdentity, AuthzStatus, resolve_batch, resolve_chain,
};
use docgate_config::{AuthzConfig, DocgateConfig};
use docgate_types::{DocId, GroupPrincipal, UserPrincipal};
use tracing::{debug, info, warn};

use crate::error::{DocgateError, Result};

/// Authorization engine front end.
///
/// Resolves access for documents and writes every decision to the audit log
/// unless audit is disabled.
pub struct Authorizer {
    config: AuthzConfig,

    /// Whether to log decisions.
    audit_enabled: bool,
}

impl Authorizer {
    /// Creates an authorizer; auditing follows `config.audit`.
    pub fn new(config: AuthzConfig) -> Self {
        let audit_enabled = config.audit;
        Self {
            config,
            audit_enabled,
        }
    }

    pub fn from_config(config: &DocgateConfig) -> Self {
        Self::new(config.authz.clone())
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Creates a user principal in the configured namespace.
    pub fn user(&self, name: &str) -> Result<UserPrincipal> {
        Ok(UserPrincipal::with_namespace(name, self.config.namespace.clone())?)
    }

    /// Creates a group principal in the configured namespace.
    pub fn group(&self, name: &str) -> Result<GroupPrincipal> {
        Ok(GroupPrincipal::with_namespace(name, self.config.namespace.clone())?)
    }

    /// Returns an ACL builder preset with the configured case sensitivity.
    pub fn acl_builder(&self) -> AclBuilder {
        Acl::builder().case_sensitive(self.config.case_sensitivity.is_case_sensitive())
    }

    /// Resolves `identity` against the root-to-leaf `chain` of `doc_id`.
    ///
    /// **Audit:** Logs the decision.
    pub fn authorize(
        &self,
        doc_id: &DocId,
        identity: &AuthnIdentity,
        chain: &[Acl],
    ) -> Result<AuthzStatus> {
        let status = resolve_chain(identity, chain)?;
        self.audit(doc_id, identity, status);
        Ok(status)
    }

    /// Returns `Ok(())` only if `identity` is permitted to see `doc_id`.
    ///
    /// Anything other than [`AuthzStatus::Permit`] is served as "no access".
    pub fn enforce(&self, doc_id: &DocId, identity: &AuthnIdentity, chain: &[Acl]) -> Result<()> {
        let status = self.authorize(doc_id, identity, chain)?;
        if Self::is_permitted(status) {
            Ok(())
        } else {
            Err(DocgateError::AccessDenied {
                doc_id: doc_id.clone(),
                status,
            })
        }
    }

    /// Resolves `identity` against many documents, fetching ACLs through
    /// `retriever`.
    ///
    /// **Audit:** Logs each decision and a summary.
    pub fn authorize_batch<R>(
        &self,
        identity: &AuthnIdentity,
        targets: impl IntoIterator<Item = DocId>,
        retriever: &mut R,
    ) -> Result<HashMap<DocId, AuthzStatus>>
    where
        R: AclRetriever + ?Sized,
    {
        let results = resolve_batch(identity, targets, retriever)?;

        if self.audit_enabled {
            let mut permitted = 0_usize;
            for (doc_id, status) in &results {
                self.audit(doc_id, identity, *status);
                if status.is_permit() {
                    permitted += 1;
                }
            }
            debug!(
                user = %identity.user().name(),
                documents = results.len(),
                permitted,
                "Batch authorization complete"
            );
        }

        Ok(results)
    }

    /// Framework convention: only `Permit` grants access.
    pub fn is_permitted(status: AuthzStatus) -> bool {
        status.is_permit()
    }

    fn audit(&self, doc_id: &DocId, identity: &AuthnIdentity, status: AuthzStatus) {
        if !self.audit_enabled {
            return;
        }

        if status.is_permit() {
            info!(
                doc_id = %doc_id,
                user = %identity.user().name(),
                namespace = %identity.user().namespace(),
                %status,
                "Document access granted"
            );
        } else {
            warn!(
                doc_id = %doc_id,
                user = %identity.user().name(),
                namespace = %identity.user().namespace(),
                %status,
                "Document access denied"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_acl::{AclRef, InheritanceType, RetrievalError};
    use docgate_config::CaseSensitivity;
    use std::collections::BTreeSet;

    fn authorizer() -> Authorizer {
        Authorizer::new(AuthzConfig::default()).without_audit()
    }

    #[test]
    fn principals_use_configured_namespace() {
        let config = AuthzConfig {
            namespace: "corp".to_string(),
            ..AuthzConfig::default()
        };
        let authz = Authorizer::new(config).without_audit();

        assert_eq!(authz.user("alice").unwrap().namespace(), "corp");
        assert_eq!(authz.group("eng").unwrap().namespace(), "corp");
        assert!(matches!(authz.user(" "), Err(DocgateError::Principal(_))));
    }

    #[test]
    fn acl_builder_follows_case_sensitivity() {
        assert!(authorizer().acl_builder().build().is_case_sensitive());

        let config = AuthzConfig {
            case_sensitivity: CaseSensitivity::EverythingCaseInsensitive,
            ..AuthzConfig::default()
        };
        let authz = Authorizer::new(config).without_audit();
        let acl = authz
            .acl_builder()
            .permit_users([authz.user("Alice").unwrap()])
            .build();

        assert!(!acl.is_case_sensitive());
        let alice = AuthnIdentity::new(authz.user("alice").unwrap());
        let doc = DocId::new("doc");
        assert_eq!(authz.authorize(&doc, &alice, &[acl]).unwrap(), AuthzStatus::Permit);
    }

    #[test]
    fn enforce_denies_anything_but_permit() {
        let authz = authorizer();
        let alice = AuthnIdentity::new(authz.user("alice").unwrap());
        let doc = DocId::new("doc");

        match authz.enforce(&doc, &alice, &[Acl::EMPTY]) {
            Err(DocgateError::AccessDenied { doc_id, status }) => {
                assert_eq!(doc_id, doc);
                assert_eq!(status, AuthzStatus::Indeterminate);
            }
            other => panic!("expected AccessDenied, got {other:?}"),
        }

        let open = authz
            .acl_builder()
            .permit_users([authz.user("alice").unwrap()])
            .build();
        assert!(authz.enforce(&doc, &alice, &[open]).is_ok());
    }

    #[test]
    fn malformed_chain_is_an_error() {
        let authz = authorizer();
        let alice = AuthnIdentity::new(authz.user("alice").unwrap());
        let result = authz.authorize(&DocId::new("doc"), &alice, &[]);
        assert!(matches!(result, Err(DocgateError::Acl(_))));
    }

    #[test]
    fn batch_delegates_to_resolver() {
        let authz = authorizer();
        let alice = authz.user("alice").unwrap();
        let identity = AuthnIdentity::new(alice.clone());

        let mut store: HashMap<AclRef, Acl> = HashMap::new();
        store.insert(
            AclRef::new("folder"),
            authz
                .acl_builder()
                .permit_users([alice])
                .inheritance_type(InheritanceType::ChildOverrides)
                .build(),
        );
        store.insert(
            AclRef::new("file"),
            authz.acl_builder().inherit_from("folder").build(),
        );

        let mut calls = 0;
        let mut retriever = |refs: &BTreeSet<AclRef>| -> std::result::Result<HashMap<AclRef, Option<Acl>>, RetrievalError> {
            calls += 1;
            Ok(refs
                .iter()
                .filter_map(|r| store.get(r).map(|acl| (r.clone(), Some(acl.clone()))))
                .collect())
        };

        let results = authz
            .authorize_batch(
                &identity,
                [DocId::new("file"), DocId::new("orphan")],
                &mut retriever,
            )
            .unwrap();

        assert_eq!(results[&DocId::new("file")], AuthzStatus::Permit);
        assert_eq!(results[&DocId::new("orphan")], AuthzStatus::Indeterminate);
        assert_eq!(calls, 2);
    }
}
