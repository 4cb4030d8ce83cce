//! Batch resolution of many documents against lazily retrieved ACLs.
//!
//! ```text
//! targets ──► walk each chain through the cache
//!                │ stops at uncached refs
//!                ▼
//!           frontier (all uncached refs this round)
//!                │ one retriever call per round
//!                ▼
//!           cache (present / absent) ──► next round, until frontier is empty
//!                │
//!                ▼
//!           fold each target's chain ──► HashMap<DocId, AuthzStatus>
//! ```
//!
//! The cache lives for one call only. A reference is requested at most once
//! per call: entries the retriever omits are recorded as absent and never
//! asked for again, and extra entries it volunteers are kept for later
//! rounds.

use std::collections::{BTreeSet, HashMap, HashSet};

use docgate_types::DocId;
use tracing::{debug, warn};

use crate::acl::{Acl, AclRef};
use crate::chain::fold_chain;
use crate::error::{AclError, Result, RetrievalError};
use crate::identity::AuthnIdentity;
use crate::status::AuthzStatus;

/// Source of ACLs for the batch resolver.
///
/// Implementations receive the full set of references needed for one round
/// and return whatever they can supply. Omitting a reference means "no ACL
/// is known for it". Mapping a reference to `None` is a contract violation
/// and fails the whole batch with [`AclError::NullAcl`]. Extra entries are
/// allowed and cached.
pub trait AclRetriever {
    fn retrieve(
        &mut self,
        refs: &BTreeSet<AclRef>,
    ) -> std::result::Result<HashMap<AclRef, Option<Acl>>, RetrievalError>;
}

impl<F> AclRetriever for F
where
    F: FnMut(&BTreeSet<AclRef>) -> std::result::Result<HashMap<AclRef, Option<Acl>>, RetrievalError>,
{
    fn retrieve(
        &mut self,
        refs: &BTreeSet<AclRef>,
    ) -> std::result::Result<HashMap<AclRef, Option<Acl>>, RetrievalError> {
        self(refs)
    }
}

/// Outcome of looking a reference up during one call.
enum Cached {
    Present(Acl),
    Absent,
}

/// Why a target's walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkEnd {
    /// Reached an ACL without a parent.
    Complete,
    /// The target's own ACL is unknown.
    MissingTarget,
    /// An ancestor is unknown; the chain stops below it.
    MissingAncestor,
    /// The chain loops back onto itself.
    Cycle,
}

/// Progress of one target up its inheritance chain.
struct TargetWalk {
    target: DocId,
    /// Next reference to look up, or `None` once the walk has ended.
    tip: Option<AclRef>,
    /// References resolved so far, leaf first.
    path: Vec<AclRef>,
    seen: HashSet<AclRef>,
    end: Option<WalkEnd>,
}

impl TargetWalk {
    fn new(target: DocId) -> Self {
        Self {
            tip: Some(AclRef::new(target.clone())),
            target,
            path: Vec::new(),
            seen: HashSet::new(),
            end: None,
        }
    }

    /// Follows parent pointers as far as the cache allows.
    ///
    /// Returns the reference that must be fetched before the walk can
    /// continue, or `None` once the walk has ended.
    fn advance(&mut self, cache: &HashMap<AclRef, Cached>) -> Option<AclRef> {
        while let Some(tip) = self.tip.take() {
            if self.seen.contains(&tip) {
                self.end = Some(WalkEnd::Cycle);
                return None;
            }

            match cache.get(&tip) {
                None => {
                    self.tip = Some(tip.clone());
                    return Some(tip);
                }
                Some(Cached::Absent) => {
                    self.end = Some(if self.path.is_empty() {
                        WalkEnd::MissingTarget
                    } else {
                        WalkEnd::MissingAncestor
                    });
                    return None;
                }
                Some(Cached::Present(acl)) => {
                    self.tip = acl.inherit_from().cloned();
                    self.seen.insert(tip.clone());
                    self.path.push(tip);
                }
            }
        }

        self.end = Some(WalkEnd::Complete);
        None
    }

    fn resolve(&self, identity: &AuthnIdentity, cache: &HashMap<AclRef, Cached>) -> AuthzStatus {
        match self.end {
            Some(WalkEnd::Complete | WalkEnd::MissingAncestor) => {
                let chain: Vec<&Acl> = self
                    .path
                    .iter()
                    .rev()
                    .filter_map(|r| match cache.get(r) {
                        Some(Cached::Present(acl)) => Some(acl),
                        Some(Cached::Absent) | None => None,
                    })
                    .collect();
                fold_chain(identity, &chain)
            }
            Some(WalkEnd::Cycle) => {
                debug!(target_doc = %self.target, "inheritance cycle detected");
                AuthzStatus::Indeterminate
            }
            Some(WalkEnd::MissingTarget) | None => AuthzStatus::Indeterminate,
        }
    }
}

/// Resolves `identity` against every document in `targets`.
///
/// Each round collects every reference some target still needs, calls the
/// retriever once with all of them, and caches the answer. Rounds repeat
/// until no target needs anything new.
///
/// - A target without an ACL resolves to `Indeterminate`.
/// - A target whose ancestor is unknown resolves over the part of the chain
///   that is known, as if the last known ancestor were the root.
/// - A target whose chain loops resolves to `Indeterminate`.
///
/// The result has exactly one entry per distinct target.
///
/// # Errors
///
/// - [`AclError::NullAcl`] if the retriever maps a reference to `None`.
/// - [`AclError::Retrieval`] if the retriever fails.
pub fn resolve_batch<R>(
    identity: &AuthnIdentity,
    targets: impl IntoIterator<Item = DocId>,
    retriever: &mut R,
) -> Result<HashMap<DocId, AuthzStatus>>
where
    R: AclRetriever + ?Sized,
{
    let mut unique = HashSet::new();
    let mut walks: Vec<TargetWalk> = targets
        .into_iter()
        .filter(|t| unique.insert(t.clone()))
        .map(TargetWalk::new)
        .collect();

    let mut cache: HashMap<AclRef, Cached> = HashMap::new();
    let mut round = 0_u32;

    loop {
        let frontier: BTreeSet<AclRef> = walks
            .iter_mut()
            .filter(|walk| walk.end.is_none())
            .filter_map(|walk| walk.advance(&cache))
            .collect();

        if frontier.is_empty() {
            break;
        }

        round += 1;
        let fetched = retriever.retrieve(&frontier).map_err(AclError::Retrieval)?;
        debug!(
            round,
            requested = frontier.len(),
            returned = fetched.len(),
            "retrieved ACL batch"
        );

        for (acl_ref, acl) in fetched {
            let Some(acl) = acl else {
                warn!(acl_ref = %acl_ref, "retriever returned a null ACL");
                return Err(AclError::NullAcl { acl_ref });
            };
            cache.entry(acl_ref).or_insert(Cached::Present(acl));
        }

        for acl_ref in frontier {
            cache.entry(acl_ref).or_insert(Cached::Absent);
        }
    }

    Ok(walks
        .iter()
        .map(|walk| (walk.target.clone(), walk.resolve(identity, &cache)))
        .collect())
}
