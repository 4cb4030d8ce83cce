//! Kani proofs for the inheritance combinators
//!
//! Inputs are enumerated from the `ALL` tables, so every proof covers the
//! full domain of rules and statuses.
//!
//! **Proof Count**: 3 proofs
//!
//! Run with: `cargo kani --harness verify_*`

#[cfg(kani)]
use crate::inheritance::InheritanceType;
#[cfg(kani)]
use crate::status::AuthzStatus;

/// Proof: combination is total and never invents a permit
///
/// **Property**: For every rule and every (child, parent) pair, a `Permit`
/// result requires at least one `Permit` input.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(5)]
fn verify_combine_permit_requires_permit_input() {
    for rule in InheritanceType::ALL {
        for child in AuthzStatus::ALL {
            for parent in AuthzStatus::ALL {
                let result = rule.combine(child, parent);

                if result == AuthzStatus::Permit {
                    assert!(child == AuthzStatus::Permit || parent == AuthzStatus::Permit);
                }
            }
        }
    }
}

/// Proof: override rules fall back to the other side on indeterminate
///
/// **Property**: `ChildOverrides(I, p) == p` and `ParentOverrides(c, I) == c`.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(5)]
fn verify_override_fallback() {
    for status in AuthzStatus::ALL {
        assert_eq!(
            InheritanceType::ChildOverrides.combine(AuthzStatus::Indeterminate, status),
            status
        );
        assert_eq!(
            InheritanceType::ParentOverrides.combine(status, AuthzStatus::Indeterminate),
            status
        );
    }
}

/// Proof: deny dominates in local merging
///
/// **Property**: `a.dominant(b)` is `Deny` iff either input is `Deny`.
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(5)]
fn verify_dominance() {
    for a in AuthzStatus::ALL {
        for b in AuthzStatus::ALL {
            let merged = a.dominant(b);
            assert_eq!(
                merged == AuthzStatus::Deny,
                a == AuthzStatus::Deny || b == AuthzStatus::Deny
            );
            assert_eq!(merged, b.dominant(a));
        }
    }
}
