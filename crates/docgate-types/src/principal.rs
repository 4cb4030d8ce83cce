//! Users, groups, and their domain-qualified name forms.
//!
//! A [`Principal`] is an immutable identity reference: a kind (user or group),
//! a trimmed non-empty name, and a namespace. Names may carry a domain in one
//! of three syntaxes, which [`Principal::parse`] splits into a
//! [`ParsedPrincipal`]:
//!
//! | Format                | Example        |
//! |-----------------------|----------------|
//! | `Dns`                 | `user@domain`  |
//! | `Netbios`             | `DOMAIN\user`  |
//! | `NetbiosForwardslash` | `DOMAIN/user`  |
//!
//! Parsing is lossless: for every constructible principal `p`,
//! `p.parse().to_principal() == Ok(p)`.

use std::fmt::{self, Display};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace assigned to principals constructed without an explicit one.
pub const DEFAULT_NAMESPACE: &str = "Default";

/// Error type for principal construction and reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// The principal name was empty after trimming whitespace.
    #[error("principal name cannot be empty")]
    EmptyName,

    /// A parsed form cannot be serialized back into an unambiguous name.
    #[error("invalid principal state: {0}")]
    InvalidState(String),

    /// A typed principal wrapper was given a principal of the other kind.
    #[error("expected a {expected} principal, found a {found} principal: {name}")]
    KindMismatch {
        expected: PrincipalKind,
        found: PrincipalKind,
        name: String,
    },
}

/// Whether a principal names a single user or a group of users.
///
/// Users order before groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Group,
}

impl Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::User => f.write_str("user"),
            PrincipalKind::Group => f.write_str("group"),
        }
    }
}

// ============================================================================
// Principal
// ============================================================================

/// An identity reference: a user or a group within a namespace.
///
/// Equality, hashing and ordering are structural and case-sensitive over
/// `(kind, name, namespace)`, in that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPrincipal", into = "RawPrincipal")]
pub struct Principal {
    // Field order drives the derived `Ord`.
    kind: PrincipalKind,
    name: String,
    namespace: String,
}

impl Principal {
    /// Creates a principal, trimming surrounding whitespace from `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::EmptyName`] if the trimmed name is empty.
    pub fn new(
        kind: PrincipalKind,
        name: impl AsRef<str>,
        namespace: impl Into<String>,
    ) -> Result<Self, PrincipalError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(PrincipalError::EmptyName);
        }

        Ok(Self {
            kind,
            name: name.to_string(),
            namespace: namespace.into(),
        })
    }

    /// Creates a user principal in the default namespace.
    pub fn user(name: impl AsRef<str>) -> Result<Self, PrincipalError> {
        Self::new(PrincipalKind::User, name, DEFAULT_NAMESPACE)
    }

    /// Creates a group principal in the default namespace.
    pub fn group(name: impl AsRef<str>) -> Result<Self, PrincipalError> {
        Self::new(PrincipalKind::Group, name, DEFAULT_NAMESPACE)
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_user(&self) -> bool {
        self.kind == PrincipalKind::User
    }

    pub fn is_group(&self) -> bool {
        self.kind == PrincipalKind::Group
    }

    /// Splits the name into its plain name and domain parts.
    ///
    /// A backslash takes precedence (split at the first one), then a forward
    /// slash (split at the first one), then `@` (split at the last one).
    /// Names without any separator have no domain.
    pub fn parse(&self) -> ParsedPrincipal {
        let name = self.name.as_str();
        let (plain_name, domain, domain_format) = if let Some((domain, plain)) = name.split_once('\\')
        {
            (plain, domain, DomainFormat::Netbios)
        } else if let Some((domain, plain)) = name.split_once('/') {
            (plain, domain, DomainFormat::NetbiosForwardslash)
        } else if let Some((plain, domain)) = name.rsplit_once('@') {
            (plain, domain, DomainFormat::Dns)
        } else {
            (name, "", DomainFormat::None)
        };

        ParsedPrincipal {
            is_group: self.is_group(),
            plain_name: plain_name.to_string(),
            domain: domain.to_string(),
            domain_format,
            namespace: self.namespace.clone(),
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.namespace)
    }
}

/// Unvalidated wire form of a [`Principal`].
#[derive(Serialize, Deserialize)]
struct RawPrincipal {
    kind: PrincipalKind,
    name: String,
    #[serde(default = "default_namespace")]
    namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl TryFrom<RawPrincipal> for Principal {
    type Error = PrincipalError;

    fn try_from(raw: RawPrincipal) -> Result<Self, Self::Error> {
        Principal::new(raw.kind, raw.name, raw.namespace)
    }
}

impl From<Principal> for RawPrincipal {
    fn from(p: Principal) -> Self {
        Self {
            kind: p.kind,
            name: p.name,
            namespace: p.namespace,
        }
    }
}

// ============================================================================
// Typed wrappers
// ============================================================================

macro_rules! typed_principal {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Principal", into = "Principal")]
        pub struct $name(Principal);

        impl $name {
            /// Creates a principal of this kind in the default namespace.
            pub fn new(name: impl AsRef<str>) -> Result<Self, PrincipalError> {
                Principal::new($kind, name, DEFAULT_NAMESPACE).map(Self)
            }

            /// Creates a principal of this kind in `namespace`.
            pub fn with_namespace(
                name: impl AsRef<str>,
                namespace: impl Into<String>,
            ) -> Result<Self, PrincipalError> {
                Principal::new($kind, name, namespace).map(Self)
            }

            pub fn as_principal(&self) -> &Principal {
                &self.0
            }

            pub fn into_principal(self) -> Principal {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Principal;

            fn deref(&self) -> &Principal {
                &self.0
            }
        }

        impl From<$name> for Principal {
            fn from(p: $name) -> Self {
                p.0
            }
        }

        impl TryFrom<Principal> for $name {
            type Error = PrincipalError;

            fn try_from(p: Principal) -> Result<Self, Self::Error> {
                if p.kind == $kind {
                    Ok(Self(p))
                } else {
                    Err(PrincipalError::KindMismatch {
                        expected: $kind,
                        found: p.kind,
                        name: p.name,
                    })
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

typed_principal!(
    /// A principal statically known to be a user.
    UserPrincipal,
    PrincipalKind::User
);

typed_principal!(
    /// A principal statically known to be a group.
    GroupPrincipal,
    PrincipalKind::Group
);

// ============================================================================
// Parsed form
// ============================================================================

/// Syntax used to qualify a principal name with a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainFormat {
    /// No domain: `user`.
    None,
    /// `user@domain`
    Dns,
    /// `DOMAIN\user`
    Netbios,
    /// `DOMAIN/user`
    NetbiosForwardslash,
}

/// A principal split into plain name, domain, and domain syntax.
///
/// Fields are public so callers can rewrite a part and rebuild the principal
/// with [`ParsedPrincipal::to_principal`], which rejects combinations that
/// would not parse back to the same parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedPrincipal {
    pub is_group: bool,
    pub plain_name: String,
    pub domain: String,
    pub domain_format: DomainFormat,
    pub namespace: String,
}

impl ParsedPrincipal {
    pub fn with_plain_name(mut self, plain_name: impl Into<String>) -> Self {
        self.plain_name = plain_name.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>, format: DomainFormat) -> Self {
        self.domain = domain.into();
        self.domain_format = format;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Serializes the parts back into a qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::InvalidState`] if the parts contain
    /// separators that would make the name parse differently.
    pub fn format(&self) -> Result<String, PrincipalError> {
        self.validate()?;
        let plain = &self.plain_name;
        let domain = &self.domain;
        Ok(match self.domain_format {
            DomainFormat::None => plain.clone(),
            DomainFormat::Dns => format!("{plain}@{domain}"),
            DomainFormat::Netbios => format!("{domain}\\{plain}"),
            DomainFormat::NetbiosForwardslash => format!("{domain}/{plain}"),
        })
    }

    /// Rebuilds the principal these parts describe.
    pub fn to_principal(&self) -> Result<Principal, PrincipalError> {
        let kind = if self.is_group {
            PrincipalKind::Group
        } else {
            PrincipalKind::User
        };
        Principal::new(kind, self.format()?, self.namespace.clone())
    }

    /// Returns the case-folded, syntax-neutral form used for
    /// case-insensitive matching.
    ///
    /// Plain name and domain are lower-cased and every domain-qualified form
    /// is folded to `Netbios`, so `user@Corp`, `CORP\user` and `corp/User`
    /// share one common form. The namespace is kept verbatim.
    pub fn common_form(&self) -> ParsedPrincipal {
        let domain_format = match self.domain_format {
            DomainFormat::None => DomainFormat::None,
            DomainFormat::Dns | DomainFormat::Netbios | DomainFormat::NetbiosForwardslash => {
                DomainFormat::Netbios
            }
        };

        ParsedPrincipal {
            is_group: self.is_group,
            plain_name: self.plain_name.to_lowercase(),
            domain: self.domain.to_lowercase(),
            domain_format,
            namespace: self.namespace.clone(),
        }
    }

    fn validate(&self) -> Result<(), PrincipalError> {
        fn has(s: &str, chars: &[char]) -> bool {
            s.contains(chars)
        }

        let plain = self.plain_name.as_str();
        let domain = self.domain.as_str();

        let problem = match self.domain_format {
            DomainFormat::None if !domain.is_empty() => {
                Some(format!("domain {domain:?} given without a domain format"))
            }
            DomainFormat::None if has(plain, &['\\', '/', '@']) => {
                Some(format!("plain name {plain:?} contains a domain separator"))
            }
            DomainFormat::Netbios if has(domain, &['\\']) => {
                Some(format!("NETBIOS domain {domain:?} contains a backslash"))
            }
            DomainFormat::NetbiosForwardslash if has(domain, &['\\', '/']) => Some(format!(
                "NETBIOS_FORWARDSLASH domain {domain:?} contains a slash"
            )),
            DomainFormat::NetbiosForwardslash if has(plain, &['\\']) => Some(format!(
                "NETBIOS_FORWARDSLASH plain name {plain:?} contains a backslash"
            )),
            DomainFormat::Dns if has(domain, &['\\', '/', '@']) => {
                Some(format!("DNS domain {domain:?} contains a separator"))
            }
            DomainFormat::Dns if has(plain, &['\\', '/']) => {
                Some(format!("DNS plain name {plain:?} contains a slash"))
            }
            _ => None,
        };

        match problem {
            Some(msg) => Err(PrincipalError::InvalidState(msg)),
            None => Ok(()),
        }
    }
}
