//! Role normalization and hierarchy expansion for issued tokens

use crate::domain::entities::token::ROLE_PREFIX;

/// Fixed role hierarchy: each role implies the roles listed after it
const HIERARCHY: &[(&str, &[&str])] = &[("ADMIN", &["MANAGER", "USER"]), ("MANAGER", &["USER"])];

/// Normalizes role claims at issue time
///
/// Expansion happens once, when a token is signed, so a token's claims are
/// self-contained and verification never consults the hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsPolicy;

impl ClaimsPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Canonical form of one role: trimmed, uppercased, `ROLE_` stripped.
    /// Blank input yields `None`.
    pub fn canonical_role(raw: &str) -> Option<String> {
        let upper = raw.trim().to_uppercase();
        let name = upper.strip_prefix(ROLE_PREFIX).unwrap_or(&upper).trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Canonicalize and deduplicate, keeping first-seen order
    pub fn normalize_roles<I, S>(&self, roles: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for role in roles {
            if let Some(role) = Self::canonical_role(role.as_ref()) {
                if !out.contains(&role) {
                    out.push(role);
                }
            }
        }
        out
    }

    /// Append every role implied by the hierarchy. Input order is kept and
    /// implied roles follow in hierarchy order.
    pub fn expand_hierarchy(&self, roles: Vec<String>) -> Vec<String> {
        let mut out = roles;
        for (role, implied) in HIERARCHY {
            if out.iter().any(|r| r == role) {
                for implied_role in implied.iter() {
                    if !out.iter().any(|r| r == implied_role) {
                        out.push((*implied_role).to_string());
                    }
                }
            }
        }
        out
    }

    /// Normalize then expand: the role set written into a token
    pub fn roles_for_issue<I, S>(&self, roles: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expand_hierarchy(self.normalize_roles(roles))
    }

    /// `ROLE_`-prefixed mirror of canonical roles
    pub fn to_authorities(&self, roles: &[String]) -> Vec<String> {
        roles
            .iter()
            .map(|r| format!("{}{}", ROLE_PREFIX, r))
            .collect()
    }
}
