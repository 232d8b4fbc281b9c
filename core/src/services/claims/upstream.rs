//! Conversion of third-party token claims into a flat authority set
//!
//! Upstream issuers disagree on shape: `roles`, `authorities` and
//! `scope`/`scp` may each arrive as a JSON array or as one space/comma
//! delimited string. Both shapes are accepted. Any other JSON type under
//! those keys is ignored.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::domain::entities::token::ROLE_PREFIX;

use super::policy::ClaimsPolicy;

/// Prefix for scope-derived authorities
pub const SCOPE_PREFIX: &str = "SCOPE_";

/// Principal and authorities derived from an upstream token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPrincipal {
    /// `sub`, or `preferred_username` when `sub` is absent
    pub principal: Option<String>,
    /// `ROLE_*`, `SCOPE_*` and verbatim authorities
    pub authorities: BTreeSet<String>,
}

impl UpstreamPrincipal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl ClaimsPolicy {
    /// Build the authority set for an already-verified upstream token
    pub fn authorities_from_upstream(&self, claims: &Map<String, Value>) -> UpstreamPrincipal {
        let mut authorities = BTreeSet::new();

        for role in claim_values(claims.get("roles")) {
            if let Some(role) = Self::canonical_role(&role) {
                authorities.insert(format!("{}{}", ROLE_PREFIX, role));
            }
        }

        authorities.extend(claim_values(claims.get("authorities")));

        let scope = claims.get("scope").or_else(|| claims.get("scp"));
        for scope in claim_values(scope) {
            authorities.insert(format!("{}{}", SCOPE_PREFIX, scope));
        }

        let implied = self.expand_hierarchy(
            authorities
                .iter()
                .filter_map(|a| a.strip_prefix(ROLE_PREFIX))
                .map(str::to_string)
                .collect(),
        );
        authorities.extend(self.to_authorities(&implied));

        let principal = claim_string(claims.get("sub"))
            .or_else(|| claim_string(claims.get("preferred_username")));

        UpstreamPrincipal {
            principal,
            authorities,
        }
    }
}

fn claim_values(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn claim_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
