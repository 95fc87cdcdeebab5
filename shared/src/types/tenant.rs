//! Tenant identity types
//!
//! Every catalog row is scoped to a tenant. Until tenant onboarding is
//! wired through the admin surface, background jobs and seed scripts run
//! under the platform's well-known seed tenant, overridable with the
//! `DEFAULT_TENANT_ID` environment variable.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seed tenant installed together with the platform schema.
const SEED_TENANT_ID: &str = "1F1CA876-2C19-41C3-87AA-00890071A591";

static DEFAULT_TENANT: Lazy<TenantId> = Lazy::new(|| {
    std::env::var("DEFAULT_TENANT_ID")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| {
            TenantId(Uuid::parse_str(SEED_TENANT_ID).expect("seed tenant id is a valid UUID"))
        })
});

/// Identifier of a tenant in the platform catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Generate a fresh tenant id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The process-wide default tenant, resolved once from the environment
    pub fn default_from_env() -> Self {
        *DEFAULT_TENANT
    }

    /// Access the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TenantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let id: TenantId = SEED_TENANT_ID.parse().unwrap();
        let reparsed: TenantId = id.to_string().parse().unwrap();
        assert_eq!(id, reparsed);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let upper: TenantId = SEED_TENANT_ID.parse().unwrap();
        let lower: TenantId = SEED_TENANT_ID.to_lowercase().parse().unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!("not-a-uuid".parse::<TenantId>().is_err());
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        assert_ne!(TenantId::new(), TenantId::new());
    }
}
