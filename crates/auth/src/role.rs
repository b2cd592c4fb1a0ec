use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// The privileged role that coarse-grained policies admit without consulting
/// the permission resolver.
pub const ADMIN_ROLE: &str = "admin";

/// Role identifier used for RBAC.
///
/// Roles are intentionally opaque strings at this layer; mapping a role to
/// its permissions is the resolver's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(Cow::Borrowed(ADMIN_ROLE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == ADMIN_ROLE
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
