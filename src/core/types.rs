//! Core record types shared across the pipeline and the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for stored records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named capability grantable to roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

/// A named collection of permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// The relation linking one role to one permission
///
/// The `(role_id, permission_id)` pair is unique - at most one assignment
/// per combination, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: EntityId,
    pub role_id: EntityId,
    pub permission_id: EntityId,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(role_id: EntityId, permission_id: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            role_id,
            permission_id,
            created_at: Utc::now(),
        }
    }
}

/// A role joined with the permissions assigned to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}
