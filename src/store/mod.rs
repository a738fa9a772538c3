//! Persistence boundary for roles, permissions, and assignments
//!
//! The pipeline talks to storage through [`EntityStore`] so the executor
//! and tests can swap backends freely. The bundled backend is an
//! in-memory store; anything speaking this trait (a database, a remote
//! service) can replace it without touching the command layer.

pub mod memory;
pub mod seed;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::types::{Assignment, EntityId, Permission, Role, RoleDetail};

pub use memory::MemoryStore;
pub use seed::seed_demo_data;

/// Storage operations the command executor relies on
///
/// Name lookups are case-insensitive; records keep the casing they were
/// created with. Names are unique per record kind, and at most one
/// assignment exists per `(role, permission)` pair. Both constraints are
/// the backend's to enforce, surfacing violations as
/// [`RbacError::Conflict`](crate::core::error::RbacError::Conflict).
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Create a permission, rejecting duplicate names
    async fn create_permission(&self, name: &str, description: Option<&str>)
        -> Result<Permission>;

    /// Create a role, rejecting duplicate names
    async fn create_role(&self, name: &str) -> Result<Role>;

    /// Look up a permission by name
    async fn find_permission(&self, name: &str) -> Result<Option<Permission>>;

    /// Look up a role by name
    async fn find_role(&self, name: &str) -> Result<Option<Role>>;

    /// All permissions, newest first
    async fn list_permissions(&self) -> Result<Vec<Permission>>;

    /// All roles with their assigned permissions, newest first
    async fn list_roles(&self) -> Result<Vec<RoleDetail>>;

    /// One role with its assigned permissions
    async fn role_detail(&self, name: &str) -> Result<Option<RoleDetail>>;

    /// Whether the role already holds the permission
    async fn assignment_exists(&self, role_id: EntityId, permission_id: EntityId)
        -> Result<bool>;

    /// Link a permission to a role, rejecting duplicate pairs
    async fn create_assignment(
        &self,
        role_id: EntityId,
        permission_id: EntityId,
    ) -> Result<Assignment>;

    /// Unlink a permission from a role, returning how many links were removed
    async fn delete_assignment(&self, role_id: EntityId, permission_id: EntityId) -> Result<u64>;
}
