//! In-memory [`EntityStore`] backend
//!
//! Keeps everything in maps behind a single `RwLock`. State lives for the
//! process lifetime only, which is all the HTTP server and the console
//! need.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::error::{RbacError, Result};
use crate::core::types::{Assignment, EntityId, Permission, Role, RoleDetail};
use crate::store::EntityStore;

#[derive(Default)]
struct Inner {
    permissions: HashMap<EntityId, Permission>,
    roles: HashMap<EntityId, Role>,
    assignments: HashMap<(EntityId, EntityId), Assignment>,
}

/// Process-local store backed by hash maps
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn norm(name: &str) -> String {
    name.to_lowercase()
}

/// Newest records first, name as the tiebreaker
fn newest_first<T>(items: &mut [T], created: impl Fn(&T) -> chrono::DateTime<chrono::Utc>, name: impl Fn(&T) -> String) {
    items.sort_by(|a, b| {
        created(b)
            .cmp(&created(a))
            .then_with(|| name(a).cmp(&name(b)))
    });
}

impl Inner {
    fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        let wanted = norm(name);
        self.permissions.values().find(|p| norm(&p.name) == wanted)
    }

    fn role_by_name(&self, name: &str) -> Option<&Role> {
        let wanted = norm(name);
        self.roles.values().find(|r| norm(&r.name) == wanted)
    }

    fn detail_for(&self, role: &Role) -> RoleDetail {
        let mut permissions: Vec<Permission> = self
            .assignments
            .keys()
            .filter(|(role_id, _)| *role_id == role.id)
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        RoleDetail {
            role: role.clone(),
            permissions,
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Permission> {
        let mut inner = self.inner.write().await;
        if inner.permission_by_name(name).is_some() {
            return Err(RbacError::Conflict(format!("Permission {:?}", name)));
        }
        let permission = Permission::new(name, description.map(String::from));
        inner.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn create_role(&self, name: &str) -> Result<Role> {
        let mut inner = self.inner.write().await;
        if inner.role_by_name(name).is_some() {
            return Err(RbacError::Conflict(format!("Role {:?}", name)));
        }
        let role = Role::new(name);
        inner.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_permission(&self, name: &str) -> Result<Option<Permission>> {
        let inner = self.inner.read().await;
        Ok(inner.permission_by_name(name).cloned())
    }

    async fn find_role(&self, name: &str) -> Result<Option<Role>> {
        let inner = self.inner.read().await;
        Ok(inner.role_by_name(name).cloned())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let inner = self.inner.read().await;
        let mut permissions: Vec<Permission> = inner.permissions.values().cloned().collect();
        newest_first(&mut permissions, |p| p.created_at, |p| p.name.clone());
        Ok(permissions)
    }

    async fn list_roles(&self) -> Result<Vec<RoleDetail>> {
        let inner = self.inner.read().await;
        let mut roles: Vec<Role> = inner.roles.values().cloned().collect();
        newest_first(&mut roles, |r| r.created_at, |r| r.name.clone());
        Ok(roles.iter().map(|r| inner.detail_for(r)).collect())
    }

    async fn role_detail(&self, name: &str) -> Result<Option<RoleDetail>> {
        let inner = self.inner.read().await;
        Ok(inner.role_by_name(name).map(|r| inner.detail_for(r)))
    }

    async fn assignment_exists(
        &self,
        role_id: EntityId,
        permission_id: EntityId,
    ) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.assignments.contains_key(&(role_id, permission_id)))
    }

    async fn create_assignment(
        &self,
        role_id: EntityId,
        permission_id: EntityId,
    ) -> Result<Assignment> {
        let mut inner = self.inner.write().await;
        if inner.assignments.contains_key(&(role_id, permission_id)) {
            return Err(RbacError::Conflict("Assignment".to_string()));
        }
        let assignment = Assignment::new(role_id, permission_id);
        inner
            .assignments
            .insert((role_id, permission_id), assignment.clone());
        Ok(assignment)
    }

    async fn delete_assignment(&self, role_id: EntityId, permission_id: EntityId) -> Result<u64> {
        let mut inner = self.inner.write().await;
        match inner.assignments.remove(&(role_id, permission_id)) {
            Some(_) => Ok(1),
            None => Ok(0),
        }
    }
}
