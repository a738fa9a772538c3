//! Demo dataset for fresh stores

use tracing::info;

use crate::core::error::Result;
use crate::store::EntityStore;

const DEMO_PERMISSIONS: &[(&str, &str)] = &[
    ("users:read", "Read users"),
    ("users:write", "Create/update users"),
    ("users:delete", "Delete users"),
    ("roles:read", "Read roles"),
    ("roles:write", "Create/update roles"),
    ("roles:delete", "Delete roles"),
];

/// Populate an empty store with an Admin role holding every demo permission
///
/// Does nothing when the store already has any role or permission, so it
/// is safe to call on every startup.
pub async fn seed_demo_data(store: &dyn EntityStore) -> Result<()> {
    if !store.list_roles().await?.is_empty() || !store.list_permissions().await?.is_empty() {
        return Ok(());
    }

    let admin = store.create_role("Admin").await?;
    for (name, description) in DEMO_PERMISSIONS {
        let permission = store.create_permission(name, Some(description)).await?;
        store.create_assignment(admin.id, permission.id).await?;
    }
    info!(
        permissions = DEMO_PERMISSIONS.len(),
        "seeded demo role and permissions"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_builds_admin_with_all_permissions() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();

        let detail = store.role_detail("Admin").await.unwrap().unwrap();
        assert_eq!(detail.permissions.len(), 6);
        assert!(detail.permissions.iter().any(|p| p.name == "users:delete"));
    }

    #[tokio::test]
    async fn test_seed_skips_populated_store() {
        let store = MemoryStore::new();
        store.create_role("Viewer").await.unwrap();

        seed_demo_data(&store).await.unwrap();
        assert!(store.role_detail("Admin").await.unwrap().is_none());
        assert_eq!(store.list_roles().await.unwrap().len(), 1);
    }
}
