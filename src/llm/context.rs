//! Gather store context for LLM prompts
//!
//! This module builds snapshots of the known roles and permissions that
//! help the classifier disambiguate commands. A model that can see
//! "edit_posts exists" maps "the permission to edit posts" onto it
//! instead of inventing a new name.

use crate::core::error::Result;
use crate::store::EntityStore;

/// A permission the classifier and resolver may be asked to match
#[derive(Debug, Clone)]
pub struct KnownPermission {
    /// The permission's stored name
    pub name: String,
    /// What it grants, when recorded
    pub description: Option<String>,
}

/// Store context for LLM prompts and entity resolution
///
/// Contains the names currently in the store so the classifier can
/// anchor vague references to real records.
#[derive(Debug, Clone, Default)]
pub struct EntityContext {
    /// Names of existing roles
    pub role_names: Vec<String>,
    /// Existing permissions with their descriptions
    pub permissions: Vec<KnownPermission>,
}

impl EntityContext {
    /// Build a context from the current store contents
    pub async fn from_store(store: &dyn EntityStore) -> Result<Self> {
        let role_names = store
            .list_roles()
            .await?
            .into_iter()
            .map(|detail| detail.role.name)
            .collect();
        let permissions = store
            .list_permissions()
            .await?
            .into_iter()
            .map(|p| KnownPermission {
                name: p.name,
                description: p.description,
            })
            .collect();
        Ok(Self {
            role_names,
            permissions,
        })
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        if self.role_names.is_empty() {
            s.push_str("Existing roles: (none yet)\n");
        } else {
            s.push_str(&format!("Existing roles: {}\n", self.role_names.join(", ")));
        }

        if self.permissions.is_empty() {
            s.push_str("Existing permissions: (none yet)\n");
        } else {
            s.push_str("Existing permissions:\n");
            for permission in &self.permissions {
                match &permission.description {
                    Some(description) => {
                        s.push_str(&format!("- {} ({})\n", permission.name, description));
                    }
                    None => s.push_str(&format!("- {}\n", permission.name)),
                }
            }
        }

        s
    }

    /// Create an empty context for testing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Names of existing permissions, in listing order
    pub fn permission_names(&self) -> Vec<&str> {
        self.permissions.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.role_names.is_empty() && self.permissions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed::seed_demo_data, MemoryStore};

    #[test]
    fn test_empty_context() {
        let ctx = EntityContext::empty();
        assert!(ctx.is_empty());
        assert!(ctx.summary().contains("(none yet)"));
    }

    #[test]
    fn test_summary_lists_names_and_descriptions() {
        let ctx = EntityContext {
            role_names: vec!["Admin".into(), "Content Editor".into()],
            permissions: vec![
                KnownPermission {
                    name: "users:read".into(),
                    description: Some("Read users".into()),
                },
                KnownPermission {
                    name: "edit_posts".into(),
                    description: None,
                },
            ],
        };

        let summary = ctx.summary();
        assert!(summary.contains("Admin, Content Editor"));
        assert!(summary.contains("users:read (Read users)"));
        assert!(summary.contains("- edit_posts"));
    }

    #[tokio::test]
    async fn test_context_from_store() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();

        let ctx = EntityContext::from_store(&store).await.unwrap();
        assert_eq!(ctx.role_names, vec!["Admin".to_string()]);
        assert_eq!(ctx.permissions.len(), 6);
        assert!(ctx.permission_names().contains(&"roles:write"));
    }
}
