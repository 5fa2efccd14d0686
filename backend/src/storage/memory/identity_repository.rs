use anyhow::Result;
use log::debug;
use std::sync::Arc;

use super::connection::MemoryConnection;
use crate::domain::models::institution::Institution;
use crate::domain::models::relationships::ChildrenGroup;
use crate::domain::models::user::{Role, User};
use crate::storage::traits::IdentityStorage;

/// In-memory identity and relationship repository.
#[derive(Clone)]
pub struct IdentityRepository {
    connection: Arc<MemoryConnection>,
}

impl IdentityRepository {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self { connection }
    }
}

impl IdentityStorage for IdentityRepository {
    fn store_user(&self, user: &User) -> Result<()> {
        debug!("Storing user: {} ({})", user.username, user.id);
        let mut users = self.connection.users.lock().unwrap();
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.connection.users.lock().unwrap();
        Ok(users.get(user_id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.connection.users.lock().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let mut users = self.connection.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| anyhow::anyhow!("user not found: {}", user_id))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn mark_user_deleted(&self, user_id: &str) -> Result<()> {
        let mut users = self.connection.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| anyhow::anyhow!("user not found: {}", user_id))?;
        user.deleted = true;
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn child_exists(&self, child_id: &str) -> Result<bool> {
        let users = self.connection.users.lock().unwrap();
        Ok(users
            .get(child_id)
            .map(|u| u.role == Role::Child && !u.deleted)
            .unwrap_or(false))
    }

    fn store_institution(&self, institution: &Institution) -> Result<()> {
        let mut institutions = self.connection.institutions.lock().unwrap();
        institutions.insert(institution.id.clone(), institution.clone());
        Ok(())
    }

    fn list_institutions(&self) -> Result<Vec<Institution>> {
        let institutions = self.connection.institutions.lock().unwrap();
        let mut all: Vec<Institution> = institutions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn store_group(&self, group: &ChildrenGroup) -> Result<()> {
        debug!("Storing children group: {} ({})", group.name, group.id);
        let mut groups = self.connection.groups.lock().unwrap();
        groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    fn get_group(&self, group_id: &str) -> Result<Option<ChildrenGroup>> {
        let groups = self.connection.groups.lock().unwrap();
        Ok(groups.get(group_id).cloned())
    }

    fn update_group(&self, group: &ChildrenGroup) -> Result<()> {
        let mut groups = self.connection.groups.lock().unwrap();
        if !groups.contains_key(&group.id) {
            anyhow::bail!("children group not found: {}", group.id);
        }
        groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    fn children_groups_owned_by(&self, owner_id: &str) -> Result<Vec<ChildrenGroup>> {
        let groups = self.connection.groups.lock().unwrap();
        Ok(groups
            .values()
            .filter(|g| g.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn family_children(&self, family_id: &str) -> Result<Vec<String>> {
        let links = self.connection.family_links.lock().unwrap();
        Ok(links.get(family_id).cloned().unwrap_or_default())
    }

    fn set_family_children(&self, family_id: &str, children: &[String]) -> Result<()> {
        let mut links = self.connection.family_links.lock().unwrap();
        links.insert(family_id.to_string(), children.to_vec());
        Ok(())
    }
}
