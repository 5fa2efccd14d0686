//! Management of the relationship graph the authorization engine reads:
//! children groups and family-child links.

use log::info;
use std::sync::Arc;

use crate::domain::commands::relationships::{
    CreateGroupCommand, GroupMemberCommand, SetFamilyChildrenCommand,
};
use crate::domain::errors::DomainError;
use crate::domain::models::relationships::ChildrenGroup;
use crate::domain::models::user::{Role, User};
use crate::storage::traits::IdentityStorage;

/// Service maintaining children groups and family-child links.
#[derive(Clone)]
pub struct RelationshipService {
    identity: Arc<dyn IdentityStorage>,
}

impl RelationshipService {
    pub fn new(identity: Arc<dyn IdentityStorage>) -> Self {
        Self { identity }
    }

    /// Create a group owned by the acting Educator or HealthProfessional.
    /// A group always has exactly one owner.
    pub fn create_group(
        &self,
        actor: &User,
        command: CreateGroupCommand,
    ) -> Result<ChildrenGroup, DomainError> {
        info!("Creating children group '{}' for owner {}", command.name, actor.id);

        if !matches!(actor.role, Role::Educator | Role::HealthProfessional) {
            return Err(DomainError::Forbidden);
        }
        if command.name.trim().is_empty() {
            return Err(DomainError::InvalidInput {
                message: "group name must not be blank".to_string(),
            });
        }
        for child_id in &command.children {
            self.require_child(child_id)?;
        }

        let group = ChildrenGroup {
            id: ChildrenGroup::generate_id(),
            name: command.name.trim().to_string(),
            owner_id: actor.id.clone(),
            children: command.children,
        };
        self.identity.store_group(&group)?;

        info!("Created children group {} ({})", group.name, group.id);
        Ok(group)
    }

    /// Add a child to a group. Membership changes only through the owner.
    pub fn add_group_member(
        &self,
        actor: &User,
        command: GroupMemberCommand,
    ) -> Result<ChildrenGroup, DomainError> {
        let mut group = self.owned_group(actor, &command.group_id)?;
        self.require_child(&command.child_id)?;

        if !group.contains_child(&command.child_id) {
            group.children.push(command.child_id.clone());
            self.identity.update_group(&group)?;
            info!("Added child {} to group {}", command.child_id, group.id);
        }
        Ok(group)
    }

    /// Remove a child from a group. Membership changes only through the
    /// owner.
    pub fn remove_group_member(
        &self,
        actor: &User,
        command: GroupMemberCommand,
    ) -> Result<ChildrenGroup, DomainError> {
        let mut group = self.owned_group(actor, &command.group_id)?;

        group.children.retain(|c| c != &command.child_id);
        self.identity.update_group(&group)?;
        info!("Removed child {} from group {}", command.child_id, group.id);
        Ok(group)
    }

    /// Replace the acting Family user's child list. Children must exist at
    /// link time; existence is not re-validated on later reads.
    pub fn set_family_children(
        &self,
        actor: &User,
        command: SetFamilyChildrenCommand,
    ) -> Result<(), DomainError> {
        if actor.role != Role::Family {
            return Err(DomainError::Forbidden);
        }
        for child_id in &command.children {
            self.require_child(child_id)?;
        }
        self.identity.set_family_children(&actor.id, &command.children)?;
        info!("Family {} now linked to {} children", actor.id, command.children.len());
        Ok(())
    }

    /// The acting Family user's current child list.
    pub fn family_children(&self, actor: &User) -> Result<Vec<String>, DomainError> {
        if actor.role != Role::Family {
            return Err(DomainError::Forbidden);
        }
        Ok(self.identity.family_children(&actor.id)?)
    }

    fn owned_group(&self, actor: &User, group_id: &str) -> Result<ChildrenGroup, DomainError> {
        let group = self
            .identity
            .get_group(group_id)?
            .ok_or_else(|| DomainError::GroupNotFound { group_id: group_id.to_string() })?;
        if group.owner_id != actor.id {
            return Err(DomainError::Forbidden);
        }
        Ok(group)
    }

    fn require_child(&self, child_id: &str) -> Result<(), DomainError> {
        if !self.identity.child_exists(child_id)? {
            return Err(DomainError::ChildNotFound { child_id: child_id.to_string() });
        }
        Ok(())
    }
}
