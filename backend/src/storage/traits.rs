//! # Storage Traits
//!
//! Storage abstraction traits that let different backends be used
//! interchangeably by the domain layer. The domain consumes these traits
//! only; tests substitute in-memory doubles.

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::models::activity_log::{ActivityLog, ResourceType};
use crate::domain::models::institution::Institution;
use crate::domain::models::relationships::ChildrenGroup;
use crate::domain::models::user::User;

/// Identity and relationship store: users, institutions, children groups and
/// family-child links.
pub trait IdentityStorage: Send + Sync {
    /// Store a new user.
    fn store_user(&self, user: &User) -> Result<()>;

    /// Retrieve a user by ID (soft-deleted users included).
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Retrieve a user by username.
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Replace a user's credential hash.
    fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()>;

    /// Soft-delete a user. Stored activity logs are not cascaded.
    fn mark_user_deleted(&self, user_id: &str) -> Result<()>;

    /// Whether a non-deleted child with this ID exists.
    fn child_exists(&self, child_id: &str) -> Result<bool>;

    /// Store a new institution.
    fn store_institution(&self, institution: &Institution) -> Result<()>;

    /// List all institutions ordered by name.
    fn list_institutions(&self) -> Result<Vec<Institution>>;

    /// Store a new children group.
    fn store_group(&self, group: &ChildrenGroup) -> Result<()>;

    /// Retrieve a children group by ID.
    fn get_group(&self, group_id: &str) -> Result<Option<ChildrenGroup>>;

    /// Replace a group's stored state (name, membership).
    fn update_group(&self, group: &ChildrenGroup) -> Result<()>;

    /// All children groups owned by the given Educator or HealthProfessional.
    fn children_groups_owned_by(&self, owner_id: &str) -> Result<Vec<ChildrenGroup>>;

    /// The ordered child list a Family user may act on behalf of.
    fn family_children(&self, family_id: &str) -> Result<Vec<String>>;

    /// Replace a Family user's child list.
    fn set_family_children(&self, family_id: &str, children: &[String]) -> Result<()>;
}

/// Activity log store.
pub trait LogStorage: Send + Sync {
    /// Insert or overwrite the log for `(child_id, resource, date)`.
    /// The write of one key is atomic: concurrent upserts of the same key
    /// leave the store consistent with one of the writes, never a merge.
    fn upsert_log(&self, log: &ActivityLog) -> Result<()>;

    /// All stored logs for a child and resource within the inclusive date
    /// window, in no particular order.
    fn find_logs(
        &self,
        child_id: &str,
        resource: ResourceType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityLog>>;
}
