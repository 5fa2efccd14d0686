use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named set of children owned by exactly one Educator or one
/// HealthProfessional.
///
/// Ownership grants the owner scoped access to every member child; membership
/// changes only through the owner. Several groups may reference the same
/// child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildrenGroup {
    pub id: String,
    pub name: String,
    /// The owning Educator or HealthProfessional user.
    pub owner_id: String,
    pub children: Vec<String>,
}

impl ChildrenGroup {
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..24].to_string()
    }

    pub fn contains_child(&self, child_id: &str) -> bool {
        self.children.iter().any(|c| c == child_id)
    }
}
