use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::domain::models::activity_log::ResourceType;
use crate::domain::models::institution::Institution;
use crate::domain::models::relationships::ChildrenGroup;
use crate::domain::models::user::User;

/// Shared state behind the in-memory repositories.
///
/// Each table is guarded by its own mutex; a single map operation under the
/// lock is the unit of atomicity, which satisfies the upsert contract of
/// [`crate::storage::traits::LogStorage`].
#[derive(Default)]
pub struct MemoryConnection {
    pub(super) users: Mutex<HashMap<String, User>>,
    pub(super) institutions: Mutex<HashMap<String, Institution>>,
    pub(super) groups: Mutex<HashMap<String, ChildrenGroup>>,
    pub(super) family_links: Mutex<HashMap<String, Vec<String>>>,
    pub(super) logs: Mutex<HashMap<(String, ResourceType, NaiveDate), i64>>,
}

impl MemoryConnection {
    /// Create a new, empty connection.
    pub fn new() -> Self {
        Self::default()
    }
}
