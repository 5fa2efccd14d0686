use anyhow::Result;
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::connection::MemoryConnection;
use crate::domain::models::activity_log::{ActivityLog, ResourceType};
use crate::storage::traits::LogStorage;

/// In-memory activity log repository, keyed by `(child_id, resource, date)`.
#[derive(Clone)]
pub struct LogRepository {
    connection: Arc<MemoryConnection>,
}

impl LogRepository {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self { connection }
    }
}

impl LogStorage for LogRepository {
    fn upsert_log(&self, log: &ActivityLog) -> Result<()> {
        debug!(
            "Upserting log: child={} resource={} date={} value={}",
            log.child_id,
            log.resource.name(),
            log.date,
            log.value
        );
        let mut logs = self.connection.logs.lock().unwrap();
        // Single map insert under the lock: overwrite, never merge.
        logs.insert((log.child_id.clone(), log.resource, log.date), log.value);
        Ok(())
    }

    fn find_logs(
        &self,
        child_id: &str,
        resource: ResourceType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityLog>> {
        let logs = self.connection.logs.lock().unwrap();
        Ok(logs
            .iter()
            .filter(|((cid, res, date), _)| {
                cid == child_id && *res == resource && *date >= start && *date <= end
            })
            .map(|((cid, res, date), value)| ActivityLog {
                child_id: cid.clone(),
                resource: *res,
                date: *date,
                value: *value,
            })
            .collect())
    }
}
