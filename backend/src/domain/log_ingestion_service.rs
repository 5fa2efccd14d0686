//! Batch ingestion of activity logs with per-item partial failure.
//!
//! Authorization gates the request, then two request-scoped checks run once
//! per batch (child id shape, child existence), and only then are the
//! entries processed independently. Each partition preserves the submission
//! order of its own items.

use log::{info, warn};
use std::sync::Arc;

use crate::domain::authorization_service::{Action, AuthorizationService};
use crate::domain::commands::logs::SubmitLogsCommand;
use crate::domain::errors::{DomainError, ValidationCode, ValidationFailure};
use crate::domain::log_validator;
use crate::domain::models::activity_log::ActivityLog;
use crate::domain::models::is_well_formed_id;
use crate::domain::models::user::User;
use crate::storage::traits::{IdentityStorage, LogStorage};

/// How a malformed child identifier is reported.
///
/// The upstream behavior is inconsistent between a whole-request rejection
/// and a per-entry error partition, so both are kept as named modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildIdFailureMode {
    /// The whole request fails with a single `INVALID_CHILD_ID` error.
    RejectRequest,
    /// Every entry lands in the error partition with `INVALID_CHILD_ID`;
    /// the response is a Multi-Status with an empty success partition.
    PerEntry,
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every entry was persisted.
    Created,
    /// Mix of persisted and rejected entries.
    MultiStatus,
    /// Every entry was rejected.
    BadRequest,
}

/// One successfully persisted entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSuccess {
    pub date: chrono::NaiveDate,
    pub value: i64,
}

/// One rejected entry. When an entry has several violations the record's
/// code is the first violation in field order and the message carries all
/// of them, so each failed entry contributes exactly one error record.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchError {
    pub code: ValidationCode,
    pub message: String,
    pub description: String,
    pub item: serde_json::Value,
}

impl From<ValidationFailure> for BatchError {
    fn from(failure: ValidationFailure) -> Self {
        Self {
            code: failure.code,
            message: failure.message,
            description: failure.description,
            item: failure.item,
        }
    }
}

/// Result of one batch submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitLogsResult {
    pub status: BatchStatus,
    pub success: Vec<BatchSuccess>,
    pub error: Vec<BatchError>,
}

/// Coordinates validation, authorization and persistence for submitted
/// batches.
#[derive(Clone)]
pub struct LogIngestionService {
    identity: Arc<dyn IdentityStorage>,
    logs: Arc<dyn LogStorage>,
    authorizer: AuthorizationService,
    child_id_failure_mode: ChildIdFailureMode,
}

impl LogIngestionService {
    pub fn new(
        identity: Arc<dyn IdentityStorage>,
        logs: Arc<dyn LogStorage>,
        authorizer: AuthorizationService,
    ) -> Self {
        Self::with_mode(identity, logs, authorizer, ChildIdFailureMode::RejectRequest)
    }

    pub fn with_mode(
        identity: Arc<dyn IdentityStorage>,
        logs: Arc<dyn LogStorage>,
        authorizer: AuthorizationService,
        child_id_failure_mode: ChildIdFailureMode,
    ) -> Self {
        Self {
            identity,
            logs,
            authorizer,
            child_id_failure_mode,
        }
    }

    /// Submit a batch of raw entries for one `(child, resource)`.
    ///
    /// Only validator-passing entries are persisted; a rejected entry never
    /// causes a write.
    pub fn submit_logs(
        &self,
        actor: &User,
        command: SubmitLogsCommand,
    ) -> Result<SubmitLogsResult, DomainError> {
        info!(
            "Submitting {} log entries: child={} resource={}",
            command.entries.len(),
            command.child_id,
            command.resource
        );

        self.authorizer.authorize(
            actor,
            &Action::SubmitLogs { child_id: command.child_id.clone() },
        )?;

        let resource = log_validator::validate_resource_name(&command.resource)
            .map_err(failure_to_request_error)?;

        // Identifier shape is request-scoped, not per-item.
        if !is_well_formed_id(&command.child_id) {
            warn!("Malformed child id in batch: {}", command.child_id);
            return match self.child_id_failure_mode {
                ChildIdFailureMode::RejectRequest => Err(DomainError::Validation {
                    code: ValidationCode::InvalidChildId,
                    message: format!("'{}' is not a well-formed child id", command.child_id),
                    description: "Child identifiers are 24-character hex strings.".to_string(),
                }),
                ChildIdFailureMode::PerEntry => Ok(SubmitLogsResult {
                    status: BatchStatus::MultiStatus,
                    success: Vec::new(),
                    error: command
                        .entries
                        .iter()
                        .map(|entry| BatchError {
                            code: ValidationCode::InvalidChildId,
                            message: format!(
                                "'{}' is not a well-formed child id",
                                command.child_id
                            ),
                            description: "Child identifiers are 24-character hex strings."
                                .to_string(),
                            item: entry.payload(),
                        })
                        .collect(),
                }),
            };
        }

        // Existence is checked once per batch: a nonexistent (or soft
        // deleted) child fails the whole batch with no partial successes.
        if !self.identity.child_exists(&command.child_id)? {
            warn!("Batch for nonexistent child: {}", command.child_id);
            return Err(DomainError::ChildNotFound { child_id: command.child_id });
        }

        let mut success = Vec::new();
        let mut error = Vec::new();

        for entry in &command.entries {
            match log_validator::validate(entry) {
                Ok(validated) => {
                    self.logs.upsert_log(&ActivityLog {
                        child_id: command.child_id.clone(),
                        resource,
                        date: validated.date,
                        value: validated.value,
                    })?;
                    success.push(BatchSuccess {
                        date: validated.date,
                        value: validated.value,
                    });
                }
                Err(failures) => error.push(merge_failures(failures)),
            }
        }

        let status = if error.is_empty() {
            BatchStatus::Created
        } else if success.is_empty() {
            BatchStatus::BadRequest
        } else {
            BatchStatus::MultiStatus
        };

        info!(
            "Batch done: child={} success={} error={}",
            command.child_id,
            success.len(),
            error.len()
        );

        Ok(SubmitLogsResult { status, success, error })
    }
}

/// Collapse an entry's violations into one error record, keeping every
/// violation message.
fn merge_failures(failures: Vec<ValidationFailure>) -> BatchError {
    debug_assert!(!failures.is_empty());
    if failures.len() == 1 {
        return failures.into_iter().next().unwrap().into();
    }
    let message = failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let description = failures
        .iter()
        .map(|f| f.description.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let first = failures.into_iter().next().unwrap();
    BatchError {
        code: first.code,
        message,
        description,
        item: first.item,
    }
}

fn failure_to_request_error(failure: ValidationFailure) -> DomainError {
    DomainError::Validation {
        code: failure.code,
        message: failure.message,
        description: failure.description,
    }
}
