//! # Domain Module
//!
//! Business logic of the child health tracking platform.
//!
//! The two load-bearing subsystems live here:
//!
//! - **authorization_service**: relationship-aware ALLOW/DENY decisions over
//!   the roles and the children-group / family-link graph
//! - **log_ingestion_service** + **log_validator** + **log_series_service**:
//!   batch activity-log ingestion with per-item partial failure, and
//!   zero-filled date-range reconstruction
//!
//! Supporting services (users, relationships) are comparatively mechanical
//! and mostly exercise the storage traits the engine reads through.

pub mod authorization_service;
pub mod commands;
pub mod errors;
pub mod log_ingestion_service;
pub mod log_series_service;
pub mod log_validator;
pub mod models;
pub mod relationship_service;
pub mod user_service;

pub use authorization_service::{Action, AuthorizationPolicy, AuthorizationService, ChildLogScope};
pub use errors::{DomainError, ValidationCode, ValidationFailure};
pub use log_ingestion_service::{BatchStatus, ChildIdFailureMode, LogIngestionService, SubmitLogsResult};
pub use log_series_service::{CompositeSeries, LogSeriesService, ResourceSeries, SeriesPoint};
pub use relationship_service::RelationshipService;
pub use user_service::UserService;
