//! # Child Health Tracker Backend
//!
//! Stateless per-request backend for a child health-tracking platform.
//! Every request is independent; the only shared mutable state lives behind
//! the storage traits.

use std::sync::Arc;

pub mod domain;
pub mod rest;
pub mod storage;

use domain::{
    AuthorizationPolicy, AuthorizationService, ChildIdFailureMode, LogIngestionService,
    LogSeriesService, RelationshipService, UserService,
};
use storage::memory::{IdentityRepository, LogRepository};
use storage::{IdentityStorage, LogStorage, MemoryConnection};

/// Main backend struct that orchestrates all services over one storage
/// connection.
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityStorage>,
    pub logs: Arc<dyn LogStorage>,
    pub authorization_service: AuthorizationService,
    pub log_ingestion_service: LogIngestionService,
    pub log_series_service: LogSeriesService,
    pub user_service: UserService,
    pub relationship_service: RelationshipService,
}

impl Backend {
    /// Create a backend over a fresh in-memory store with default policy.
    pub fn new() -> Self {
        Self::with_policy(AuthorizationPolicy::default(), ChildIdFailureMode::RejectRequest)
    }

    /// Create a backend with explicit policy knobs.
    pub fn with_policy(policy: AuthorizationPolicy, child_id_mode: ChildIdFailureMode) -> Self {
        let connection = Arc::new(MemoryConnection::new());
        let identity: Arc<dyn IdentityStorage> =
            Arc::new(IdentityRepository::new(connection.clone()));
        let logs: Arc<dyn LogStorage> = Arc::new(LogRepository::new(connection));

        let authorization_service = AuthorizationService::with_policy(identity.clone(), policy);
        let log_ingestion_service = LogIngestionService::with_mode(
            identity.clone(),
            logs.clone(),
            authorization_service.clone(),
            child_id_mode,
        );
        let log_series_service =
            LogSeriesService::new(identity.clone(), logs.clone(), authorization_service.clone());
        let user_service = UserService::new(identity.clone(), authorization_service.clone());
        let relationship_service = RelationshipService::new(identity.clone());

        Self {
            identity,
            logs,
            authorization_service,
            log_ingestion_service,
            log_series_service,
            user_service,
            relationship_service,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}
