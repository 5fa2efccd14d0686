//! Date-range aggregation of activity logs.
//!
//! A series is a *reconstruction*: a dense day sequence over the inclusive
//! window merged with the sparse stored logs, with `value = 0` synthesized
//! for every day that has no stored log. Zeros are never persisted, so the
//! merge is recomputed on every query.

use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::authorization_service::{Action, AuthorizationService};
use crate::domain::commands::logs::LogSeriesQuery;
use crate::domain::errors::{DomainError, ValidationCode};
use crate::domain::log_validator;
use crate::domain::models::activity_log::ResourceType;
use crate::domain::models::is_well_formed_id;
use crate::domain::models::user::User;
use crate::storage::traits::{IdentityStorage, LogStorage};

/// One day in a reconstructed series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: i64,
}

/// Zero-filled daily series for one resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSeries {
    pub resource: ResourceType,
    pub points: Vec<SeriesPoint>,
}

/// Composite of all five resource series, in [`ResourceType::ALL`] order.
/// Every type is present even when nothing was ever stored for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSeries {
    pub series: Vec<ResourceSeries>,
}

/// Reconstructs complete daily series from sparse stored logs.
#[derive(Clone)]
pub struct LogSeriesService {
    identity: Arc<dyn IdentityStorage>,
    logs: Arc<dyn LogStorage>,
    authorizer: AuthorizationService,
}

impl LogSeriesService {
    pub fn new(
        identity: Arc<dyn IdentityStorage>,
        logs: Arc<dyn LogStorage>,
        authorizer: AuthorizationService,
    ) -> Self {
        Self {
            identity,
            logs,
            authorizer,
        }
    }

    /// Query the zero-filled series for a single resource type.
    pub fn query_series(
        &self,
        actor: &User,
        query: LogSeriesQuery,
    ) -> Result<ResourceSeries, DomainError> {
        let (start, end) = self.check_query(actor, &query)?;

        let resource_name = query.resource.clone().unwrap_or_default();
        let resource = log_validator::validate_resource_name(&resource_name)
            .map_err(|f| DomainError::Validation {
                code: f.code,
                message: f.message,
                description: f.description,
            })?;

        self.zero_filled(&query.child_id, resource, start, end)
    }

    /// Query zero-filled series for every resource type at once.
    pub fn query_all_series(
        &self,
        actor: &User,
        query: LogSeriesQuery,
    ) -> Result<CompositeSeries, DomainError> {
        let (start, end) = self.check_query(actor, &query)?;

        let mut series = Vec::with_capacity(ResourceType::ALL.len());
        for resource in ResourceType::ALL {
            series.push(self.zero_filled(&query.child_id, resource, start, end)?);
        }
        Ok(CompositeSeries { series })
    }

    /// Shared preconditions: authorization, date parsing, child id shape and
    /// existence.
    fn check_query(
        &self,
        actor: &User,
        query: &LogSeriesQuery,
    ) -> Result<(NaiveDate, NaiveDate), DomainError> {
        self.authorizer.authorize(
            actor,
            &Action::QueryLogs { child_id: query.child_id.clone() },
        )?;

        let start = parse_date_param("date_start", &query.date_start)?;
        let end = parse_date_param("date_end", &query.date_end)?;

        if !is_well_formed_id(&query.child_id) {
            return Err(DomainError::Validation {
                code: ValidationCode::InvalidChildId,
                message: format!("'{}' is not a well-formed child id", query.child_id),
                description: "Child identifiers are 24-character hex strings.".to_string(),
            });
        }
        if !self.identity.child_exists(&query.child_id)? {
            return Err(DomainError::ChildNotFound { child_id: query.child_id.clone() });
        }

        Ok((start, end))
    }

    /// Merge the dense day sequence `[start, end]` with the sparse stored
    /// map for one resource.
    fn zero_filled(
        &self,
        child_id: &str,
        resource: ResourceType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ResourceSeries, DomainError> {
        let stored: HashMap<NaiveDate, i64> = self
            .logs
            .find_logs(child_id, resource, start, end)?
            .into_iter()
            .map(|log| (log.date, log.value))
            .collect();

        let mut points = Vec::new();
        let mut day = start;
        while day <= end {
            points.push(SeriesPoint {
                date: day,
                value: stored.get(&day).copied().unwrap_or(0),
            });
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        info!(
            "Reconstructed series: child={} resource={} days={} stored={}",
            child_id,
            resource.name(),
            points.len(),
            stored.len()
        );

        Ok(ResourceSeries { resource, points })
    }
}

fn parse_date_param(param: &str, raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DomainError::Validation {
        code: ValidationCode::InvalidDate,
        message: format!("{} '{}' is not a valid yyyy-MM-dd date", param, raw),
        description: format!("The {} parameter must be a real calendar day in yyyy-MM-dd format.", param),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::activity_log::ActivityLog;
    use crate::domain::models::user::Role;
    use crate::storage::memory::{IdentityRepository, LogRepository, MemoryConnection};
    use crate::storage::traits::IdentityStorage as _;
    use crate::storage::traits::LogStorage as _;
    use chrono::Utc;

    const CHILD_ID: &str = "5c86d00c2239a917e8b591a0";

    struct Fixture {
        identity: Arc<IdentityRepository>,
        logs: Arc<LogRepository>,
        service: LogSeriesService,
        admin: User,
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            username: format!("user-{}", id),
            password_hash: "secret".to_string(),
            role,
            institution_id: None,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup() -> Fixture {
        let connection = Arc::new(MemoryConnection::new());
        let identity = Arc::new(IdentityRepository::new(connection.clone()));
        let logs = Arc::new(LogRepository::new(connection));
        let authorizer = AuthorizationService::new(identity.clone());
        let service = LogSeriesService::new(identity.clone(), logs.clone(), authorizer);
        identity.store_user(&user(CHILD_ID, Role::Child)).unwrap();
        Fixture {
            identity,
            logs,
            service,
            admin: user("adm", Role::Admin),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store(fx: &Fixture, resource: ResourceType, day: &str, value: i64) {
        fx.logs
            .upsert_log(&ActivityLog {
                child_id: CHILD_ID.to_string(),
                resource,
                date: date(day),
                value,
            })
            .unwrap();
    }

    fn query(resource: Option<&str>, start: &str, end: &str) -> LogSeriesQuery {
        LogSeriesQuery {
            child_id: CHILD_ID.to_string(),
            resource: resource.map(|r| r.to_string()),
            date_start: start.to_string(),
            date_end: end.to_string(),
        }
    }

    #[test]
    fn test_zero_fill_example() {
        // Ingest one steps value, query three days: the two missing days
        // come back as zeros.
        let fx = setup();
        store(&fx, ResourceType::Steps, "2019-01-01", 100);

        let series = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-01-01", "2019-01-03"))
            .unwrap();

        assert_eq!(
            series.points,
            vec![
                SeriesPoint { date: date("2019-01-01"), value: 100 },
                SeriesPoint { date: date("2019-01-02"), value: 0 },
                SeriesPoint { date: date("2019-01-03"), value: 0 },
            ]
        );
    }

    #[test]
    fn test_series_length_equals_inclusive_day_count() {
        let fx = setup();
        let series = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-01-01", "2019-01-31"))
            .unwrap();
        assert_eq!(series.points.len(), 31);
        assert!(series.points.iter().all(|p| p.value == 0));

        let single = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-02-10", "2019-02-10"))
            .unwrap();
        assert_eq!(single.points.len(), 1);
    }

    #[test]
    fn test_series_is_ascending_and_spans_month_boundary() {
        let fx = setup();
        store(&fx, ResourceType::Calories, "2019-02-01", 7);

        let series = fx
            .service
            .query_series(&fx.admin, query(Some("calories"), "2019-01-30", "2019-02-02"))
            .unwrap();

        let dates: Vec<String> = series.points.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2019-01-30", "2019-01-31", "2019-02-01", "2019-02-02"]);
        assert_eq!(series.points[2].value, 7);
    }

    #[test]
    fn test_start_after_end_yields_empty_series() {
        let fx = setup();
        let series = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-01-10", "2019-01-01"))
            .unwrap();
        assert!(series.points.is_empty());
    }

    #[test]
    fn test_composite_always_carries_all_five_types() {
        let fx = setup();
        store(&fx, ResourceType::Steps, "2019-01-01", 100);

        let composite = fx
            .service
            .query_all_series(&fx.admin, query(None, "2019-01-01", "2019-01-02"))
            .unwrap();

        assert_eq!(composite.series.len(), 5);
        for series in &composite.series {
            assert_eq!(series.points.len(), 2);
        }
        let steps = composite
            .series
            .iter()
            .find(|s| s.resource == ResourceType::Steps)
            .unwrap();
        assert_eq!(steps.points[0].value, 100);
        // Never-stored types are fully zero-filled.
        let sedentary = composite
            .series
            .iter()
            .find(|s| s.resource == ResourceType::SedentaryMinutes)
            .unwrap();
        assert!(sedentary.points.iter().all(|p| p.value == 0));
    }

    #[test]
    fn test_invalid_date_parameter_names_the_offender() {
        let fx = setup();
        let result = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-13-01", "2019-01-03"));
        match result {
            Err(DomainError::Validation { code, message, .. }) => {
                assert_eq!(code, ValidationCode::InvalidDate);
                assert!(message.contains("date_start"));
                assert!(message.contains("2019-13-01"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let result = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-01-01", "whenever"));
        match result {
            Err(DomainError::Validation { message, .. }) => assert!(message.contains("date_end")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_resource_filter() {
        let fx = setup();
        let result = fx
            .service
            .query_series(&fx.admin, query(Some("heart_rate"), "2019-01-01", "2019-01-02"));
        assert!(matches!(
            result,
            Err(DomainError::Validation { code: ValidationCode::UnsupportedResourceType, .. })
        ));
    }

    #[test]
    fn test_deleted_child_queries_fail_even_with_stored_logs() {
        let fx = setup();
        store(&fx, ResourceType::Steps, "2019-01-01", 100);
        fx.identity.mark_user_deleted(CHILD_ID).unwrap();

        let result = fx
            .service
            .query_series(&fx.admin, query(Some("steps"), "2019-01-01", "2019-01-03"));
        assert!(matches!(result, Err(DomainError::ChildNotFound { .. })));
    }

    #[test]
    fn test_query_requires_authorization() {
        let fx = setup();
        let stranger = user("edu", Role::Educator); // owns no group with the child
        let result = fx
            .service
            .query_series(&stranger, query(Some("steps"), "2019-01-01", "2019-01-03"));
        assert!(matches!(result, Err(DomainError::Forbidden)));
    }
}
