use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The five tracked activity metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Steps,
    Calories,
    ActiveMinutes,
    LightlyActiveMinutes,
    SedentaryMinutes,
}

/// Comma-separated list of every supported resource name, for error messages.
static ALLOWED_RESOURCE_NAMES: Lazy<String> = Lazy::new(|| {
    ResourceType::ALL
        .iter()
        .map(|r| r.name())
        .collect::<Vec<_>>()
        .join(", ")
});

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Steps,
        ResourceType::Calories,
        ResourceType::ActiveMinutes,
        ResourceType::LightlyActiveMinutes,
        ResourceType::SedentaryMinutes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Steps => "steps",
            ResourceType::Calories => "calories",
            ResourceType::ActiveMinutes => "active_minutes",
            ResourceType::LightlyActiveMinutes => "lightly_active_minutes",
            ResourceType::SedentaryMinutes => "sedentary_minutes",
        }
    }

    pub fn from_name(name: &str) -> Option<ResourceType> {
        ResourceType::ALL.iter().copied().find(|r| r.name() == name)
    }

    pub fn allowed_names() -> &'static str {
        &ALLOWED_RESOURCE_NAMES
    }
}

/// A single persisted activity measurement.
///
/// At most one log exists per `(child_id, resource, date)`; a later write for
/// the same key overwrites the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub child_id: String,
    pub resource: ResourceType,
    /// Calendar day, no time component.
    pub date: NaiveDate,
    /// Non-negative measurement for that day.
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names_roundtrip() {
        for resource in ResourceType::ALL {
            assert_eq!(ResourceType::from_name(resource.name()), Some(resource));
        }
        assert_eq!(ResourceType::from_name("heart_rate"), None);
        assert_eq!(ResourceType::from_name("Steps"), None); // names are exact
    }

    #[test]
    fn test_allowed_names_lists_all_five() {
        let allowed = ResourceType::allowed_names();
        for resource in ResourceType::ALL {
            assert!(allowed.contains(resource.name()));
        }
    }
}
