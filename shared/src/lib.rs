use serde::{Deserialize, Serialize};

/// A single activity log item as submitted by a client.
///
/// Both fields are optional on the wire: the backend validator decides what a
/// missing field means and echoes the partial payload back in error reports,
/// so deserialization must never reject an incomplete item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LogItemDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Raw JSON value - may be a number, a numeric string, or garbage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// A stored (or zero-filled) point in a daily activity series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPointDto {
    /// Calendar day in yyyy-MM-dd format, no time component
    pub date: String,
    pub value: i64,
}

/// One successfully persisted batch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSuccessDto {
    /// Always "CREATED"
    pub code: String,
    pub item: LogPointDto,
}

/// One rejected batch item, with the original payload for correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchErrorDto {
    pub code: String,
    pub message: String,
    pub description: String,
    pub item: serde_json::Value,
}

/// Multi-status response for a submitted batch of activity logs.
///
/// Each list preserves the submission order of its own items; the two lists
/// are not ordered relative to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBatchResponseDto {
    pub success: Vec<BatchSuccessDto>,
    pub error: Vec<BatchErrorDto>,
}

/// Zero-filled daily series for a single resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSeriesDto {
    pub resource: String,
    pub logs: Vec<LogPointDto>,
}

/// Composite series response: one zero-filled sequence per resource type.
///
/// All five resource types are always present, even when no log was ever
/// stored for one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSeriesDto {
    pub steps: Vec<LogPointDto>,
    pub calories: Vec<LogPointDto>,
    pub active_minutes: Vec<LogPointDto>,
    pub lightly_active_minutes: Vec<LogPointDto>,
    pub sedentary_minutes: Vec<LogPointDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Stable error payload returned for any failed request.
///
/// `code` is machine-oriented and stable, `message` is a short technical
/// summary, `description` is meant for end users. Internal details (stack
/// traces, store identifiers) never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDto {
    pub code: String,
    pub message: String,
    pub description: String,
}
