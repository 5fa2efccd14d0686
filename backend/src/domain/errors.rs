//! User-visible error taxonomy.
//!
//! Every failure surfaced to a caller carries a stable machine code, a short
//! technical message and a human-oriented description. Authorization denials
//! deliberately collapse to a single undifferentiated `FORBIDDEN` so that the
//! caller cannot distinguish "role not permitted" from "child not in your
//! group". Internal errors are reported without detail.

use thiserror::Error;

/// Stable sub-kind codes for validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    DateRequired,
    ValueRequired,
    DateAndValueRequired,
    InvalidDateFormat,
    ValueNotANumber,
    ValueNegative,
    UnsupportedResourceType,
    InvalidChildId,
    InvalidDate,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::DateRequired => "DATE_REQUIRED",
            ValidationCode::ValueRequired => "VALUE_REQUIRED",
            ValidationCode::DateAndValueRequired => "DATE_AND_VALUE_REQUIRED",
            ValidationCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ValidationCode::ValueNotANumber => "VALUE_NOT_A_NUMBER",
            ValidationCode::ValueNegative => "VALUE_NEGATIVE",
            ValidationCode::UnsupportedResourceType => "UNSUPPORTED_RESOURCE_TYPE",
            ValidationCode::InvalidChildId => "INVALID_CHILD_ID",
            ValidationCode::InvalidDate => "INVALID_DATE",
        }
    }
}

/// A single validation violation, with the original (possibly partial)
/// payload so callers can correlate failures with submitted entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub code: ValidationCode,
    pub message: String,
    pub description: String,
    pub item: serde_json::Value,
}

/// Errors that abort a whole request.
///
/// Per-item validation failures inside a batch are *not* errors in this
/// sense; they travel in the error partition of the batch result.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("access to this resource is forbidden")]
    Forbidden,

    /// Request-scoped validation failure (malformed child id, bad date
    /// parameter, unsupported resource name).
    #[error("{message}")]
    Validation {
        code: ValidationCode,
        message: String,
        description: String,
    },

    #[error("child not found: {child_id}")]
    ChildNotFound { child_id: String },

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("children group not found: {group_id}")]
    GroupNotFound { group_id: String },

    #[error("{message}")]
    Duplicate { message: String },

    /// Malformed input to a supplemental operation (blank username, empty
    /// password, ...).
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Stable machine-oriented code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "UNAUTHENTICATED",
            DomainError::Forbidden => "FORBIDDEN",
            DomainError::Validation { code, .. } => code.as_str(),
            DomainError::ChildNotFound { .. } => "CHILD_NOT_FOUND",
            DomainError::UserNotFound { .. } => "USER_NOT_FOUND",
            DomainError::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            DomainError::Duplicate { .. } => "DUPLICATE",
            DomainError::InvalidInput { .. } => "BAD_REQUEST",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-oriented description, safe to show to an end user.
    pub fn description(&self) -> String {
        match self {
            DomainError::Unauthenticated => {
                "You must be authenticated to perform this action.".to_string()
            }
            DomainError::Forbidden => {
                "You are not allowed to perform this action on this resource.".to_string()
            }
            DomainError::Validation { description, .. } => description.clone(),
            DomainError::ChildNotFound { .. } => {
                "The requested child was not found.".to_string()
            }
            DomainError::UserNotFound { .. } => {
                "The requested user was not found.".to_string()
            }
            DomainError::GroupNotFound { .. } => {
                "The requested children group was not found.".to_string()
            }
            DomainError::Duplicate { message } => message.clone(),
            DomainError::InvalidInput { message } => message.clone(),
            DomainError::Internal(_) => {
                "An internal error has occurred. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_codes() {
        assert_eq!(DomainError::Forbidden.code(), "FORBIDDEN");
        assert_eq!(DomainError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(
            DomainError::ChildNotFound { child_id: "x".into() }.code(),
            "CHILD_NOT_FOUND"
        );
        assert_eq!(ValidationCode::DateAndValueRequired.as_str(), "DATE_AND_VALUE_REQUIRED");
    }

    #[test]
    fn test_internal_error_leaks_no_detail() {
        let err: DomainError = anyhow::anyhow!("sqlite file /var/db/users corrupt").into();
        assert_eq!(err.to_string(), "internal error");
        assert!(!err.description().contains("sqlite"));
    }
}
