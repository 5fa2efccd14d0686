//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod logs {
    use crate::domain::log_validator::RawLogEntry;

    /// Input for submitting a batch of activity logs for one child and one
    /// resource type.
    #[derive(Debug, Clone)]
    pub struct SubmitLogsCommand {
        pub child_id: String,
        /// Raw resource name from the request; validated by the service.
        pub resource: String,
        pub entries: Vec<RawLogEntry>,
    }

    /// Query for a date-range activity series.
    #[derive(Debug, Clone)]
    pub struct LogSeriesQuery {
        pub child_id: String,
        /// Raw resource name; `None` requests the composite of all types.
        pub resource: Option<String>,
        pub date_start: String,
        pub date_end: String,
    }
}

pub mod users {
    use crate::domain::models::user::Role;

    /// Input for creating a new user. The role is fixed at creation.
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub username: String,
        pub password: String,
        pub role: Role,
        pub institution_id: Option<String>,
    }

    /// Self-service or admin password update.
    #[derive(Debug, Clone)]
    pub struct ChangePasswordCommand {
        pub target_user_id: String,
        pub new_password: String,
    }

    /// Admin-initiated (or self, where defined) password reset.
    #[derive(Debug, Clone)]
    pub struct ResetPasswordCommand {
        pub target_user_id: String,
        pub new_password: String,
    }
}

pub mod institutions {
    /// Input for registering an institution.
    #[derive(Debug, Clone)]
    pub struct CreateInstitutionCommand {
        pub kind: String,
        pub name: String,
        pub address: String,
        pub latitude: f64,
        pub longitude: f64,
    }
}

pub mod relationships {
    /// Input for creating a children group.
    #[derive(Debug, Clone)]
    pub struct CreateGroupCommand {
        pub name: String,
        pub children: Vec<String>,
    }

    /// Input for adding or removing one group member.
    #[derive(Debug, Clone)]
    pub struct GroupMemberCommand {
        pub group_id: String,
        pub child_id: String,
    }

    /// Replace a Family user's child list.
    #[derive(Debug, Clone)]
    pub struct SetFamilyChildrenCommand {
        pub children: Vec<String>,
    }
}
