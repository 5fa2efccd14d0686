use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a platform user.
///
/// The role is fixed at creation time; no operation exists that changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Child,
    Educator,
    HealthProfessional,
    Family,
    Application,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Child => "child",
            Role::Educator => "educator",
            Role::HealthProfessional => "healthprofessional",
            Role::Family => "family",
            Role::Application => "application",
        }
    }

    pub fn parse(name: &str) -> Option<Role> {
        match name.to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "child" => Some(Role::Child),
            "educator" => Some(Role::Educator),
            "healthprofessional" => Some(Role::HealthProfessional),
            "family" => Some(Role::Family),
            "application" => Some(Role::Application),
            _ => None,
        }
    }
}

/// Domain model representing a user of the platform.
///
/// Children are users with [`Role::Child`]; their `id` doubles as the
/// `child_id` that activity logs and relationship links refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Opaque credential hash. Never empty or whitespace-only.
    pub password_hash: String,
    pub role: Role,
    /// Institution this user belongs to, if any (many users to one institution).
    pub institution_id: Option<String>,
    /// Soft-deletion marker. Deleted children keep their stored logs but
    /// fail existence checks.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Mint a new 24-char hex identifier.
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..24].to_string()
    }
}
