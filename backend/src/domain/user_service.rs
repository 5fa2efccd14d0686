//! User management: creation and credential updates.
//!
//! Credential actions go through the authorization engine before anything is
//! touched; the engine's policy table decides which roles may self-serve.
//! Hashing is delegated to the caller of [`CreateUserCommand`]; this service
//! only enforces that credentials are never empty or whitespace-only.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::authorization_service::{Action, AuthorizationService};
use crate::domain::commands::institutions::CreateInstitutionCommand;
use crate::domain::commands::users::{ChangePasswordCommand, CreateUserCommand, ResetPasswordCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::institution::Institution;
use crate::domain::models::user::{Role, User};
use crate::storage::traits::IdentityStorage;

/// Service for managing platform users.
#[derive(Clone)]
pub struct UserService {
    identity: Arc<dyn IdentityStorage>,
    authorizer: AuthorizationService,
}

impl UserService {
    pub fn new(identity: Arc<dyn IdentityStorage>, authorizer: AuthorizationService) -> Self {
        Self { identity, authorizer }
    }

    /// Create a new user. The role is immutable afterwards; no update
    /// operation exists for it.
    pub fn create_user(&self, command: CreateUserCommand) -> Result<User, DomainError> {
        info!("Creating user: username={} role={}", command.username, command.role.as_str());

        if command.username.trim().is_empty() {
            return Err(DomainError::InvalidInput {
                message: "username must not be blank".to_string(),
            });
        }
        if command.password.trim().is_empty() {
            return Err(DomainError::InvalidInput {
                message: "password must not be empty or whitespace-only".to_string(),
            });
        }
        if self.identity.find_user_by_username(&command.username)?.is_some() {
            return Err(DomainError::Duplicate {
                message: format!("username '{}' is already taken", command.username),
            });
        }

        let now = Utc::now();
        let user = User {
            id: User::generate_id(),
            username: command.username,
            password_hash: command.password,
            role: command.role,
            institution_id: command.institution_id,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.identity.store_user(&user)?;

        info!("Created user: {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Retrieve a user by ID.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.identity.get_user(user_id)?)
    }

    /// Password update through the user-update endpoint.
    pub fn change_password(
        &self,
        actor: &User,
        command: ChangePasswordCommand,
    ) -> Result<(), DomainError> {
        info!("Password change for user {}", command.target_user_id);

        self.authorizer.authorize(
            actor,
            &Action::ChangePassword { target_user_id: command.target_user_id.clone() },
        )?;
        self.apply_new_password(&command.target_user_id, &command.new_password)
    }

    /// Admin-initiated (or self, where defined) password reset.
    pub fn reset_password(
        &self,
        actor: &User,
        command: ResetPasswordCommand,
    ) -> Result<(), DomainError> {
        info!("Password reset for user {}", command.target_user_id);

        self.authorizer.authorize(
            actor,
            &Action::ResetPassword { target_user_id: command.target_user_id.clone() },
        )?;
        self.apply_new_password(&command.target_user_id, &command.new_password)
    }

    /// Register an institution. Admin only; the institution is owned
    /// independently and referenced by users.
    pub fn create_institution(
        &self,
        actor: &User,
        command: CreateInstitutionCommand,
    ) -> Result<Institution, DomainError> {
        if actor.role != Role::Admin {
            return Err(DomainError::Forbidden);
        }
        if command.name.trim().is_empty() {
            return Err(DomainError::InvalidInput {
                message: "institution name must not be blank".to_string(),
            });
        }
        let institution = Institution {
            id: User::generate_id(),
            kind: command.kind,
            name: command.name.trim().to_string(),
            address: command.address,
            latitude: command.latitude,
            longitude: command.longitude,
        };
        self.identity.store_institution(&institution)?;
        info!("Registered institution {} ({})", institution.name, institution.id);
        Ok(institution)
    }

    /// List registered institutions ordered by name.
    pub fn list_institutions(&self) -> Result<Vec<Institution>, DomainError> {
        Ok(self.identity.list_institutions()?)
    }

    fn apply_new_password(&self, target_user_id: &str, new_password: &str) -> Result<(), DomainError> {
        if new_password.trim().is_empty() {
            return Err(DomainError::InvalidInput {
                message: "password must not be empty or whitespace-only".to_string(),
            });
        }
        if self.identity.get_user(target_user_id)?.is_none() {
            warn!("Password update for unknown user {}", target_user_id);
            return Err(DomainError::UserNotFound { user_id: target_user_id.to_string() });
        }
        self.identity.update_password(target_user_id, new_password)?;
        Ok(())
    }
}
