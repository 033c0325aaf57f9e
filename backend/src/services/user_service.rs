use std::sync::Arc;

use sweetshop_shared::{UpdateProfileRequest, UpdateRoleRequest, UserRole, ERROR_INVALID_ROLE};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::User;
use crate::repositories::Store;


/// Customer profiles and superadmin account management
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The caller's directory entry, created on first use
    pub async fn profile(&self, caller: &AuthenticatedUser) -> Result<User, AppError> {
        if let Some(user) = self.store.find_user(caller.user_id).await? {
            return Ok(user);
        }
        record_caller(self.store.as_ref(), caller).await
    }

    /// Set the delivery contact shown to admins and partners
    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        request: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        request.validate()?;
        let mobile = request.mobile.as_deref().map(str::trim);
        let address = request.address.as_deref().map(str::trim);
        if mobile == Some("") || address == Some("") {
            return Err(AppError::Validation(
                "Mobile and address must not be blank".to_string(),
            ));
        }

        record_caller(self.store.as_ref(), caller).await?;
        let user = self
            .store
            .update_contact(caller.user_id, mobile, address)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        debug!("User {} updated their contact details", user.id);
        Ok(user)
    }

    pub async fn list_users(&self, caller: &AuthenticatedUser) -> Result<Vec<User>, AppError> {
        caller.require_superadmin()?;
        self.store.list_users().await
    }

    /// Grant or revoke admin rights. Takes effect from the user's next token.
    pub async fn change_role(
        &self,
        caller: &AuthenticatedUser,
        user_id: Uuid,
        request: UpdateRoleRequest,
    ) -> Result<User, AppError> {
        caller.require_superadmin()?;
        if request.role == UserRole::Partner {
            return Err(AppError::Validation(ERROR_INVALID_ROLE.to_string()));
        }

        let user = self
            .store
            .set_role(user_id, request.role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!("User {} is now {} (changed by {})", user.id, user.role, caller.user_id);
        Ok(user)
    }
}

/// Mirror the session's account into the directory so order views can name it
pub(crate) async fn record_caller(
    store: &dyn Store,
    caller: &AuthenticatedUser,
) -> Result<User, AppError> {
    let user = User {
        id: caller.user_id,
        ..User::new(caller.name.clone(), caller.role)
    };
    store.record_user(&user).await
}
