use std::sync::Arc;

use domain::{
    entities::users::UserEntity,
    repositories::{applications::ApplicationRepository, users::UserRepository},
    value_objects::enums::user_roles::UserRole,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth;

#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error("user not found")]
    NotFound,
    #[error("you cannot perform this action on your own account")]
    SelfAction,
    #[error("user is not an admin")]
    NotAnAdmin,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminUserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminUserError::NotFound => StatusCode::NOT_FOUND,
            AdminUserError::SelfAction | AdminUserError::NotAnAdmin => StatusCode::BAD_REQUEST,
            AdminUserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AdminUserResult<T> = std::result::Result<T, AdminUserError>;

pub struct UserAdminUseCase<U, A>
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    application_repo: Arc<A>,
}

impl<U, A> UserAdminUseCase<U, A>
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, application_repo: Arc<A>) -> Self {
        Self {
            user_repo,
            application_repo,
        }
    }

    pub async fn list(&self) -> AdminUserResult<Vec<UserEntity>> {
        let users = self.user_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "admin users: failed to list users");
            AdminUserError::Internal(err)
        })?;

        Ok(users)
    }

    async fn get(&self, user_id: Uuid) -> AdminUserResult<UserEntity> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(AdminUserError::Internal)?
            .ok_or_else(|| {
                let err = AdminUserError::NotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "admin users: unknown user"
                );
                err
            })
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        role: String,
        password: Option<String>,
    ) -> AdminUserResult<()> {
        self.get(user_id).await?;

        self.user_repo
            .update_profile(user_id, name, email, role)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin users: failed to update profile");
                AdminUserError::Internal(err)
            })?;

        if let Some(password) = password.filter(|p| !p.is_empty()) {
            let password_hash = auth::hash_password(&password)?;
            self.user_repo
                .update_password_hash(user_id, password_hash)
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "admin users: failed to update password");
                    AdminUserError::Internal(err)
                })?;
        }

        info!(%user_id, "admin users: user updated");

        Ok(())
    }

    /// Deletes the user together with their applications. Admins cannot
    /// delete themselves.
    pub async fn delete(&self, acting_admin: Uuid, user_id: Uuid) -> AdminUserResult<()> {
        if acting_admin == user_id {
            return Err(AdminUserError::SelfAction);
        }

        self.get(user_id).await?;

        self.application_repo
            .delete_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin users: failed to delete applications");
                AdminUserError::Internal(err)
            })?;
        self.user_repo.delete(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "admin users: failed to delete user");
            AdminUserError::Internal(err)
        })?;

        info!(%user_id, "admin users: user deleted");

        Ok(())
    }

    /// Flips the account between its role and `inactive`. Admins cannot
    /// deactivate themselves.
    pub async fn toggle_active(&self, acting_admin: Uuid, user_id: Uuid) -> AdminUserResult<String> {
        if acting_admin == user_id {
            return Err(AdminUserError::SelfAction);
        }

        let user = self.get(user_id).await?;

        let new_role = if user.role == UserRole::Inactive.as_str() {
            UserRole::Student
        } else {
            UserRole::Inactive
        };

        self.user_repo
            .set_role(user_id, new_role.to_string())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin users: failed to toggle status");
                AdminUserError::Internal(err)
            })?;

        info!(%user_id, new_role = %new_role, "admin users: status toggled");

        Ok(new_role.to_string())
    }

    pub async fn list_pending_admins(&self) -> AdminUserResult<Vec<UserEntity>> {
        let pending = self.user_repo.list_pending_admins().await.map_err(|err| {
            error!(db_error = ?err, "admin users: failed to list pending admins");
            AdminUserError::Internal(err)
        })?;

        Ok(pending)
    }

    pub async fn approve_admin(&self, user_id: Uuid) -> AdminUserResult<()> {
        let user = self.get(user_id).await?;

        if user.role != UserRole::Admin.as_str() {
            return Err(AdminUserError::NotAnAdmin);
        }

        self.user_repo
            .set_admin_approved(user_id, true)
            .await
            .map_err(AdminUserError::Internal)?;

        info!(%user_id, "admin users: admin approved");

        Ok(())
    }

    /// A rejected admin keeps their account but is demoted to student, which
    /// also lets them log in again.
    pub async fn reject_admin(&self, user_id: Uuid) -> AdminUserResult<()> {
        let user = self.get(user_id).await?;

        if user.role != UserRole::Admin.as_str() {
            return Err(AdminUserError::NotAnAdmin);
        }

        self.user_repo
            .set_role(user_id, UserRole::Student.to_string())
            .await
            .map_err(AdminUserError::Internal)?;
        self.user_repo
            .set_admin_approved(user_id, true)
            .await
            .map_err(AdminUserError::Internal)?;

        info!(%user_id, "admin users: admin rejected and demoted to student");

        Ok(())
    }
}
