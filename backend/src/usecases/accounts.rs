use std::sync::Arc;

use chrono::{Duration, Utc};
use domain::{
    entities::users::InsertUserEntity,
    repositories::users::UserRepository,
    value_objects::enums::user_roles::UserRole,
};
use notifications::{events::EmailEvent, notifier::EmailNotifier};
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{auth, config::config_model::AuthSecret};

const MIN_PASSWORD_LEN: usize = 6;
const RESET_TOKEN_LEN: usize = 48;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid role")]
    InvalidRole,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters long")]
    WeakPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("your admin account is pending approval")]
    AdminPendingApproval,
    #[error("this account has been deactivated")]
    AccountDisabled,
    #[error("invalid or expired reset token")]
    InvalidResetToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::InvalidRole
            | AccountError::WeakPassword
            | AccountError::PasswordMismatch
            | AccountError::InvalidResetToken => StatusCode::BAD_REQUEST,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::AdminPendingApproval | AccountError::AccountDisabled => {
                StatusCode::FORBIDDEN
            }
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AccountResult<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

pub struct AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    notifier: EmailNotifier,
    auth_secret: AuthSecret,
    base_url: String,
}

impl<U> AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        notifier: EmailNotifier,
        auth_secret: AuthSecret,
        base_url: String,
    ) -> Self {
        Self {
            user_repo,
            notifier,
            auth_secret,
            base_url,
        }
    }

    /// Admin registrations start unapproved and cannot log in until a
    /// standing admin approves them; every other role is active immediately.
    pub async fn register(&self, request: RegisterRequest) -> AccountResult<Uuid> {
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let role = match request.role.as_deref() {
            None => UserRole::Student,
            Some(raw) => match UserRole::from_str(raw) {
                Some(UserRole::Inactive) | None => {
                    let err = AccountError::InvalidRole;
                    warn!(
                        role = raw,
                        status = err.status_code().as_u16(),
                        "accounts: registration with invalid role"
                    );
                    return Err(err);
                }
                Some(role) => role,
            },
        };

        let email = request.email.trim().to_lowercase();
        if self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(AccountError::Internal)?
            .is_some()
        {
            let err = AccountError::EmailTaken;
            warn!(
                email = %email,
                status = err.status_code().as_u16(),
                "accounts: registration with taken email"
            );
            return Err(err);
        }

        let password_hash = auth::hash_password(&request.password)?;

        let user_id = self
            .user_repo
            .create(InsertUserEntity {
                name: request.name,
                email: email.clone(),
                password_hash,
                role: role.to_string(),
                admin_approved: role != UserRole::Admin,
            })
            .await
            .map_err(|err| {
                error!(email = %email, db_error = ?err, "accounts: failed to create user");
                AccountError::Internal(err)
            })?;

        info!(%user_id, role = %role, "accounts: user registered");

        Ok(user_id)
    }

    pub async fn login(&self, email: &str, password: &str) -> AccountResult<LoginResponse> {
        let email = email.trim().to_lowercase();

        let user = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(AccountError::Internal)?
            .ok_or(AccountError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash) {
            let err = AccountError::InvalidCredentials;
            warn!(
                email = %email,
                status = err.status_code().as_u16(),
                "accounts: login with wrong password"
            );
            return Err(err);
        }

        if user.role == UserRole::Admin.as_str() && !user.admin_approved {
            let err = AccountError::AdminPendingApproval;
            warn!(
                user_id = %user.id,
                status = err.status_code().as_u16(),
                "accounts: unapproved admin tried to log in"
            );
            return Err(err);
        }

        if user.role == UserRole::Inactive.as_str() {
            let err = AccountError::AccountDisabled;
            warn!(
                user_id = %user.id,
                status = err.status_code().as_u16(),
                "accounts: deactivated user tried to log in"
            );
            return Err(err);
        }

        let token = auth::issue_token(
            &self.auth_secret.jwt_secret,
            self.auth_secret.token_ttl_hours,
            user.id,
            &user.role,
            &user.email,
        )?;

        info!(user_id = %user.id, "accounts: login succeeded");

        Ok(LoginResponse {
            token,
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }

    /// Always succeeds from the caller's point of view so the endpoint never
    /// reveals whether an email is registered.
    pub async fn forgot_password(&self, email: &str) -> AccountResult<()> {
        let email = email.trim().to_lowercase();

        let user = match self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(AccountError::Internal)?
        {
            Some(user) => user,
            None => {
                info!("accounts: password reset requested for unknown email");
                return Ok(());
            }
        };

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.user_repo
            .set_reset_token(user.id, token.clone(), expires_at)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "accounts: failed to store reset token");
                AccountError::Internal(err)
            })?;

        self.notifier.try_notify(EmailEvent::PasswordReset {
            recipient: user.email,
            user_name: user.name,
            reset_url: format!("{}/reset-password?token={}", self.base_url, token),
        });

        info!(user_id = %user.id, "accounts: password reset token issued");

        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> AccountResult<()> {
        if password != confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let user = self
            .user_repo
            .find_by_reset_token(token)
            .await
            .map_err(AccountError::Internal)?
            .ok_or(AccountError::InvalidResetToken)?;

        if !user.reset_token_matches(token, Utc::now()) {
            let err = AccountError::InvalidResetToken;
            warn!(
                user_id = %user.id,
                status = err.status_code().as_u16(),
                "accounts: expired or mismatched reset token"
            );
            return Err(err);
        }

        let password_hash = auth::hash_password(password)?;

        self.user_repo
            .update_password_hash(user.id, password_hash)
            .await
            .map_err(AccountError::Internal)?;
        self.user_repo
            .clear_reset_token(user.id)
            .await
            .map_err(AccountError::Internal)?;

        info!(user_id = %user.id, "accounts: password reset completed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{entities::users::UserEntity, repositories::users::MockUserRepository};

    fn auth_secret() -> AuthSecret {
        AuthSecret {
            jwt_secret: "supersecretjwtsecretforunittesting123".to_string(),
            token_ttl_hours: 24,
        }
    }

    fn usecase(user_repo: MockUserRepository) -> AccountUseCase<MockUserRepository> {
        AccountUseCase::new(
            Arc::new(user_repo),
            EmailNotifier::new(vec![]),
            auth_secret(),
            "http://127.0.0.1:8080".to_string(),
        )
    }

    fn sample_user(role: &str, admin_approved: bool, password: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: auth::hash_password(password).unwrap(),
            role: role.to_string(),
            admin_approved,
            reset_token: None,
            reset_token_expires: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let user = sample_user("student", true, "password1");
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let result = usecase(user_repo)
            .register(RegisterRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "password1".to_string(),
                role: None,
            })
            .await;

        assert!(matches!(result, Err(AccountError::EmailTaken)));
    }

    #[tokio::test]
    async fn register_leaves_new_admins_unapproved() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        user_repo
            .expect_create()
            .withf(|insert| insert.role == "admin" && !insert.admin_approved)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(Uuid::new_v4()) }));

        let result = usecase(user_repo)
            .register(RegisterRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "password1".to_string(),
                role: Some("admin".to_string()),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn login_rejects_unapproved_admin() {
        let user = sample_user("admin", false, "password1");
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let result = usecase(user_repo).login("ada@example.com", "password1").await;

        assert!(matches!(result, Err(AccountError::AdminPendingApproval)));
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let user = sample_user("student", true, "password1");
        let user_id = user.id;
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let response = usecase(user_repo)
            .login("ada@example.com", "password1")
            .await
            .unwrap();

        assert_eq!(response.user_id, user_id);
        let claims = auth::validate_token(&auth_secret().jwt_secret, &response.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "student");
    }

    #[tokio::test]
    async fn reset_password_rejects_expired_token() {
        let mut user = sample_user("student", true, "password1");
        user.reset_token = Some("token-token-token".to_string());
        user.reset_token_expires = Some(Utc::now() - Duration::hours(2));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_reset_token().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });

        let result = usecase(user_repo)
            .reset_password("token-token-token", "newpassword", "newpassword")
            .await;

        assert!(matches!(result, Err(AccountError::InvalidResetToken)));
    }
}
