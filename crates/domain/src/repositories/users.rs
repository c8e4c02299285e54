use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::users::{InsertUserEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn create(&self, user: InsertUserEntity) -> Result<Uuid>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn list(&self) -> Result<Vec<UserEntity>>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        role: String,
    ) -> Result<()>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: String) -> Result<()>;

    async fn set_role(&self, user_id: Uuid, role: String) -> Result<()>;

    async fn delete(&self, user_id: Uuid) -> Result<()>;

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserEntity>>;

    async fn clear_reset_token(&self, user_id: Uuid) -> Result<()>;

    async fn list_pending_admins(&self) -> Result<Vec<UserEntity>>;

    async fn list_approved_admins(&self) -> Result<Vec<UserEntity>>;

    async fn set_admin_approved(&self, user_id: Uuid, approved: bool) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}
