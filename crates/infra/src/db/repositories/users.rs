use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::users::{InsertUserEntity, UserEntity},
    repositories::users::UserRepository,
    schema::users,
    value_objects::enums::user_roles::UserRole,
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn create(&self, user: InsertUserEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user_id = insert_into(users::table)
            .values(&user)
            .returning(users::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(user_id)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .order(users::created_at.desc())
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        role: String,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set((
                users::name.eq(name),
                users::email.eq(email),
                users::role.eq(role),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_role(&self, user_id: Uuid, role: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::role.eq(role))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(users::table.filter(users::id.eq(user_id))).execute(&mut conn)?;

        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set((
                users::reset_token.eq(Some(token)),
                users::reset_token_expires.eq(Some(expires_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::reset_token.eq(token))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn clear_reset_token(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set((
                users::reset_token.eq(None::<String>),
                users::reset_token_expires.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_pending_admins(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::role.eq(UserRole::Admin.to_string()))
            .filter(users::admin_approved.eq(false))
            .order(users::created_at.desc())
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_approved_admins(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::role.eq(UserRole::Admin.to_string()))
            .filter(users::admin_approved.eq(true))
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn set_admin_approved(&self, user_id: Uuid, approved: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::admin_approved.eq(approved))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = users::table.count().get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}
