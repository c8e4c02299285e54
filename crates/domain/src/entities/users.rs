use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub admin_approved: bool,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserEntity {
    /// A reset token only counts while its expiry timestamp is in the future.
    pub fn reset_token_matches(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.reset_token.as_deref() == Some(token)
            && self.reset_token_expires.is_some_and(|expires| now < expires)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub admin_approved: bool,
}
