use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::contact_messages;

#[derive(Debug, Clone, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = contact_messages)]
pub struct ContactMessageEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contact_messages)]
pub struct InsertContactMessageEntity {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
