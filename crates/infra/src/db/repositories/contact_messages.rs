use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::contact_messages::{ContactMessageEntity, InsertContactMessageEntity},
    repositories::contact_messages::ContactMessageRepository,
    schema::contact_messages,
};

pub struct ContactMessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ContactMessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ContactMessageRepository for ContactMessagePostgres {
    async fn create(&self, message: InsertContactMessageEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let message_id = insert_into(contact_messages::table)
            .values(&message)
            .returning(contact_messages::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(message_id)
    }

    async fn list(&self) -> Result<Vec<ContactMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = contact_messages::table
            .order(contact_messages::created_at.desc())
            .select(ContactMessageEntity::as_select())
            .load::<ContactMessageEntity>(&mut conn)?;

        Ok(results)
    }

    async fn mark_read(&self, message_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(contact_messages::table)
            .filter(contact_messages::id.eq(message_id))
            .set(contact_messages::is_read.eq(true))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, message_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(contact_messages::table.filter(contact_messages::id.eq(message_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_unread(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = contact_messages::table
            .filter(contact_messages::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}
