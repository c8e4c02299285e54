use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::contact_messages::{ContactMessageEntity, InsertContactMessageEntity};

#[async_trait]
#[automock]
pub trait ContactMessageRepository {
    async fn create(&self, message: InsertContactMessageEntity) -> Result<Uuid>;

    async fn list(&self) -> Result<Vec<ContactMessageEntity>>;

    async fn mark_read(&self, message_id: Uuid) -> Result<()>;

    async fn delete(&self, message_id: Uuid) -> Result<()>;

    async fn count_unread(&self) -> Result<i64>;
}
