use std::sync::Arc;

use anyhow::Result;
use domain::{
    entities::contact_messages::ContactMessageEntity,
    repositories::contact_messages::ContactMessageRepository,
};
use tracing::info;
use uuid::Uuid;

pub struct MessageAdminUseCase<M>
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    message_repo: Arc<M>,
}

impl<M> MessageAdminUseCase<M>
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    pub fn new(message_repo: Arc<M>) -> Self {
        Self { message_repo }
    }

    pub async fn list(&self) -> Result<Vec<ContactMessageEntity>> {
        self.message_repo.list().await
    }

    pub async fn mark_read(&self, message_id: Uuid) -> Result<()> {
        self.message_repo.mark_read(message_id).await?;
        info!(%message_id, "admin messages: marked read");
        Ok(())
    }

    pub async fn delete(&self, message_id: Uuid) -> Result<()> {
        self.message_repo.delete(message_id).await?;
        info!(%message_id, "admin messages: deleted");
        Ok(())
    }
}
