use std::sync::Arc;

use anyhow::Result;
use domain::{
    entities::contact_messages::InsertContactMessageEntity,
    repositories::contact_messages::ContactMessageRepository,
};
use notifications::{events::EmailEvent, notifier::EmailNotifier};
use tracing::info;
use uuid::Uuid;

pub struct ContactUseCase<M>
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    message_repo: Arc<M>,
    notifier: EmailNotifier,
    contact_inbox: String,
}

impl<M> ContactUseCase<M>
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    pub fn new(message_repo: Arc<M>, notifier: EmailNotifier, contact_inbox: String) -> Self {
        Self {
            message_repo,
            notifier,
            contact_inbox,
        }
    }

    /// Stores the message and alerts the contact inbox. The notification is
    /// best-effort and never fails the submission.
    pub async fn submit(&self, message: InsertContactMessageEntity) -> Result<Uuid> {
        let message_id = self.message_repo.create(message.clone()).await?;

        info!(%message_id, sender = %message.email, "contact: message received");

        self.notifier.try_notify(EmailEvent::ContactMessageReceived {
            recipient: self.contact_inbox.clone(),
            sender_name: message.name,
            sender_email: message.email,
            subject: message.subject,
            body: message.message,
        });

        Ok(message_id)
    }
}
