use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::events::EmailEvent;

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, event: &EmailEvent) -> Result<()>;
    fn provider_name(&self) -> &'static str;
}

/// Queues emails for background delivery. Sending is best-effort: provider
/// failures are logged and dropped, and a full queue drops the event rather
/// than block the caller.
#[derive(Clone)]
pub struct EmailNotifier {
    tx: mpsc::Sender<EmailEvent>,
}

impl EmailNotifier {
    pub fn new(providers: Vec<Arc<dyn MailProvider>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<EmailEvent>(256);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for provider in &providers {
                    if let Err(error) = provider.send(&event).await {
                        warn!(
                            provider = provider.provider_name(),
                            recipient = event.recipient(),
                            error = %error,
                            "Email provider failed"
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    pub fn try_notify(&self, event: EmailEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Email queue full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Email queue closed; dropping event");
            }
        }
    }
}
