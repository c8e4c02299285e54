use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use crate::{events::EmailEvent, notifier::MailProvider};

pub struct SmtpMailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailProvider {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from: from.parse()?,
        })
    }
}

#[async_trait]
impl MailProvider for SmtpMailProvider {
    async fn send(&self, event: &EmailEvent) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(event.recipient().parse()?)
            .subject(event.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(event.body())?;

        self.transport.send(message).await?;

        info!(recipient = event.recipient(), "email sent");

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "smtp"
    }
}
