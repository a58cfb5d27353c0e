//! Email notifications for new listings and failed runs.

use crate::config::MailConfig;
use crate::models::Listing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info};

pub const ERROR_SUBJECT: &str = "SSSB Notification ran into an error";

/// Delivers a subject and body to the configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// SMTP notifier over an implicit-TLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    delay: Duration,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address {:?}", config.sender))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address {:?}", config.recipient))?;

        let credentials = Credentials::new(config.sender.clone(), config.app_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .with_context(|| format!("Failed to set up SMTP relay {}", config.smtp_host))?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from,
            to,
            delay: config.delay,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email {:?}", subject))?;
        info!("📧 Sent: {}", subject);

        // Stay friendly with the mail provider's rate limits
        debug!("Sleeping {:?} after email", self.delay);
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Subject and body announcing one listing.
pub fn listing_email(listing: &Listing) -> (String, String) {
    let subject = format!(
        "[{}] {} @ {}",
        listing.apartment_number, listing.apartment_type, listing.adress
    );
    let body = format!(
        "Typ: {}\n\
         Adress: {}\n\
         Lägenhets nr: {}\n\
         Område: {}\n\
         Våning: {}\n\
         Yta: {} m²\n\
         Hyra: {} kr\n\
         Inflytt: {}\n\
         URL: {}",
        listing.apartment_type,
        listing.adress,
        listing.apartment_number,
        listing.region,
        listing.floor,
        listing.square_meters,
        listing.rent,
        listing.move_in_date,
        listing.url,
    );
    (subject, body)
}

/// Subject and body reporting a failed cycle, with the full error chain.
pub fn error_email(error: &anyhow::Error, started_at: DateTime<Utc>) -> (String, String) {
    let body = format!(
        "Run started {}\n\n{:#}",
        started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        error
    );
    (ERROR_SUBJECT.to_string(), body)
}
