//! Best-effort email notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Every send
//! opens a fresh connection, is bounded by [`SEND_TIMEOUT`], and reports a
//! [`Delivery`] instead of an error: the stored record is the source of truth
//! and a lost email never fails the request that triggered it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::{EmailConfig, SmtpSecurity};
use crate::models::{Contact, Quote, Ticket, User};

/// Upper bound on a single delivery, connection included.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Business phone number printed in customer-facing emails.
const BUSINESS_PHONE: &str = "+352 661 315 657";

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmail<'a> {
    full_name: &'a str,
    customer_id: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact_notification.html")]
struct ContactNotificationEmail<'a> {
    contact_id: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    service: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact_confirmation.html")]
struct ContactConfirmationEmail<'a> {
    name: &'a str,
    phone: &'a str,
}

#[derive(Template)]
#[template(path = "email/quote_notification.html")]
struct QuoteNotificationEmail<'a> {
    quote_id: &'a str,
    service: &'a str,
    location: &'a str,
    preferred_date: &'a str,
    phone: &'a str,
    email: &'a str,
    description: &'a str,
}

#[derive(Template)]
#[template(path = "email/ticket_notification.html")]
struct TicketNotificationEmail<'a> {
    ticket_id: &'a str,
    full_name: &'a str,
    customer_id: &'a str,
    priority: String,
    subject: &'a str,
    description: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Delivery did not finish within [`SEND_TIMEOUT`].
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Rejected by a test mailer.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Body encoding of an outgoing email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Html,
    Plain,
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub format: BodyFormat,
}

/// Outcome of a best-effort send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Email is not configured for this process.
    Skipped,
    /// Delivery failed; the reason has already been logged.
    Failed(String),
}

impl Delivery {
    /// Whether the message was handed to the mail server.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Boxed future returned by [`Mailer::deliver`].
pub type MailFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EmailError>> + Send + 'a>>;

/// Transport that hands a rendered email to a mail server.
pub trait Mailer: Send + Sync {
    fn deliver(&self, email: OutgoingEmail) -> MailFuture<'_>;
}

/// SMTP mailer. Opens, authenticates and closes a connection per message.
#[derive(Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, SmtpError> {
        let credentials = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.expose_secret().to_string(),
        );

        let builder = match self.config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            }
        };

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SEND_TIMEOUT))
            .build())
    }

    fn message(&self, email: OutgoingEmail) -> Result<Message, EmailError> {
        let from = self
            .config
            .from_address
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(self.config.from_address.clone()))?;
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?;

        let part = match email.format {
            BodyFormat::Html => SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(email.body),
            BodyFormat::Plain => SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(email.body),
        };

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .singlepart(part)?)
    }
}

impl Mailer for SmtpMailer {
    fn deliver(&self, email: OutgoingEmail) -> MailFuture<'_> {
        Box::pin(async move {
            let message = self.message(email)?;
            // Dropped on every exit path, closing the connection.
            let transport = self.transport()?;
            transport.send(message).await?;
            Ok(())
        })
    }
}

/// Mailer that keeps every message in memory.
///
/// Used by tests to assert on notifications; can be told to reject everything.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    reject: bool,
}

impl RecordingMailer {
    /// A mailer whose every delivery fails (nothing is recorded).
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            reject: true,
        }
    }

    /// Messages delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Mailer for RecordingMailer {
    fn deliver(&self, email: OutgoingEmail) -> MailFuture<'_> {
        Box::pin(async move {
            if self.reject {
                return Err(EmailError::Rejected(email.to));
            }
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(email);
            Ok(())
        })
    }
}

/// Email service for transactional notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: Option<Arc<dyn Mailer>>,
    business_address: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("enabled", &self.mailer.is_some())
            .field("business_address", &self.business_address)
            .finish()
    }
}

impl EmailService {
    /// Create a service that delivers through `mailer`.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, business_address: impl Into<String>) -> Self {
        Self {
            mailer: Some(mailer),
            business_address: business_address.into(),
        }
    }

    /// A service that skips every send.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            business_address: String::new(),
        }
    }

    /// SMTP-backed service when configured, disabled otherwise.
    #[must_use]
    pub fn from_config(config: Option<&EmailConfig>) -> Self {
        match config {
            Some(config) => Self::new(
                Arc::new(SmtpMailer::new(config.clone())),
                config.business_address.clone(),
            ),
            None => {
                tracing::warn!("SMTP_SERVER not set; email notifications are disabled");
                Self::disabled()
            }
        }
    }

    /// Welcome a newly registered customer.
    pub async fn send_welcome(&self, user: &User) -> Delivery {
        let body = WelcomeEmail {
            full_name: &user.full_name,
            customer_id: user.customer_id.as_str(),
        }
        .render();

        self.send_rendered(user.email.as_str(), "Welcome to Sparksonic", body)
            .await
    }

    /// Tell the business about a contact form submission.
    pub async fn notify_contact(&self, contact: &Contact) -> Delivery {
        let body = ContactNotificationEmail {
            contact_id: contact.contact_id.as_str(),
            name: &contact.name,
            email: contact.email.as_str(),
            phone: contact.phone.as_deref().unwrap_or("Not provided"),
            service: contact.service.as_deref().unwrap_or("General Inquiry"),
            message: &contact.message,
        }
        .render();

        let subject = format!("New Contact: {}", contact.name);
        self.send_rendered(&self.business_address, &subject, body)
            .await
    }

    /// Confirm receipt to the person who used the contact form.
    pub async fn confirm_contact(&self, contact: &Contact) -> Delivery {
        let body = ContactConfirmationEmail {
            name: &contact.name,
            phone: BUSINESS_PHONE,
        }
        .render();

        self.send_rendered(
            contact.email.as_str(),
            "Thank you for contacting Sparksonic",
            body,
        )
        .await
    }

    /// Tell the business about a quote request.
    pub async fn notify_quote(&self, quote: &Quote) -> Delivery {
        let body = QuoteNotificationEmail {
            quote_id: quote.quote_id.as_str(),
            service: &quote.service,
            location: &quote.location,
            preferred_date: quote.preferred_date.as_deref().unwrap_or("Not specified"),
            phone: &quote.phone,
            email: quote.email.as_str(),
            description: &quote.description,
        }
        .render();

        let subject = format!("New Quote Request: {}", quote.quote_id);
        self.send_rendered(&self.business_address, &subject, body)
            .await
    }

    /// Tell the business about a new support ticket.
    pub async fn notify_ticket(&self, ticket: &Ticket, owner: &User) -> Delivery {
        let body = TicketNotificationEmail {
            ticket_id: ticket.ticket_id.as_str(),
            full_name: &owner.full_name,
            customer_id: owner.customer_id.as_str(),
            priority: ticket.priority.to_string(),
            subject: &ticket.subject,
            description: &ticket.description,
        }
        .render();

        let subject = format!("New Ticket: {}", ticket.ticket_id);
        self.send_rendered(&self.business_address, &subject, body)
            .await
    }

    async fn send_rendered(
        &self,
        to: &str,
        subject: &str,
        body: Result<String, askama::Error>,
    ) -> Delivery {
        match body {
            Ok(body) => {
                self.send(OutgoingEmail {
                    to: to.to_owned(),
                    subject: subject.to_owned(),
                    body,
                    format: BodyFormat::Html,
                })
                .await
            }
            Err(e) => failed(to, subject, &EmailError::Template(e)),
        }
    }

    /// Deliver `email`, bounded by [`SEND_TIMEOUT`].
    ///
    /// Never fails: errors are logged and returned as [`Delivery::Failed`].
    pub async fn send(&self, email: OutgoingEmail) -> Delivery {
        let Some(mailer) = &self.mailer else {
            tracing::debug!(to = %email.to, subject = %email.subject, "Email disabled; skipping");
            return Delivery::Skipped;
        };

        let to = email.to.clone();
        let subject = email.subject.clone();

        let result = match tokio::time::timeout(SEND_TIMEOUT, mailer.deliver(email)).await {
            Ok(result) => result,
            Err(_) => Err(EmailError::Timeout(SEND_TIMEOUT)),
        };

        match result {
            Ok(()) => {
                tracing::info!(to = %to, subject = %subject, "Email sent successfully");
                Delivery::Sent
            }
            Err(e) => failed(&to, &subject, &e),
        }
    }
}

fn failed(to: &str, subject: &str, error: &EmailError) -> Delivery {
    tracing::warn!(to = %to, subject = %subject, error = %error, "Email delivery failed");
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some("email".to_owned()),
        message: Some(format!("delivery failed: {subject}")),
        level: sentry::Level::Warning,
        ..Default::default()
    });
    Delivery::Failed(error.to_string())
}
