use std::sync::Arc;
use std::time::Duration;

use lettre::{
    message::{header::ContentType, Mailbox, Mailboxes, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, Message, SmtpTransport, Transport,
};
use tracing::{debug, info, warn};

use crate::config::MailerConfig;
use crate::error::MailError;
use crate::outcome::SendOutcome;

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(20);
pub const STARTTLS_PORT: u16 = 587;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Plaintext EHLO, then a required STARTTLS upgrade and a second EHLO.
    StartTls,
    Plain,
}

impl TransportSecurity {
    pub fn for_port(port: u16) -> Self {
        if port == STARTTLS_PORT {
            TransportSecurity::StartTls
        } else {
            TransportSecurity::Plain
        }
    }
}

/// A single outgoing message, built per send and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub to: String,
    pub cc: Option<String>,
    pub html_body: String,
    pub text_body: String,
}

impl Email {
    /// A missing or empty `text_body` is derived from the HTML with [`text_fallback`].
    pub fn new(
        subject: impl Into<String>,
        to: impl Into<String>,
        html_body: impl Into<String>,
        text_body: Option<String>,
        cc: Option<String>,
    ) -> Self {
        let html_body = html_body.into();
        let text_body = text_body
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| text_fallback(&html_body));

        Email {
            subject: subject.into(),
            to: to.into(),
            cc: cc.filter(|cc| !cc.trim().is_empty()),
            html_body,
            text_body,
        }
    }
}

/// Turns `<br>` and `<br/>` into newlines. Any other markup is left as is.
pub fn text_fallback(html: &str) -> String {
    html.replace("<br>", "\n").replace("<br/>", "\n")
}

/// Parses a header-style, comma-separated address list; an empty list is an error.
fn address_list(list: &str) -> Result<Mailboxes, MailError> {
    if list.trim().is_empty() {
        return Err(MailError::NoRecipient);
    }
    let mailboxes: Mailboxes = list.parse()?;
    if mailboxes.iter().next().is_none() {
        return Err(MailError::NoRecipient);
    }
    Ok(mailboxes)
}

#[derive(Debug, Clone)]
pub struct Mailer {
    config: Arc<MailerConfig>,
    security: TransportSecurity,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Self {
        let security = TransportSecurity::for_port(config.smtp_port);
        Mailer {
            config: Arc::new(config),
            security,
        }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    pub fn security(&self) -> TransportSecurity {
        self.security
    }

    #[cfg(test)]
    pub(crate) fn with_security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    /// Sends one multipart (text + HTML) message over a fresh SMTP session.
    ///
    /// Blocks for at most [`SMTP_TIMEOUT`] per network operation. Every failure,
    /// from a bad address to a refused login, comes back as [`SendOutcome::Failed`].
    pub fn send_email(
        &self,
        subject: &str,
        to: &str,
        html_body: &str,
        text_body: Option<&str>,
        cc: Option<&str>,
    ) -> SendOutcome {
        let email = Email::new(
            subject,
            to,
            html_body,
            text_body.map(str::to_string),
            cc.map(str::to_string),
        );
        self.send(&email)
    }

    pub fn send(&self, email: &Email) -> SendOutcome {
        match self.try_send(email) {
            Ok(()) => {
                info!(to = %email.to, subject = %email.subject, "email sent");
                SendOutcome::Sent
            }
            Err(e) => {
                warn!(to = %email.to, subject = %email.subject, error = %e, "could not send email");
                SendOutcome::failed(e)
            }
        }
    }

    fn try_send(&self, email: &Email) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let mailer = self.transport()?;
        // No pool: the session is closed once send returns, on success or error.
        mailer.send(&message)?;
        Ok(())
    }

    fn build_message(&self, email: &Email) -> Result<Message, MailError> {
        let from_email: Address = self.config.from_email.parse()?;
        let from_name = Some(self.config.from_name.clone()).filter(|name| !name.is_empty());

        let mut builder = Message::builder()
            .from(Mailbox::new(from_name, from_email))
            .subject(email.subject.as_str());

        for to in address_list(&email.to)? {
            builder = builder.to(to);
        }

        if let Some(cc) = &email.cc {
            for cc in address_list(cc)? {
                builder = builder.cc(cc);
            }
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html_body.clone()),
                ),
        )?;

        Ok(message)
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let config = &self.config;
        let builder = match self.security {
            TransportSecurity::StartTls => SmtpTransport::starttls_relay(&config.smtp_host)?,
            TransportSecurity::Plain => SmtpTransport::builder_dangerous(config.smtp_host.as_str()),
        };

        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(SMTP_TIMEOUT));

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        debug!(
            host = %config.smtp_host,
            port = config.smtp_port,
            security = ?self.security,
            authenticated = config.has_credentials(),
            "opening smtp session"
        );

        Ok(builder.build())
    }
}

#[cfg(feature = "tokio")]
impl Mailer {
    /// [`Mailer::send`] on the blocking thread pool.
    pub async fn send_async(&self, email: Email) -> SendOutcome {
        let mailer = self.clone();
        match tokio::task::spawn_blocking(move || mailer.send(&email)).await {
            Ok(outcome) => outcome,
            Err(e) => SendOutcome::failed(MailError::Task(e.to_string())),
        }
    }

    pub async fn send_email_async(
        &self,
        subject: &str,
        to: &str,
        html_body: &str,
        text_body: Option<&str>,
        cc: Option<&str>,
    ) -> SendOutcome {
        let email = Email::new(
            subject,
            to,
            html_body,
            text_body.map(str::to_string),
            cc.map(str::to_string),
        );
        self.send_async(email).await
    }
}
