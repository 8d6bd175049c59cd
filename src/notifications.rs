//! Lead notifications for the operations inbox and reservation
//! confirmations for customers.
//!
//! Rendering happens before any network activity, so a broken template
//! surfaces as `Err(MailError::Template)` while delivery problems come back
//! as [`SendOutcome::Failed`].

use crate::config::MailerConfig;
use crate::error::MailError;
use crate::mailer::{Email, Mailer};
use crate::outcome::SendOutcome;
use crate::template::{
    field_text, render_template, Fields, LEAD_NOTIFICATION_HTML, LEAD_NOTIFICATION_TEXT,
    RESERVATION_CONFIRMATION_HTML, RESERVATION_CONFIRMATION_TEXT,
};

pub const MISSING_NAME: &str = "Sin nombre";

/// Builds the lead notification addressed to `config.notify_email`.
pub fn lead_notification(config: &MailerConfig, lead: &Fields) -> Result<Email, MailError> {
    let html = render_template(LEAD_NOTIFICATION_HTML, lead)?;
    let text = render_template(LEAD_NOTIFICATION_TEXT, lead)?;
    let subject = format!(
        "Nuevo lead: {}",
        field_text(lead, "nombre").as_deref().unwrap_or(MISSING_NAME)
    );

    Ok(Email::new(
        subject,
        config.notify_email.clone(),
        html,
        Some(text),
        None,
    ))
}

/// Builds the confirmation for the customer in `cliente_correo`, copying the CRM
/// inbox when one is configured. No recipient validation happens here.
pub fn reservation_confirmation(
    config: &MailerConfig,
    reservation: &Fields,
) -> Result<Email, MailError> {
    let html = render_template(RESERVATION_CONFIRMATION_HTML, reservation)?;
    let text = render_template(RESERVATION_CONFIRMATION_TEXT, reservation)?;
    let subject = format!(
        "Reserva recibida: {}",
        field_text(reservation, "tour_nombre")
            .as_deref()
            .unwrap_or(MISSING_NAME)
    );
    let to = field_text(reservation, "cliente_correo").unwrap_or_default();

    Ok(Email::new(
        subject,
        to,
        html,
        Some(text),
        config.crm_notify_email.clone(),
    ))
}

impl Mailer {
    pub fn send_lead_notification(&self, lead: &Fields) -> Result<SendOutcome, MailError> {
        let email = lead_notification(self.config(), lead)?;
        Ok(self.send(&email))
    }

    pub fn send_reservation_confirmation(
        &self,
        reservation: &Fields,
    ) -> Result<SendOutcome, MailError> {
        let email = reservation_confirmation(self.config(), reservation)?;
        Ok(self.send(&email))
    }
}

#[cfg(feature = "tokio")]
impl Mailer {
    pub async fn send_lead_notification_async(
        &self,
        lead: &Fields,
    ) -> Result<SendOutcome, MailError> {
        let email = lead_notification(self.config(), lead)?;
        Ok(self.send_async(email).await)
    }

    pub async fn send_reservation_confirmation_async(
        &self,
        reservation: &Fields,
    ) -> Result<SendOutcome, MailError> {
        let email = reservation_confirmation(self.config(), reservation)?;
        Ok(self.send_async(email).await)
    }
}
