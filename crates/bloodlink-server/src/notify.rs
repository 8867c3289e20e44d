//! Email notifications and the donor matching dispatcher.
//!
//! Dispatch is fire-and-forget: the request handler spawns
//! [`spawn_match_notifications`] after the request row is committed and
//! returns immediately. Each donor's email has its own error boundary: one
//! failed send is logged and recorded, and the rest of the pool is still
//! notified. Nothing here retries or deduplicates.

use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{error, info, warn};

use bloodlink_core::compat::compatible_donor_groups;
use bloodlink_core::db::DbError;
use bloodlink_core::models::{BloodRequest, NotificationStatus};

use crate::{config::Config, state::AppState};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid recipient address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Async SMTP mailer. Built without a transport when credentials are not
/// configured; sends are then skipped with a warning instead of failing, so
/// a dev instance works without an SMTP account.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        let from = config
            .email_from
            .parse()
            .expect("EMAIL_FROM is not a valid mailbox");

        let transport = match (&config.smtp_user, &config.smtp_password) {
            (Some(user), Some(password)) => Some(
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .expect("SMTP_HOST is not a valid relay")
                    .port(config.smtp_port)
                    .credentials(Credentials::new(user.clone(), password.clone()))
                    .build(),
            ),
            _ => None,
        };

        Self { transport, from }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Send one message. `Ok(false)` means the send was skipped because no
    /// transport is configured.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<bool, NotifyError> {
        let Some(transport) = &self.transport else {
            warn!("Email credentials not configured, skipping email to {to}");
            return Ok(false);
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())?;

        transport.send(message).await?;
        Ok(true)
    }
}

/// Subject and body for a donor-match notification.
pub fn donor_match_email(donor_name: &str, request: &BloodRequest) -> (String, String) {
    let subject = "Blood Donation Request Match".to_string();
    let body = format!(
        "<h2>Hello {donor_name},</h2>\
         <p>There is a blood donation request that matches your blood group!</p>\
         <h3>Request Details:</h3>\
         <ul>\
         <li><strong>Patient:</strong> {}</li>\
         <li><strong>Blood Group:</strong> {}</li>\
         <li><strong>Units Needed:</strong> {}</li>\
         <li><strong>Hospital:</strong> {}</li>\
         <li><strong>Contact:</strong> {}</li>\
         <li><strong>Date Needed:</strong> {}</li>\
         </ul>\
         <p>Your donation can save a life. Please contact the hospital if you're available to donate.</p>\
         <p><em>BloodLink Team</em></p>",
        request.patient_name,
        request.blood_group,
        request.units,
        request.hospital,
        request.phone,
        request.needed_date,
    );
    (subject, body)
}

/// Subject and body for the registration welcome email.
pub fn welcome_email(name: &str) -> (String, String) {
    let subject = "Welcome to BloodLink!".to_string();
    let body = format!(
        "<h2>Welcome {name}!</h2>\
         <p>Thank you for registering as a blood donor with BloodLink.</p>\
         <p>We'll notify you when there's a blood request matching your blood group. \
         You can update your availability status anytime through your profile.</p>\
         <p><strong>Remember:</strong> You can donate blood every 90 days.</p>\
         <p><em>BloodLink Team</em></p>"
    );
    (subject, body)
}

/// Launch the matching dispatcher for a freshly persisted request. The
/// caller's response does not wait on it.
pub fn spawn_match_notifications(state: Arc<AppState>, request: BloodRequest) {
    tokio::spawn(async move {
        match notify_compatible_donors(&state, &request).await {
            Ok(count) => {
                info!(
                    "Notified {count} compatible donors for request ID {}",
                    request.id
                );
            }
            Err(e) => error!("Donor matching failed for request ID {}: {e}", request.id),
        }
    });
}

/// Send the welcome email in the background after donor registration.
pub fn spawn_welcome_email(state: Arc<AppState>, email: String, fullname: String) {
    tokio::spawn(async move {
        let (subject, body) = welcome_email(&fullname);
        if let Err(e) = state.mailer.send(&email, &subject, &body).await {
            error!("Welcome email failed for {email}: {e}");
        }
    });
}

/// The matching dispatcher: look up available donors compatible with the
/// request's blood group and attempt one notification per donor. Returns
/// the number of donors attempted.
pub async fn notify_compatible_donors(
    state: &AppState,
    request: &BloodRequest,
) -> Result<usize, DbError> {
    let groups = compatible_donor_groups(request.blood_group);
    let donors = state.db().available_donors_in_groups(groups)?;

    let mut notified = 0;
    for donor in donors {
        let (subject, body) = donor_match_email(&donor.fullname, request);

        let status = match state.mailer.send(&donor.email, &subject, &body).await {
            Ok(true) => NotificationStatus::Sent,
            Ok(false) => NotificationStatus::Pending,
            Err(e) => {
                error!("Notification failed for {}: {e}", donor.email);
                NotificationStatus::Failed
            }
        };

        if let Err(e) = state
            .db()
            .record_notification(&donor.email, &subject, &body, status)
        {
            error!("Failed to record notification for {}: {e}", donor.email);
        }
        notified += 1;
    }

    Ok(notified)
}
