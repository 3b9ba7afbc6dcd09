use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{info, warn};
use thiserror::Error;

use crate::config::MailSettings;

#[derive(Debug, Error)]
pub(crate) enum MailError {
    #[error("mail is not configured (set mail.smtp_host and mail.from in config.json)")]
    NotConfigured,

    #[error("no recipient given")]
    EmptyRecipient,

    #[error("invalid address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Something that can deliver a plain-text report to one recipient.
pub(crate) trait ReportMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

pub(crate) struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    pub(crate) fn new(settings: &MailSettings) -> Result<Self, MailError> {
        if !settings.is_configured() {
            return Err(MailError::NotConfigured);
        }
        Ok(Self {
            settings: settings.clone(),
        })
    }
}

impl ReportMailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(parse_mailbox(&self.settings.from)?)
            .to(parse_mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let mut builder = SmtpTransport::starttls_relay(self.settings.smtp_host.trim())?
            .port(self.settings.smtp_port);
        if !self.settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.resolved_password(),
            ));
        }

        builder.build().send(&email)?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailError::InvalidAddress {
            address: address.trim().to_string(),
            source,
        })
}

/// Deliver a report once. Failures are logged and handed back for the
/// caller to show; nothing is retried.
pub(crate) fn send_report(
    mailer: &dyn ReportMailer,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<(), MailError> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(MailError::EmptyRecipient);
    }
    match mailer.send(recipient, subject, body) {
        Ok(()) => {
            info!("Report sent to {recipient}");
            Ok(())
        }
        Err(e) => {
            warn!("Report to {recipient} failed: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeMailer {
        sent: RefCell<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl ReportMailer for FakeMailer {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::NotConfigured);
            }
            self.sent
                .borrow_mut()
                .push((to.into(), subject.into(), body.into()));
            Ok(())
        }
    }

    #[test]
    fn test_send_report_delivers_once() {
        let mailer = FakeMailer::default();
        send_report(&mailer, "  me@example.com ", "Expense report", "body").unwrap();
        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "me@example.com");
        assert_eq!(sent[0].2, "body");
    }

    #[test]
    fn test_send_report_rejects_empty_recipient() {
        let mailer = FakeMailer::default();
        let err = send_report(&mailer, "   ", "s", "b").unwrap_err();
        assert!(matches!(err, MailError::EmptyRecipient));
        assert!(mailer.sent.borrow().is_empty());
    }

    #[test]
    fn test_send_report_passes_failure_through() {
        let mailer = FakeMailer {
            fail: true,
            ..Default::default()
        };
        assert!(send_report(&mailer, "me@example.com", "s", "b").is_err());
    }

    #[test]
    fn test_smtp_mailer_requires_configuration() {
        let err = SmtpMailer::new(&MailSettings::default()).err().unwrap();
        assert!(matches!(err, MailError::NotConfigured));
    }

    #[test]
    fn test_invalid_recipient_is_reported_before_connecting() {
        let settings = MailSettings {
            smtp_host: "smtp.invalid".into(),
            from: "me@example.com".into(),
            ..Default::default()
        };
        let mailer = SmtpMailer::new(&settings).unwrap();
        let err = mailer.send("not an address", "s", "b").unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress { .. }));
    }

    #[test]
    fn test_parse_mailbox_with_display_name() {
        let mbox = parse_mailbox("Me <me@example.com>").unwrap();
        assert_eq!(mbox.email.to_string(), "me@example.com");
    }
}
