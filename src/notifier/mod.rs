//! Best-effort email notifications for bed allocation and removal.
//!
//! Dispatch is fire-and-forget: the message is handed to a spawned task and
//! any failure is logged and discarded. Callers invoke this only after their
//! own state change has committed, so a lost mail can never roll back or
//! block a workflow.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

#[derive(Clone)]
pub struct Notifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: String,
    hostel_fee: i64,
}

impl Notifier {
    /// Build a notifier from the optional mail configuration. A missing or
    /// broken configuration yields a disabled notifier, never an error.
    pub fn from_config(mail: Option<&MailConfig>, hostel_fee: i64) -> Self {
        let Some(cfg) = mail else {
            log::info!("Mail not configured, notifications disabled");
            return Self { transport: None, sender: String::new(), hostel_fee };
        };

        match build_transport(cfg) {
            Ok(transport) => {
                log::info!("SMTP notifier ready ({}:{})", cfg.server, cfg.port);
                Self {
                    transport: Some(transport),
                    sender: cfg.sender.clone(),
                    hostel_fee,
                }
            }
            Err(e) => {
                log::warn!("SMTP setup failed, notifications disabled: {e}");
                Self { transport: None, sender: String::new(), hostel_fee }
            }
        }
    }

    /// Disabled notifier, for environments without mail (and for tests).
    pub fn disabled() -> Self {
        Self { transport: None, sender: String::new(), hostel_fee: 0 }
    }

    pub fn notify_allocation(&self, to: &str, name: &str, bed_no: i64) {
        let check_in = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let subject = format!("Hostel Bed Allocated - Bed {bed_no}");
        let body = format!(
            "Hello {name},\n\n\
             Your hostel bed has been successfully allocated!\n\n\
             Bed Number: {bed_no}\n\
             Check-in Date: {check_in}\n\
             Payment Status: Pending\n\n\
             Please complete the payment of {} Rupees to confirm your reservation.\n\n\
             Thank you,\n\
             Hostel Management System\n",
            self.hostel_fee
        );
        self.dispatch(to, subject, body);
    }

    pub fn notify_removal(&self, to: &str, name: &str, bed_no: i64) {
        let subject = format!("Hostel Bed Allotment Removed - Bed {bed_no}");
        let body = format!(
            "Hello {name},\n\n\
             Your hostel bed allotment (Bed {bed_no}) has been removed from the system.\n\n\
             If you have any questions, please contact the hostel administration.\n\n\
             Thank you,\n\
             Hostel Management System\n"
        );
        self.dispatch(to, subject, body);
    }

    fn dispatch(&self, to: &str, subject: String, body: String) {
        let Some(transport) = &self.transport else {
            log::debug!("Notifications disabled, skipping mail to {to}");
            return;
        };

        let from: Mailbox = match self.sender.parse() {
            Ok(mb) => mb,
            Err(e) => {
                log::warn!("Bad sender address {:?}: {e}", self.sender);
                return;
            }
        };
        let to_mb: Mailbox = match to.parse() {
            Ok(mb) => mb,
            Err(e) => {
                log::warn!("Bad recipient address {to:?}: {e}");
                return;
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to_mb)
            .subject(subject)
            .body(body)
        {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Failed to build mail for {to}: {e}");
                return;
            }
        };

        let transport = transport.clone();
        let recipient = to.to_string();
        actix_web::rt::spawn(async move {
            if let Err(e) = transport.send(message).await {
                log::warn!("Email delivery to {recipient} failed: {e}");
            }
        });
    }
}

fn build_transport(
    cfg: &MailConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
    let mut builder =
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.server).port(cfg.port);

    if cfg.use_tls {
        let tls = TlsParameters::new(cfg.server.clone())?;
        builder = builder.tls(Tls::Required(tls));
    }
    if !cfg.username.is_empty() {
        builder = builder.credentials(Credentials::new(
            cfg.username.clone(),
            cfg.password.clone(),
        ));
    }
    Ok(builder.build())
}
