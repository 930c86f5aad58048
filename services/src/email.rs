//! Outbound email, sent over SMTP with the `lettre` crate.
//!
//! Every message carries both a plain text and an HTML part. When no SMTP
//! username is configured the service logs the message it would have sent
//! and reports success, so development setups work without a mail account.

use common::config;
use lettre::{
    message::{header, Message, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, AsyncSmtpTransport},
    AsyncTransport, Tokio1Executor,
};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use once_cell::sync::Lazy;

static SMTP_CLIENT: Lazy<AsyncSmtpTransport<Tokio1Executor>> = Lazy::new(|| {
    let relay = config::smtp_relay();
    let username = config::smtp_username();
    let password = config::smtp_password();

    let tls_parameters =
        TlsParameters::new(relay.clone()).expect("Failed to create TLS parameters");

    AsyncSmtpTransport::<Tokio1Executor>::relay(&relay)
        .expect("Failed to create SMTP transport")
        .port(587)
        .tls(Tls::Required(tls_parameters))
        .credentials(Credentials::new(username, password))
        .build()
});

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Service for composing and sending portal email.
pub struct EmailService;

impl EmailService {
    /// Tells a reviewer their submission has been graded.
    pub async fn send_grade_notification(
        to_email: &str,
        name: &str,
        module_title: &str,
        letter_grade: &str,
        percentage: f64,
        feedback: Option<&str>,
    ) -> Result<(), EmailError> {
        let subject = format!("Your grade for \"{module_title}\" is ready");
        let grades_link = format!("{}/submissions", config::app_url());

        let mut plain = format!(
            "Hi {name},\n\n\
            Your submission for \"{module_title}\" has been graded.\n\n\
            Grade: {letter_grade} ({percentage:.1}%)\n"
        );
        if let Some(feedback) = feedback {
            plain.push_str(&format!("\nFeedback:\n{feedback}\n"));
        }
        plain.push_str(&format!("\nView the full breakdown: {grades_link}\n"));

        let mut html_body = format!(
            "<h2>Grade ready</h2>\
            <p>Hi {name},</p>\
            <p>Your submission for <strong>{module_title}</strong> has been graded.</p>\
            <p style=\"font-size: 1.4em;\">{letter_grade} ({percentage:.1}%)</p>"
        );
        if let Some(feedback) = feedback {
            html_body.push_str(&format!("<p><em>{feedback}</em></p>"));
        }
        html_body.push_str(&format!(
            "<p><a class=\"button\" href=\"{grades_link}\">View breakdown</a></p>"
        ));

        Self::send(to_email, &subject, &plain, &wrap_html(&html_body)).await
    }

    /// Tells a reviewer the module's course material changed.
    pub async fn send_material_update(
        to_email: &str,
        name: &str,
        module_title: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("Course material updated for \"{module_title}\"");
        let module_link = format!("{}/modules", config::app_url());

        let plain = format!(
            "Hi {name},\n\n\
            The course material for \"{module_title}\" has been updated.\n\
            Please review the new version before submitting.\n\n\
            {module_link}\n"
        );
        let html_body = format!(
            "<h2>Material updated</h2>\
            <p>Hi {name},</p>\
            <p>The course material for <strong>{module_title}</strong> has been updated. \
            Please review the new version before submitting.</p>\
            <p><a class=\"button\" href=\"{module_link}\">Open the module</a></p>"
        );

        Self::send(to_email, &subject, &plain, &wrap_html(&html_body)).await
    }

    /// Weekly digest of a reviewer's outstanding items.
    pub async fn send_reminder(
        to_email: &str,
        name: &str,
        items: &[String],
    ) -> Result<(), EmailError> {
        let subject = "Your weekly review reminder";
        let portal_link = config::app_url();

        let mut plain = format!("Hi {name},\n\nA few things are waiting on you:\n\n");
        for item in items {
            plain.push_str(&format!("  - {item}\n"));
        }
        plain.push_str(&format!("\n{portal_link}\n"));

        let list: String = items
            .iter()
            .map(|item| format!("<li>{item}</li>"))
            .collect();
        let html_body = format!(
            "<h2>Weekly reminder</h2>\
            <p>Hi {name},</p>\
            <p>A few things are waiting on you:</p>\
            <ul>{list}</ul>\
            <p><a class=\"button\" href=\"{portal_link}\">Open the portal</a></p>"
        );

        Self::send(to_email, subject, &plain, &wrap_html(&html_body)).await
    }

    /// Tells an admin a new submission arrived.
    pub async fn send_submission_received(
        to_email: &str,
        module_title: &str,
        submitter_email: &str,
        github_link: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("New submission for \"{module_title}\"");

        let plain = format!(
            "{submitter_email} submitted to \"{module_title}\".\n\n\
            Repository: {github_link}\n"
        );
        let html_body = format!(
            "<h2>New submission</h2>\
            <p><strong>{submitter_email}</strong> submitted to <strong>{module_title}</strong>.</p>\
            <p>Repository: <a href=\"{github_link}\">{github_link}</a></p>"
        );

        Self::send(to_email, &subject, &plain, &wrap_html(&html_body)).await
    }

    async fn send(
        to_email: &str,
        subject: &str,
        plain: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        let username = config::smtp_username();
        if username.is_empty() {
            tracing::info!(to = %to_email, %subject, "SMTP not configured, skipping email");
            return Ok(());
        }

        let from = format!("{} <{}>", config::email_from_name(), username);
        let email = Message::builder()
            .from(from.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(plain.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )?;

        SMTP_CLIENT.send(email).await?;
        Ok(())
    }
}

fn wrap_html(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .button {{
            display: inline-block;
            padding: 10px 20px;
            background-color: #007bff;
            color: #ffffff !important;
            text-decoration: none;
            border-radius: 5px;
            margin: 12px 0;
            font-weight: bold;
        }}
    </style>
</head>
<body>
    <div class="container">
        {body}
    </div>
</body>
</html>"#
    )
}
