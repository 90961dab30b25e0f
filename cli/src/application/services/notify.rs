//! Application service: deliver new owner credentials.
//!
//! A one-time secret note is created with the login, and its link is sent to
//! the credential webhook. Nothing here can fail provisioning: every problem
//! becomes a warning.

use n8n_deploy_common::{CredentialWebhookPayload, SecretNoteRequest};
use serde::Serialize;

use crate::application::ports::{CredentialChannel, ProgressReporter};
use crate::domain::OwnerCredentials;
use crate::domain::notify::{extract_credential_link, strip_api_segment};

/// Endpoints and secrets for credential delivery. All optional.
#[derive(Debug, Clone, Default)]
pub struct NotifySettings {
    /// Secret note service endpoint.
    pub note_url: Option<String>,
    pub webhook_url: Option<String>,
    pub access_key: Option<String>,
    pub application: Option<String>,
    /// Public URL of the instance, sent to the webhook.
    pub instance_url: String,
}

impl NotifySettings {
    /// Whether there is anything to do.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.note_url.is_some()
    }
}

/// What was delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    /// Shareable secret note link, when the note was created.
    pub credential_link: Option<String>,
    /// Whether the webhook accepted the payload.
    pub webhook_delivered: bool,
}

/// Create the secret note and forward its link to the webhook.
pub async fn notify_credentials(
    channel: &impl CredentialChannel,
    settings: &NotifySettings,
    creds: &OwnerCredentials,
    reporter: &impl ProgressReporter,
) -> NotifyReport {
    let mut report = NotifyReport::default();
    let Some(note_url) = settings.note_url.as_deref() else {
        return report;
    };

    reporter.step("creating secret note...");
    let endpoint = strip_api_segment(note_url);
    let note = SecretNoteRequest::for_credentials(&creds.profile.email, &creds.password);
    let link = match channel.create_secret_note(&endpoint, &note).await {
        Ok(reply) if reply.status == 200 => extract_credential_link(&reply.body, &endpoint),
        Ok(reply) => {
            reporter.warn(&format!("secret note service answered {}", reply.status));
            return report;
        }
        Err(e) => {
            reporter.warn(&format!("secret note service unreachable: {e:#}"));
            return report;
        }
    };
    reporter.success("secret note created");
    report.credential_link = Some(link.clone());

    let Some(webhook_url) = settings.webhook_url.as_deref() else {
        return report;
    };
    let payload = CredentialWebhookPayload::new(
        &creds.profile.first_name,
        &creds.profile.last_name,
        &creds.profile.email,
        &settings.instance_url,
        &link,
    );
    reporter.step("sending credential link...");
    match channel
        .post_webhook(
            webhook_url,
            settings.access_key.as_deref().unwrap_or_default(),
            settings.application.as_deref().unwrap_or_default(),
            &payload,
        )
        .await
    {
        Ok(reply) if matches!(reply.status, 200 | 201) => {
            report.webhook_delivered = true;
            reporter.success("credential link delivered");
        }
        Ok(reply) => reporter.warn(&format!("credential webhook answered {}", reply.status)),
        Err(e) => reporter.warn(&format!("credential webhook unreachable: {e:#}")),
    }
    report
}
