use serde::{Deserialize, Serialize};

/// Body of `POST /rest/login` on the n8n API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body posted to the one-time secret note service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretNoteRequest {
    pub message: String,
}

impl SecretNoteRequest {
    /// Build the note body carrying the owner's login.
    #[must_use]
    pub fn for_credentials(email: &str, password: &str) -> Self {
        Self {
            message: format!("benutzername: {email}\nKennwort: {password}"),
        }
    }
}

/// A single credential link inside a [`CredentialWebhookPayload`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialLink {
    pub credential_url: String,
}

/// Payload delivered to the credential webhook after an owner is created.
///
/// Field names are fixed by the receiving service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialWebhookPayload {
    pub first_name: String,
    /// Last name.
    pub name: String,
    pub mail: String,
    pub n8n_instanceurl: String,
    pub credentials: Vec<CredentialLink>,
}

impl CredentialWebhookPayload {
    /// Build a payload, normalising the instance URL to end in exactly one `/`.
    #[must_use]
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        instance_url: &str,
        credential_url: &str,
    ) -> Self {
        Self {
            first_name: first_name.to_string(),
            name: last_name.to_string(),
            mail: email.to_string(),
            n8n_instanceurl: format!("{}/", instance_url.trim_end_matches('/')),
            credentials: vec![CredentialLink {
                credential_url: credential_url.to_string(),
            }],
        }
    }
}

/// One row of `docker compose ps --format json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServiceStatus {
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "Name", default)]
    pub container: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Health", default)]
    pub health: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

impl ServiceStatus {
    /// Running, and either healthy or without a healthcheck.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.state == "running" && (self.health.is_empty() || self.health == "healthy")
    }
}

/// Output of `n8n-deploy status --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackStatus {
    pub services: Vec<ServiceStatus>,
    pub healthy: bool,
}
