//! Command implementations

pub mod config;
pub mod doctor;
pub mod down;
pub mod init;
pub mod login;
pub mod logs;
pub mod provision;
pub mod proxy;
pub mod status;
pub mod up;
pub mod version;

use anyhow::Result;
use clap::Args;

use crate::domain::owner::{
    DEFAULT_OWNER_EMAIL, DEFAULT_OWNER_FIRST_NAME, DEFAULT_OWNER_LAST_NAME,
};
use crate::domain::{ComposeProject, OwnerProfile};

/// Owner account identity, shared by `provision`, `login` and `proxy`.
#[derive(Args, Clone, Debug)]
pub struct OwnerArgs {
    /// Owner email address
    #[arg(long, env = "N8N_DEFAULT_EMAIL", default_value = DEFAULT_OWNER_EMAIL)]
    pub email: String,

    /// Owner password (falls back to a built-in value, or a generated one for --method database)
    #[arg(long, env = "N8N_DEFAULT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Owner first name
    #[arg(long, env = "N8N_DEFAULT_FIRST_NAME", default_value = DEFAULT_OWNER_FIRST_NAME)]
    pub first_name: String,

    /// Owner last name
    #[arg(long, env = "N8N_DEFAULT_LAST_NAME", default_value = DEFAULT_OWNER_LAST_NAME)]
    pub last_name: String,
}

impl OwnerArgs {
    /// Validated owner profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or a name is blank.
    pub fn profile(&self) -> Result<OwnerProfile> {
        Ok(OwnerProfile::new(&self.email, &self.first_name, &self.last_name)?)
    }
}

/// Check docker, compose and every config file, for `up`.
pub(crate) async fn full_project(
    app: &crate::app::AppContext,
    config: &crate::domain::DeployConfig,
) -> Result<ComposeProject> {
    crate::application::services::preflight::ensure_prerequisites(
        &app.runner,
        &app.fs,
        config,
        &app.dir,
    )
    .await
}

/// Check docker, compose and the compose file, for commands that drive a
/// running stack.
pub(crate) async fn compose_project(
    app: &crate::app::AppContext,
    config: &crate::domain::DeployConfig,
) -> Result<ComposeProject> {
    crate::application::services::preflight::ensure_compose(
        &app.runner,
        &app.fs,
        config,
        &app.dir,
    )
    .await
}
