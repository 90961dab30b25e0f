//! Application service: owner account creation straight into the database.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Password hashing happens here so the store only ever sees the hash.

use anyhow::{Context, Result};

use crate::application::ports::{OwnerStore, ProgressReporter};
use crate::application::services::readiness::poll_until;
use crate::domain::owner::{plan_owner_insert, role_id_column};
use crate::domain::{CreateOutcome, OwnerCredentials, PollPolicy};

/// bcrypt work factor used for the owner password.
pub const BCRYPT_COST: u32 = 10;

/// Polling policies for [`provision_via_database`].
#[derive(Debug, Clone, Copy)]
pub struct DbProvisionOptions {
    pub database: PollPolicy,
    pub schema: PollPolicy,
    pub role_table: PollPolicy,
}

impl Default for DbProvisionOptions {
    fn default() -> Self {
        Self {
            database: PollPolicy::DATABASE,
            schema: PollPolicy::SCHEMA,
            role_table: PollPolicy::ROLE_TABLE,
        }
    }
}

/// Wait for the `role` table and read the owner role id from it.
///
/// A table that never appears is a warning, not an error: the insert then
/// goes ahead without a role reference.
async fn lookup_owner_role(
    store: &impl OwnerStore,
    policy: PollPolicy,
    reporter: &impl ProgressReporter,
) -> Result<Option<String>> {
    if let Err(e) = poll_until(policy, "role table", reporter, move || store.role_table_ready()).await {
        tracing::debug!(error = %e, "role table wait exhausted");
        reporter.warn("role table not found; continuing without an owner role");
        return Ok(None);
    }
    store.owner_role_id().await
}

/// Wait for the database and the application's schema, then insert the owner
/// unless an account with the same email already exists.
///
/// # Errors
///
/// Returns an error if the database or schema wait is exhausted, the `user`
/// table lacks a required column, hashing fails, or the insert is rejected.
pub async fn provision_via_database(
    store: &impl OwnerStore,
    creds: &OwnerCredentials,
    opts: DbProvisionOptions,
    reporter: &impl ProgressReporter,
) -> Result<CreateOutcome> {
    poll_until(opts.database, "database", reporter, move || store.ping()).await?;
    poll_until(opts.schema, "n8n database schema", reporter, move || store.schema_ready()).await?;

    if store.owner_exists(&creds.profile.email).await? {
        tracing::info!(email = %creds.profile.email, "owner already present");
        return Ok(CreateOutcome::AlreadyExists);
    }

    let columns = store.user_columns().await?;
    let role_id = if role_id_column(&columns).is_some() {
        lookup_owner_role(store, opts.role_table, reporter).await?
    } else {
        None
    };
    let plan = plan_owner_insert(&columns, role_id.as_deref())?;
    for warning in &plan.warnings {
        reporter.warn(warning);
    }
    tracing::debug!(columns = ?plan.column_names(), "owner insert plan");

    let hash = bcrypt::hash(&creds.password, BCRYPT_COST).context("hashing owner password")?;

    reporter.step(&format!("creating owner account {}...", creds.profile.email));
    store.insert_owner(&plan, &creds.profile, &hash).await?;
    Ok(CreateOutcome::Created)
}
