//! `OwnerStore` backed by `psql` inside the database container.
//!
//! SQL is piped on stdin and every value travels as a psql variable
//! (`-v name=value`, referenced as `:'name'`), so nothing user-supplied is
//! spliced into statement text.

use std::process::Output;

use anyhow::Result;

use crate::application::ports::{CommandRunner, OwnerStore};
use crate::domain::owner::{InsertPlan, vars};
use crate::domain::{ComposeProject, OwnerError, OwnerProfile};

const PING_SQL: &str = "SELECT 1;";
const SCHEMA_SQL: &str = "SELECT to_regclass('public.\"user\"') IS NOT NULL;";
const EXISTS_SQL: &str = "SELECT 1 FROM public.\"user\" WHERE email = :'owner_email' LIMIT 1;";
const ROLE_TABLE_SQL: &str = "SELECT to_regclass('public.\"role\"') IS NOT NULL;";
const OWNER_ROLE_SQL: &str =
    "SELECT id FROM public.\"role\" WHERE name = 'owner' AND scope = 'global' LIMIT 1;";
const COLUMNS_SQL: &str = "SELECT column_name FROM information_schema.columns \
     WHERE table_schema = 'public' AND table_name = 'user' ORDER BY ordinal_position;";

/// Runs psql through `compose exec -T <service>`.
pub struct PsqlOwnerStore<'a, R: CommandRunner> {
    runner: &'a R,
    project: &'a ComposeProject,
    service: String,
    database: String,
    user: String,
}

impl<'a, R: CommandRunner> PsqlOwnerStore<'a, R> {
    #[must_use]
    pub fn new(
        runner: &'a R,
        project: &'a ComposeProject,
        service: &str,
        database: &str,
        user: &str,
    ) -> Self {
        Self {
            runner,
            project,
            service: service.to_string(),
            database: database.to_string(),
            user: user.to_string(),
        }
    }

    /// Argument vector for one psql invocation with `vars` bound.
    fn psql_args(&self, bound: &[(&str, &str)]) -> Vec<String> {
        let mut sub: Vec<String> = [
            "exec",
            "-T",
            self.service.as_str(),
            "psql",
            "-U",
            self.user.as_str(),
            "-d",
            self.database.as_str(),
            "-v",
            "ON_ERROR_STOP=1", "-A", "-t", "-q",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        for (name, value) in bound {
            sub.push("-v".to_string());
            sub.push(format!("{name}={value}"));
        }
        let refs: Vec<&str> = sub.iter().map(String::as_str).collect();
        self.project.args(&refs)
    }

    async fn query(&self, sql: &str, bound: &[(&str, &str)]) -> Result<Output> {
        let args = self.psql_args(bound);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_stdin(self.project.program(), &refs, sql.as_bytes())
            .await
    }

    /// Non-empty trimmed stdout lines of a successful query.
    async fn rows(&self, sql: &str, bound: &[(&str, &str)]) -> Result<Vec<String>> {
        let out = self.query(sql, bound).await?;
        if !out.status.success() {
            anyhow::bail!(
                "psql failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run a `to_regclass(...) IS NOT NULL` check; errors count as absent.
    async fn table_exists(&self, sql: &str) -> bool {
        match self.rows(sql, &[]).await {
            Ok(rows) => rows.first().is_some_and(|r| r == "t"),
            Err(e) => {
                tracing::debug!(error = %e, "table check failed");
                false
            }
        }
    }
}

impl<R: CommandRunner> OwnerStore for PsqlOwnerStore<'_, R> {
    async fn ping(&self) -> bool {
        matches!(self.query(PING_SQL, &[]).await, Ok(out) if out.status.success())
    }

    async fn schema_ready(&self) -> bool {
        self.table_exists(SCHEMA_SQL).await
    }

    async fn owner_exists(&self, email: &str) -> Result<bool> {
        let rows = self.rows(EXISTS_SQL, &[(vars::EMAIL, email)]).await?;
        Ok(!rows.is_empty())
    }

    async fn user_columns(&self) -> Result<Vec<String>> {
        self.rows(COLUMNS_SQL, &[]).await
    }

    async fn role_table_ready(&self) -> bool {
        self.table_exists(ROLE_TABLE_SQL).await
    }

    async fn owner_role_id(&self) -> Result<Option<String>> {
        Ok(self.rows(OWNER_ROLE_SQL, &[]).await?.into_iter().next())
    }

    async fn insert_owner(
        &self,
        plan: &InsertPlan,
        profile: &OwnerProfile,
        password_hash: &str,
    ) -> Result<()> {
        let mut bound = vec![
            (vars::EMAIL, profile.email.as_str()),
            (vars::PASSWORD_HASH, password_hash),
            (vars::FIRST_NAME, profile.first_name.as_str()),
            (vars::LAST_NAME, profile.last_name.as_str()),
        ];
        if let Some(role_id) = &plan.role_id {
            bound.push((vars::ROLE_ID, role_id.as_str()));
        }
        let out = self.query(&plan.to_sql(), &bound).await?;
        if !out.status.success() {
            return Err(
                OwnerError::InsertFailed(String::from_utf8_lossy(&out.stderr).trim().to_string())
                    .into(),
            );
        }
        Ok(())
    }
}
