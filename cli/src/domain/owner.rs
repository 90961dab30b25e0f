//! Owner account domain: profile validation, password generation, exit-code
//! classification, and the schema-adaptive insert plan.
//!
//! Pure functions only. Randomness is injected so generation is testable.

use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;

use crate::domain::error::OwnerError;

// ── Constants ─────────────────────────────────────────────────────────────────

pub const DEFAULT_OWNER_EMAIL: &str = "admin@n8n.local";
pub const DEFAULT_OWNER_PASSWORD: &str = "ChangeMe123!";
pub const DEFAULT_OWNER_FIRST_NAME: &str = "Admin";
pub const DEFAULT_OWNER_LAST_NAME: &str = "User";

/// Length of generated passwords.
pub const GENERATED_PASSWORD_LEN: usize = 16;

/// Role value n8n stores for the instance owner.
pub const OWNER_ROLE: &str = "global:owner";

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
pub const SPECIAL: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // compile-time constant pattern
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
});

// ── Profile and credentials ───────────────────────────────────────────────────

/// Identity of the owner account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl OwnerProfile {
    /// Validate and build a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or a name is blank.
    pub fn new(email: &str, first_name: &str, last_name: &str) -> Result<Self, OwnerError> {
        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(OwnerError::InvalidEmail(email.to_string()));
        }
        if first_name.trim().is_empty() {
            return Err(OwnerError::EmptyField("first name"));
        }
        if last_name.trim().is_empty() {
            return Err(OwnerError::EmptyField("last name"));
        }
        Ok(Self {
            email: email.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        })
    }
}

/// Where the owner password came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordSource {
    /// Supplied through `N8N_DEFAULT_PASSWORD` or `--password`.
    Provided,
    /// The built-in literal fallback.
    Fallback,
    /// Randomly generated for this run.
    Generated,
}

/// Profile plus the plaintext password used to create the account.
#[derive(Clone)]
pub struct OwnerCredentials {
    pub profile: OwnerProfile,
    pub password: String,
    pub source: PasswordSource,
}

impl std::fmt::Debug for OwnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCredentials")
            .field("profile", &self.profile)
            .field("password", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

impl OwnerCredentials {
    /// Use `provided` when present, otherwise the literal fallback.
    #[must_use]
    pub fn with_fallback(profile: OwnerProfile, provided: Option<String>) -> Self {
        match provided {
            Some(password) => Self {
                profile,
                password,
                source: PasswordSource::Provided,
            },
            None => Self {
                profile,
                password: DEFAULT_OWNER_PASSWORD.to_string(),
                source: PasswordSource::Fallback,
            },
        }
    }

    /// Use `provided` when present, otherwise a freshly generated password.
    #[must_use]
    pub fn with_generated<R: Rng + ?Sized>(
        profile: OwnerProfile,
        provided: Option<String>,
        rng: &mut R,
    ) -> Self {
        match provided {
            Some(password) => Self {
                profile,
                password,
                source: PasswordSource::Provided,
            },
            None => Self {
                profile,
                password: generate_password(rng, GENERATED_PASSWORD_LEN),
                source: PasswordSource::Generated,
            },
        }
    }
}

/// Generate a password with at least one upper, lower, digit and special
/// character, in random order. Lengths below 4 are raised to 4.
#[must_use]
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let length = length.max(4);
    let mut pick = |set: &[u8]| set[rng.random_range(0..set.len())];

    let mut chars = vec![pick(UPPER), pick(LOWER), pick(DIGITS), pick(SPECIAL)];
    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SPECIAL].concat();
    for _ in 4..length {
        chars.push(pick(&all));
    }
    chars.shuffle(rng);
    chars.into_iter().map(char::from).collect()
}

// ── Creation outcome ──────────────────────────────────────────────────────────

/// Result of an owner creation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
    /// The creation command ended in a way we do not interpret.
    Unclassified { code: Option<i32>, detail: String },
}

/// Interpret the exit status of the application's user-creation command.
///
/// 0 is success, 1 means the account already exists. Anything else (including
/// termination by signal, `None`) is reported but not treated as a failure.
#[must_use]
pub fn classify_exit(code: Option<i32>, stderr: &str) -> CreateOutcome {
    match code {
        Some(0) => CreateOutcome::Created,
        Some(1) => CreateOutcome::AlreadyExists,
        other => CreateOutcome::Unclassified {
            code: other,
            detail: stderr.trim().to_string(),
        },
    }
}

// ── Insert plan ───────────────────────────────────────────────────────────────

/// Value bound to one column of the owner insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// A psql variable, rendered as `:'name'` (quoted literal).
    Var(&'static str),
    /// A fixed SQL expression.
    Sql(String),
}

/// Column/value pairs for inserting the owner into n8n's `user` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    pub columns: Vec<(String, ColumnValue)>,
    /// Owner role id, bound as [`vars::ROLE_ID`] when a column references it.
    pub role_id: Option<String>,
    /// Non-fatal schema observations.
    pub warnings: Vec<String>,
}

/// psql variable names bound by the database adapter.
pub mod vars {
    pub const EMAIL: &str = "owner_email";
    pub const PASSWORD_HASH: &str = "owner_password_hash";
    pub const FIRST_NAME: &str = "owner_first_name";
    pub const LAST_NAME: &str = "owner_last_name";
    pub const ROLE_ID: &str = "owner_role_id";
}

fn first_present<'a>(columns: &[String], candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|c| columns.iter().any(|col| col == *c))
        .copied()
}

/// Column that references the `role` table by id, if the schema assigns the
/// owner role that way. Schemas with a `role`/`roleSlug` column never do.
#[must_use]
pub fn role_id_column(columns: &[String]) -> Option<&'static str> {
    if first_present(columns, &["role", "roleSlug"]).is_some() {
        return None;
    }
    first_present(columns, &["globalRoleId", "global_role_id"])
}

/// Build the insert plan from the live column list of `public.user`.
///
/// The schema differs between n8n releases, so every optional column is
/// looked up under each spelling it has used. `owner_role_id` is the id
/// looked up in the `role` table; when the schema needs one and it is
/// `None`, the role column is left out with a warning.
///
/// # Errors
///
/// Returns an error if `email` or `password` columns are missing.
pub fn plan_owner_insert(
    columns: &[String],
    owner_role_id: Option<&str>,
) -> Result<InsertPlan, OwnerError> {
    let has = |name: &str| columns.iter().any(|c| c == name);
    let mut plan = InsertPlan {
        columns: Vec::new(),
        role_id: None,
        warnings: Vec::new(),
    };

    if has("id") {
        plan.columns
            .push(("id".into(), ColumnValue::Sql("gen_random_uuid()".into())));
    }
    if !has("email") {
        return Err(OwnerError::MissingColumn("email"));
    }
    plan.columns.push(("email".into(), ColumnValue::Var(vars::EMAIL)));
    if !has("password") {
        return Err(OwnerError::MissingColumn("password"));
    }
    plan.columns
        .push(("password".into(), ColumnValue::Var(vars::PASSWORD_HASH)));

    if let Some(col) = first_present(columns, &["firstName", "firstname", "first_name"]) {
        plan.columns.push((col.into(), ColumnValue::Var(vars::FIRST_NAME)));
    }
    if let Some(col) = first_present(columns, &["lastName", "lastname", "last_name"]) {
        plan.columns.push((col.into(), ColumnValue::Var(vars::LAST_NAME)));
    }

    if let Some(col) = first_present(columns, &["role", "roleSlug"]) {
        plan.columns
            .push((col.into(), ColumnValue::Sql(format!("'{OWNER_ROLE}'"))));
    } else if let Some(col) = role_id_column(columns) {
        match owner_role_id {
            Some(id) => {
                plan.columns.push((col.into(), ColumnValue::Var(vars::ROLE_ID)));
                plan.role_id = Some(id.to_string());
            }
            None => plan
                .warnings
                .push(format!("owner role not found in the role table; {col} left unset")),
        }
    } else {
        plan.warnings
            .push("no role column found; the account may lack owner permissions".into());
    }

    for candidates in [["createdAt", "created_at"], ["updatedAt", "updated_at"]] {
        if let Some(col) = first_present(columns, &candidates) {
            plan.columns.push((col.into(), ColumnValue::Sql("NOW()".into())));
        }
    }

    Ok(plan)
}

impl InsertPlan {
    /// Render the plan as a single `INSERT` statement for psql.
    ///
    /// Identifiers are always double-quoted; values are either psql quoted
    /// variables or fixed expressions, so no user input is spliced in.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(|(c, _)| format!("\"{c}\"")).collect();
        let vals: Vec<String> = self
            .columns
            .iter()
            .map(|(_, v)| match v {
                ColumnValue::Var(name) => format!(":'{name}'"),
                ColumnValue::Sql(expr) => expr.clone(),
            })
            .collect();
        format!(
            "INSERT INTO public.\"user\" ({}) VALUES ({});",
            cols.join(", "),
            vals.join(", ")
        )
    }

    /// Column names, for progress output.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(c, _)| c.as_str()).collect()
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
