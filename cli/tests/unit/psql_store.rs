//! psql-backed owner store, driven through a scripted runner.

#![allow(clippy::expect_used)]

use n8n_deploy_cli::application::ports::OwnerStore;
use n8n_deploy_cli::domain::OwnerProfile;
use n8n_deploy_cli::domain::owner::plan_owner_insert;
use n8n_deploy_cli::infra::psql::PsqlOwnerStore;

use crate::helpers::{err_output, ok_output};
use crate::mocks::{ScriptedRunner, plugin_project};

fn profile() -> OwnerProfile {
    OwnerProfile::new("o'brien@example.com", "Pat", "O'Brien").expect("profile")
}

#[tokio::test]
async fn queries_run_psql_in_database_service() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"t\n")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");

    assert!(store.schema_ready().await);

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0].ends_with("exec -T postgres psql -U n8n -d n8n -v ON_ERROR_STOP=1 -A -t -q"),
        "{}",
        calls[0]
    );
    assert!(runner.stdin.lock().expect("lock")[0].contains("to_regclass"));
}

#[tokio::test]
async fn schema_not_ready_when_psql_fails() {
    let runner = ScriptedRunner::new(|_, _| Ok(err_output(2, b"connection refused")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");

    assert!(!store.ping().await);
    assert!(!store.schema_ready().await);
}

#[tokio::test]
async fn owner_exists_binds_email_as_variable() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"1\n")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");

    assert!(store.owner_exists("o'brien@example.com").await.expect("query"));

    let calls = runner.calls();
    assert!(calls[0].ends_with("-v owner_email=o'brien@example.com"), "{}", calls[0]);
    let sql = runner.stdin.lock().expect("lock")[0].clone();
    assert!(sql.contains(":'owner_email'"), "{sql}");
    assert!(!sql.contains("o'brien"), "{sql}");
}

#[tokio::test]
async fn user_columns_are_trimmed_rows() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"id\nemail\n\npassword\n")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");

    assert_eq!(store.user_columns().await.expect("columns"), vec!["id", "email", "password"]);
}

#[tokio::test]
async fn owner_role_id_is_first_row_or_none() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b" 1\n")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");
    assert_eq!(store.owner_role_id().await.expect("query").as_deref(), Some("1"));
    let sql = runner.stdin.lock().expect("lock")[0].clone();
    assert!(sql.contains("name = 'owner' AND scope = 'global'"), "{sql}");

    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"\n")));
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");
    assert_eq!(store.owner_role_id().await.expect("query"), None);
}

#[tokio::test]
async fn role_table_check_queries_role_relation() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"f\n")));
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");

    assert!(!store.role_table_ready().await);
    let sql = runner.stdin.lock().expect("lock")[0].clone();
    assert!(sql.contains("to_regclass('public.\"role\"')"), "{sql}");
}

#[tokio::test]
async fn insert_binds_owner_role_id_when_planned() {
    let runner = ScriptedRunner::all_ok();
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");
    let columns = ["email", "password", "globalRoleId"].map(String::from);
    let plan = plan_owner_insert(&columns, Some("7")).expect("plan");

    store
        .insert_owner(&plan, &profile(), "$2b$10$hash")
        .await
        .expect("inserted");

    let calls = runner.calls();
    assert!(calls[0].ends_with("-v owner_role_id=7"), "{}", calls[0]);
    let sql = runner.stdin.lock().expect("lock")[0].clone();
    assert!(sql.contains(":'owner_role_id'"), "{sql}");
}

#[tokio::test]
async fn rejected_insert_is_an_owner_error() {
    let runner = ScriptedRunner::new(|_, _| {
        Ok(err_output(3, b"ERROR:  duplicate key value violates unique constraint\n"))
    });
    let project = plugin_project();
    let store = PsqlOwnerStore::new(&runner, &project, "postgres", "n8n", "n8n");
    let plan = plan_owner_insert(&["email".to_string(), "password".to_string()], None).expect("plan");

    let err = store
        .insert_owner(&plan, &profile(), "$2b$10$hash")
        .await
        .expect_err("insert rejected");

    assert!(err.to_string().contains("duplicate key value"), "{err}");
    let sql = runner.stdin.lock().expect("lock")[0].clone();
    assert!(sql.starts_with("INSERT INTO public.\"user\""), "{sql}");
    let calls = runner.calls();
    assert!(calls[0].contains("-v owner_password_hash=$2b$10$hash"), "{}", calls[0]);
}
