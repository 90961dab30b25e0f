//! Integration tests for `provision --method cli`: a fake `docker` whose
//! `user:create` exit code is scripted, and a local health endpoint.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const EMAIL: &str = "ada@example.com";

struct Deployment {
    bin: tempfile::TempDir,
    dir: tempfile::TempDir,
}

impl Deployment {
    /// Only `docker-compose.yml` is present; `nginx/` is never written.
    fn new(health_url: &str, create_exit: i32) -> Self {
        let bin = tempfile::tempdir().expect("tempdir");
        let dir = tempfile::tempdir().expect("tempdir");
        fake_docker(bin.path(), create_exit);
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}\n")
            .expect("write compose file");
        std::fs::write(
            dir.path().join("n8n-deploy.yaml"),
            format!(
                "health:\n  url: {health_url}\n  attempts: 1\n  interval_secs: 1\n\
                 timing:\n  init_delay_secs: 0\n"
            ),
        )
        .expect("write config");
        Self { bin, dir }
    }

    fn provision(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("n8n-deploy"));
        cmd.env("NO_COLOR", "1")
            .env("PATH", self.bin.path())
            .env_remove("N8N_DEPLOY_CONFIG")
            .env_remove("N8N_DEFAULT_PASSWORD")
            .env_remove("OTN_URL")
            .env_remove("AGENTIC_WEBHOOK_URL");
        for var in ["http_proxy", "HTTP_PROXY", "all_proxy", "ALL_PROXY"] {
            cmd.env_remove(var);
        }
        cmd.arg("provision")
            .args(["--email", EMAIL])
            .arg("--dir")
            .arg(self.dir.path());
        cmd
    }

    fn docker_log(&self) -> String {
        std::fs::read_to_string(self.bin.path().join("docker.log")).unwrap_or_default()
    }
}

/// Fake `docker` answering version probes; `user:create` exits with
/// `create_exit`. Non-probe invocations are logged to `docker.log`.
fn fake_docker(bin: &Path, create_exit: i32) {
    use std::os::unix::fs::PermissionsExt;

    let log = bin.join("docker.log");
    let script = format!(
        "#!/bin/sh\n\
         case \"$1 $2\" in\n\
           \"--version \") echo 'Docker version 27.3.1, build ce12230' ;;\n\
           \"compose version\") echo 'Docker Compose version v2.29.7' ;;\n\
           *) echo \"$@\" >> '{}'\n\
              case \"$*\" in *user:create*) echo 'user:create said no' >&2; exit {create_exit} ;; esac ;;\n\
         esac\n",
        log.display()
    );
    let path = bin.join("docker");
    std::fs::write(&path, script).expect("write fake docker");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
}

/// Answer every request with `200 OK` from a background thread.
fn healthy_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            );
        }
    });
    format!("http://127.0.0.1:{port}/healthz")
}

fn closed_endpoint() -> String {
    let port = TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();
    format!("http://127.0.0.1:{port}/healthz")
}

#[test]
fn test_provision_exit_zero_reports_created_email_and_fallback_warning() {
    let deployment = Deployment::new(&healthy_endpoint(), 0);

    deployment
        .provision()
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("owner account created: {EMAIL}")))
        .stdout(predicate::str::contains("built-in fallback password is in use"));

    let log = deployment.docker_log();
    assert!(log.contains("exec -T n8n n8n user:create"), "{log}");
    assert!(log.contains(&format!("--email {EMAIL}")), "{log}");
}

#[test]
fn test_provision_exit_one_reports_already_exists() {
    let deployment = Deployment::new(&healthy_endpoint(), 1);

    deployment
        .provision()
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("owner account already exists: {EMAIL}")))
        .stdout(predicate::str::contains("fallback password").not());
}

#[test]
fn test_provision_other_exit_still_succeeds_with_status_note() {
    let deployment = Deployment::new(&healthy_endpoint(), 3);

    deployment
        .provision()
        .assert()
        .success()
        .stdout(predicate::str::contains("finished with status 3"))
        .stdout(predicate::str::contains("user:create said no"));
}

#[test]
fn test_provision_provided_password_has_no_fallback_warning() {
    let deployment = Deployment::new(&healthy_endpoint(), 0);

    deployment
        .provision()
        .env("N8N_DEFAULT_PASSWORD", "Sup3r-Secret!")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("owner account created: {EMAIL}")))
        .stdout(predicate::str::contains("fallback password").not());
}

#[test]
fn test_provision_ignores_missing_proxy_configs_and_waits_for_health() {
    let deployment = Deployment::new(&closed_endpoint(), 0);

    deployment
        .provision()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("did not become ready after 1 attempts"))
        .stderr(predicate::str::contains("Required file not found").not());

    assert!(
        !deployment.docker_log().contains("user:create"),
        "owner creation ran against an unhealthy app"
    );
}
