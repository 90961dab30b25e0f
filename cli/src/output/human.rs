//! Human-readable renderings of command results.

use n8n_deploy_common::StackStatus;

use crate::domain::{CreateOutcome, DoctorReport, OwnerCredentials, PasswordSource};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render `compose ps` rows.
    pub fn render_status(&self, status: &StackStatus) {
        if status.services.is_empty() {
            self.ctx.warn("no containers found. Run: n8n-deploy up");
            return;
        }
        for svc in &status.services {
            let state = if svc.health.is_empty() {
                svc.state.clone()
            } else {
                format!("{} ({})", svc.state, svc.health)
            };
            if svc.is_up() {
                self.ctx.success(&format!("{:<10} {state}", svc.service));
            } else {
                self.ctx.warn(&format!("{:<10} {state}", svc.service));
            }
        }
    }

    /// Render the doctor report followed by its issues.
    pub fn render_doctor(&self, report: &DoctorReport, issues: &[String]) {
        let pre = &report.prerequisites;
        self.ctx.header("Prerequisites:");
        for tool in [&pre.docker, &pre.compose] {
            match (&tool.version, tool.found) {
                (Some(v), true) => self.ctx.success(&format!("{} {v}", tool.name)),
                (None, true) => self.ctx.success(&tool.name),
                (_, false) => self.ctx.warn(&format!("{} not found", tool.name)),
            }
        }
        println!();
        self.ctx.header("Files:");
        for file in &pre.files {
            let line = format!("{} ({})", file.label, file.path.display());
            if file.present {
                self.ctx.success(&line);
            } else {
                self.ctx.warn(&format!("{line} missing"));
            }
        }
        println!();
        self.ctx.header("Stack:");
        match report.proxy_config_valid {
            Some(true) => self.ctx.success("reverse proxy configuration valid"),
            Some(false) => {
                self.ctx.warn("reverse proxy configuration invalid");
                if let Some(err) = &report.proxy_config_error {
                    self.ctx.block(err);
                }
            }
            None => self.ctx.info("reverse proxy configuration not checked"),
        }
        if report.app_healthy {
            self.ctx.success("n8n health endpoint responding");
        } else {
            self.ctx.warn("n8n health endpoint not responding");
        }
        println!();
        if issues.is_empty() {
            self.ctx.success("Everything looks good!");
        } else {
            self.ctx.header(&format!("{} issue(s) found:", issues.len()));
            for issue in issues {
                self.ctx.error(issue);
            }
        }
    }

    /// Render a provisioning outcome.
    pub fn render_outcome(&self, outcome: &CreateOutcome, creds: &OwnerCredentials) {
        let email = &creds.profile.email;
        match outcome {
            CreateOutcome::Created => {
                self.ctx.success(&format!("owner account created: {email}"));
                match creds.source {
                    PasswordSource::Generated => {
                        self.ctx.kv("Password:", &creds.password);
                        self.ctx.warn("store this password now; it is not shown again");
                    }
                    PasswordSource::Fallback => self.ctx.warn(
                        "the built-in fallback password is in use; set N8N_DEFAULT_PASSWORD and change it in n8n",
                    ),
                    PasswordSource::Provided => {}
                }
            }
            CreateOutcome::AlreadyExists => {
                self.ctx.success(&format!("owner account already exists: {email}"));
            }
            CreateOutcome::Unclassified { code, detail } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                self.ctx.info(&format!(
                    "owner creation for {email} finished with status {code}; check n8n manually"
                ));
                if !detail.is_empty() {
                    self.ctx.block(detail);
                }
            }
        }
    }
}
