//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::DeployConfig;
use crate::domain::config::CONFIG_FILE_NAME;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "N8N_DEPLOY_CONFIG";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Config for the deployment in `dir`, honouring `N8N_DEPLOY_CONFIG`.
    #[must_use]
    pub fn for_dir(dir: &Path) -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| dir.join(CONFIG_FILE_NAME), PathBuf::from);
        Self { path }
    }

    #[must_use]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<DeployConfig> {
        if !self.path.exists() {
            return Ok(DeployConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(DeployConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    fn save(&self, config: &DeployConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("cannot write {}", self.path.display()))
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}
