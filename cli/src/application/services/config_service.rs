//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::DeployConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<DeployConfig> {
    store.load()
}

/// Validate and apply one setting, then persist the result.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or write failures.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<DeployConfig> {
    let mut config = store.load()?;
    config.apply(key, value)?;
    store.save(&config)?;
    Ok(config)
}
