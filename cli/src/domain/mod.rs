//! Domain layer: pure deployment logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod notify;
pub mod owner;
pub mod preflight;
pub mod readiness;
pub mod session;
pub mod stack;

pub use config::{DeployConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, DeployError, OwnerError};
pub use owner::{CreateOutcome, OwnerCredentials, OwnerProfile, PasswordSource};
pub use preflight::{DoctorReport, PrerequisiteReport, collect_issues};
pub use readiness::PollPolicy;
pub use stack::{ComposeFlavor, ComposeProject};
