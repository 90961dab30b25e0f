//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`: never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod bundle;
pub mod config_service;
pub mod doctor;
pub mod login;
pub mod notify;
pub mod preflight;
pub mod provision;
pub mod provision_db;
pub mod readiness;
pub mod stack;
