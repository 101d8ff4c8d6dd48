//! Core building blocks for svc-versioning
//!
//! - **config**: versioning.toml parsing and defaults
//! - **error**: error types with contextual help messages
//! - **security**: deny-list validation for configured commands and paths
//! - **shell**: shell command construction and execution
//! - **version**: the `major.minor.patch` value type and bump rules
//! - **version_file**: the `.version` state file

pub mod config;
pub mod error;
pub mod security;
pub mod shell;
pub mod version;
pub mod version_file;
