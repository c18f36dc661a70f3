//! Core business logic for Nimbus CLI tools
//!
//! This crate sits between the raw API bindings in `nimbus-cloud` and the
//! `nimbusctl` command-line interface. It owns:
//!
//! - Task polling and the wait helper ([`poll_task`], [`wait_for_tasks`])
//! - Multi-step workflows that submit a mutation, wait for its task, and
//!   fetch the produced resource ([`workflows`])
//! - Profile-based configuration in TOML ([`config`])
//! - A unified error type with classification helpers ([`CoreError`])
//!
//! Nothing in this crate prints or formats output; presentation belongs to
//! the CLI layer.

pub mod config;
pub mod error;
pub mod progress;
pub mod workflows;

pub use config::{Config, ConfigError, Profile};
pub use error::{CoreError, Result};
pub use progress::{ProgressCallback, ProgressEvent, poll_task, wait_for_tasks};
pub use workflows::{
    create_floating_ip_and_wait, delete_floating_ip_and_wait, upload_gpu_image_and_wait,
};
