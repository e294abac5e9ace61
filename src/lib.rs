//! lokoctl - provision and maintain Kubernetes clusters.
//!
//! A cluster is described by a YAML document with one section per extension
//! category: the platform (`cluster`), the state `backend`, the `network`,
//! the `flatcar` OS image and a list of `components`. Resolution turns the
//! document into a [`descriptor::ClusterDescriptor`]; the lifecycle in
//! [`apply`] renders it to Terraform, applies it, verifies the nodes and
//! keeps the control plane releases up to date through Helm.
//!
//! ## Lifecycle
//!
//! - `cluster apply`: render, apply (staged for manual DNS), verify, update
//!   the control plane of an existing cluster, apply components
//! - `cluster destroy`: destroy whatever the backend state holds
//! - `component apply`: install or upgrade configured components only

pub mod apply;
pub mod assets;
pub mod backend;
pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod components;
pub mod config;
pub mod controlplane;
pub mod descriptor;
pub mod diagnostics;
pub mod dns;
pub mod error;
pub mod extension;
pub mod flatcar;
pub mod helm;
pub mod network;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod prompt;
pub mod registry;
pub mod resolve;
pub mod template;
pub mod terraform;
pub mod verify;

pub use cli::{Cli, Commands};
pub use error::{LokoError, Result};
