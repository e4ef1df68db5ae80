//! NFS volume provisioning on Compellent FluidFS
//!
//! Thin helper layer over `compellent_api` that assembles "create / remove
//! an NFS-exported NAS volume" workflows.
//!
//! This library provides:
//! - CIDR access rule parsing for exports
//! - Builders for the default volume and export objects
//! - Idempotent create/remove workflows
//! - Prometheus metrics for workflow outcomes

pub mod access;
pub mod error;
pub mod metrics;
pub mod provisioner;
pub mod volume;

pub use access::parse_access_rules;
pub use error::{ProvisionError, Result};
pub use provisioner::{CreateVolumeRequest, NfsProvisioner, ProvisionedVolume, RemovalReport};
