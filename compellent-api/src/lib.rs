//! Dell Compellent DSM REST API client
//!
//! Synchronous client for the FluidFS objects of a Storage Center array:
//! session login, filtered `GetList` lookups, and create/delete of NAS
//! volumes and NFS exports.
//!
//! The library is split into several modules:
//! - `client`: typed operations over a logged-in session
//! - `transport`: the HTTP round trip and its test seam
//! - `types`: JSON records exchanged with the array
//! - `filter`: `GetList` filter bodies
//! - `metrics`: request counters and timings

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod transport;
pub mod types;

pub use client::{CompellentClient, Session};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use filter::{Filter, FilterItem, FilterRequest};
pub use reqwest::Method;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestAuth, Transport};
pub use types::{
    AccessDetails, ExportTo, FluidFsCluster, LoginResponse, NasVolume, NasVolumeFolder, NfsExport,
    TrustUsers,
};
