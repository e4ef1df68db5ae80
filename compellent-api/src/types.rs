//! Data-transfer records mirrored from the FluidFS REST objects.
//!
//! Field names follow the array's camelCase JSON. Fields that only the array
//! fills in (instance ids, object types) default when absent so that partial
//! payloads still decode.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Session
// ============================================================================

/// Body of a successful `ApiConnection/Login` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub user_id: i32,
}

// ============================================================================
// Cluster and folders
// ============================================================================

/// A FluidFS cluster as returned by `FluidFsCluster/GetList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidFsCluster {
    pub cluster_id: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default)]
    pub instance_id: String,
}

/// A NAS volume folder inside a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NasVolumeFolder {
    pub cluster_id: String,
    pub folder_id: i64,
    pub name: String,
    #[serde(default)]
    pub instance_id: String,
}

// ============================================================================
// NAS volume
// ============================================================================

/// A FluidFS NAS volume.
///
/// `nas_volume_folder_id` is sent as the numeric folder id on create, but the
/// array may echo it back in another shape, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NasVolume {
    pub cluster_id: String,
    pub name: String,
    /// Size in 512-byte blocks, as a decimal string
    pub size: String,
    #[serde(default)]
    pub nas_volume_folder_id: serde_json::Value,
    #[serde(default)]
    pub acl_to_unix777_mapping_enabled: bool,
    #[serde(default)]
    pub interoperability_policy: String,
    #[serde(default)]
    pub default_unix_folder_permissions: String,
    #[serde(default)]
    pub default_unix_file_permissions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nas_volume_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

// ============================================================================
// NFS export
// ============================================================================

/// Which clients an access rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExportTo {
    AllClients,
    OneClient,
    ClientsInNetwork,
    ClientsInNetgroup,
    /// Value the array reported that this client does not model
    Other(String),
}

impl From<String> for ExportTo {
    fn from(value: String) -> Self {
        match value.as_str() {
            "AllClients" => ExportTo::AllClients,
            "OneClient" => ExportTo::OneClient,
            "ClientsInNetwork" => ExportTo::ClientsInNetwork,
            "ClientsInNetgroup" => ExportTo::ClientsInNetgroup,
            _ => ExportTo::Other(value),
        }
    }
}

impl From<ExportTo> for String {
    fn from(value: ExportTo) -> Self {
        value.to_string()
    }
}

impl Display for ExportTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTo::AllClients => write!(f, "AllClients"),
            ExportTo::OneClient => write!(f, "OneClient"),
            ExportTo::ClientsInNetwork => write!(f, "ClientsInNetwork"),
            ExportTo::ClientsInNetgroup => write!(f, "ClientsInNetgroup"),
            ExportTo::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Root squashing policy of an access rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrustUsers {
    NoRootSquash,
    RootSquash,
    AllSquash,
    Other(String),
}

impl From<String> for TrustUsers {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NoRootSquash" => TrustUsers::NoRootSquash,
            "RootSquash" => TrustUsers::RootSquash,
            "AllSquash" => TrustUsers::AllSquash,
            _ => TrustUsers::Other(value),
        }
    }
}

impl From<TrustUsers> for String {
    fn from(value: TrustUsers) -> Self {
        value.to_string()
    }
}

impl Display for TrustUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustUsers::NoRootSquash => write!(f, "NoRootSquash"),
            TrustUsers::RootSquash => write!(f, "RootSquash"),
            TrustUsers::AllSquash => write!(f, "AllSquash"),
            TrustUsers::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One client access rule of an NFS export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDetails {
    pub export_to: ExportTo,
    /// Host address or network address, depending on `export_to`
    pub export_to_clients: String,
    /// Network prefix length; 0 for single hosts
    pub export_to_prefix: u8,
    pub read_write: bool,
    pub trust_users: TrustUsers,
}

/// A FluidFS NFS export of a NAS volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsExport {
    pub cluster_id: String,
    pub nas_volume_id: i64,
    pub folder_path: String,
    #[serde(rename = "kerberosV5", default)]
    pub kerberos_v5: bool,
    #[serde(rename = "kerberosV5Integrity", default)]
    pub kerberos_v5_integrity: bool,
    #[serde(rename = "kerberosV5Privacy", default)]
    pub kerberos_v5_privacy: bool,
    #[serde(default)]
    pub unix_style: bool,
    #[serde(default)]
    pub access_details: Vec<AccessDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}
