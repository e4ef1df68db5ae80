//! Builders for the objects a provisioned NFS volume is made of.

use compellent_api::{AccessDetails, NasVolume, NfsExport};
use serde_json::json;

use crate::error::{ProvisionError, Result};

/// Interoperability policy of provisioned volumes
pub const INTEROPERABILITY_POLICY: &str = "Unix";
/// Default permissions of files and folders created on the volume
pub const DEFAULT_UNIX_PERMISSIONS: &str = "0775";
/// Exports always cover the whole volume
pub const EXPORT_FOLDER_PATH: &str = "/";

/// Validate a volume name. Allows alphanumerics, underscore, hyphen and period.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ProvisionError::InvalidName("name cannot be empty".into()));
    }
    if name.contains("..") {
        return Err(ProvisionError::InvalidName(format!(
            "'{}' contains '..'",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ProvisionError::InvalidName(format!(
            "invalid characters in name '{}': only alphanumeric, underscore, hyphen, and period allowed",
            name
        )));
    }
    Ok(())
}

/// Smallest size that converts to a non-empty volume
pub const MIN_SIZE_BYTES: i64 = 1024;

/// Convert a byte size to the array's size string: 512-byte blocks,
/// truncated to whole KiB. Sizes below one KiB are rejected.
pub fn size_to_blocks(size_bytes: i64) -> Result<String> {
    if size_bytes < MIN_SIZE_BYTES {
        return Err(ProvisionError::InvalidSize(size_bytes));
    }
    Ok((size_bytes / 1024 * 2).to_string())
}

/// NAS volume with Unix semantics and 0775 default permissions.
pub fn simple_nas_volume(
    cluster_id: &str,
    name: &str,
    size_bytes: i64,
    folder_id: i64,
) -> Result<NasVolume> {
    validate_name(name)?;
    Ok(NasVolume {
        cluster_id: cluster_id.to_string(),
        name: name.to_string(),
        size: size_to_blocks(size_bytes)?,
        nas_volume_folder_id: json!(folder_id),
        acl_to_unix777_mapping_enabled: false,
        interoperability_policy: INTEROPERABILITY_POLICY.to_string(),
        default_unix_folder_permissions: DEFAULT_UNIX_PERMISSIONS.to_string(),
        default_unix_file_permissions: DEFAULT_UNIX_PERMISSIONS.to_string(),
        nas_volume_id: None,
        instance_id: None,
    })
}

/// Unix-style export of the volume root without Kerberos.
pub fn simple_nfs_export(
    nas_volume_id: i64,
    cluster_id: &str,
    access_details: Vec<AccessDetails>,
) -> NfsExport {
    NfsExport {
        cluster_id: cluster_id.to_string(),
        nas_volume_id,
        folder_path: EXPORT_FOLDER_PATH.to_string(),
        kerberos_v5: false,
        kerberos_v5_integrity: false,
        kerberos_v5_privacy: false,
        unix_style: true,
        access_details,
        volume_name: None,
        instance_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::network_access;

    #[test]
    fn test_size_to_blocks() {
        assert_eq!(size_to_blocks(1024).unwrap(), "2");
        assert_eq!(size_to_blocks(1024 * 1024 * 1024).unwrap(), "2097152");
        // Sub-KiB remainders are dropped
        assert_eq!(size_to_blocks(1500).unwrap(), "2");
        assert!(matches!(size_to_blocks(1023), Err(ProvisionError::InvalidSize(1023))));
        assert!(size_to_blocks(1).is_err());
        assert!(size_to_blocks(0).is_err());
        assert!(size_to_blocks(-4096).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("pvc-0a1b2c3d").is_ok());
        assert!(validate_name("vol_1.data").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("vol/name").is_err());
        assert!(validate_name("vol name").is_err());
        assert!(validate_name("vol..name").is_err());
        assert!(validate_name("vol;rm").is_err());
    }

    #[test]
    fn test_simple_nas_volume() {
        let volume = simple_nas_volume("c1", "pv-1", 10 * 1024 * 1024 * 1024, 5).unwrap();
        assert_eq!(volume.cluster_id, "c1");
        assert_eq!(volume.name, "pv-1");
        assert_eq!(volume.size, "20971520");
        assert_eq!(volume.nas_volume_folder_id, json!(5));
        assert!(!volume.acl_to_unix777_mapping_enabled);
        assert_eq!(volume.interoperability_policy, "Unix");
        assert_eq!(volume.default_unix_file_permissions, "0775");
        assert_eq!(volume.default_unix_folder_permissions, "0775");
        assert!(volume.nas_volume_id.is_none());

        assert!(simple_nas_volume("c1", "pv-1", 0, 5).is_err());
        assert!(simple_nas_volume("c1", "pv-1", 1000, 5).is_err());
        assert!(simple_nas_volume("c1", "", 1024, 5).is_err());
    }

    #[test]
    fn test_simple_nfs_export() {
        let export = simple_nfs_export(77, "c1", vec![network_access("10.0.0.0", 8)]);
        assert_eq!(export.nas_volume_id, 77);
        assert_eq!(export.folder_path, "/");
        assert!(export.unix_style);
        assert!(!export.kerberos_v5);
        assert!(!export.kerberos_v5_integrity);
        assert!(!export.kerberos_v5_privacy);
        assert_eq!(export.access_details.len(), 1);

        let value = serde_json::to_value(&export).unwrap();
        assert!(value.get("instanceId").is_none());
        assert!(value.get("volumeName").is_none());
    }
}
