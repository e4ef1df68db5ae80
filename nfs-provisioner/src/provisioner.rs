//! Create and remove NFS-exported NAS volumes.
//!
//! Both workflows are sequences of single client calls. They tolerate
//! objects that already exist (create) or are already gone (remove), so a
//! caller can simply run them again after a partial failure.

use compellent_api::{CompellentClient, HttpTransport, NasVolume, NfsExport, Transport};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::access::parse_access_rules;
use crate::error::{ProvisionError, Result};
use crate::metrics::{self, OperationTimer};
use crate::volume::{simple_nas_volume, simple_nfs_export, size_to_blocks, validate_name};

/// Parameters of an NFS volume to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVolumeRequest {
    /// FluidFS cluster instance name
    pub cluster_name: String,
    /// NAS volume name, also used to find its exports
    pub name: String,
    pub size_bytes: i64,
    /// NAS volume folder to create the volume in
    pub folder_name: String,
    /// Comma separated CIDR list of allowed clients
    pub access: String,
}

/// Result of [`NfsProvisioner::create_nfs_volume`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionedVolume {
    pub volume: NasVolume,
    pub export: NfsExport,
    pub volume_created: bool,
    pub export_created: bool,
}

/// Result of [`NfsProvisioner::remove_nfs_volume`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub exports_deleted: usize,
    pub volume_deleted: bool,
}

pub struct NfsProvisioner<T: Transport = HttpTransport> {
    client: CompellentClient<T>,
}

impl<T: Transport> NfsProvisioner<T> {
    pub fn new(client: CompellentClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CompellentClient<T> {
        &self.client
    }

    /// Make sure a NAS volume and an NFS export for it exist.
    ///
    /// An existing volume with the same name in the folder is reused, and an
    /// existing export for the volume name is returned as is.
    #[instrument(skip(self), fields(cluster = %request.cluster_name, volume = %request.name))]
    pub fn create_nfs_volume(&self, request: &CreateVolumeRequest) -> Result<ProvisionedVolume> {
        let timer = OperationTimer::new("create_nfs_volume");
        match self.create_inner(request) {
            Ok(provisioned) => {
                timer.success();
                Ok(provisioned)
            }
            Err(e) => {
                warn!(error = %e, "Failed to provision NFS volume");
                timer.failure(e.code());
                Err(e)
            }
        }
    }

    /// Delete every NFS export of the named volume, then the volume itself.
    ///
    /// Succeeds without changes when no volume has that name.
    #[instrument(skip(self))]
    pub fn remove_nfs_volume(&self, cluster_name: &str, name: &str) -> Result<RemovalReport> {
        let timer = OperationTimer::new("remove_nfs_volume");
        match self.remove_inner(cluster_name, name) {
            Ok(report) => {
                timer.success();
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "Failed to remove NFS volume");
                timer.failure(e.code());
                Err(e)
            }
        }
    }

    fn create_inner(&self, request: &CreateVolumeRequest) -> Result<ProvisionedVolume> {
        // Reject bad input before anything is looked up or created on the array.
        validate_name(&request.name)?;
        size_to_blocks(request.size_bytes)?;
        let access_details = parse_access_rules(&request.access)?;

        let cluster = self.client.get_cluster(&request.cluster_name)?;
        let folder = self
            .client
            .get_volume_folder(&request.folder_name, &cluster.cluster_id)?;

        let desired = simple_nas_volume(
            &cluster.cluster_id,
            &request.name,
            request.size_bytes,
            folder.folder_id,
        )?;

        let existing =
            self.client
                .list_nas_volumes(&desired.name, &cluster.cluster_id, Some(folder.folder_id))?;
        let (volume, volume_created) = match existing.into_iter().next() {
            Some(volume) => {
                info!(volume = %volume.name, "NAS volume already exists, continuing");
                (volume, false)
            }
            None => {
                let volume = self.client.create_nas_volume(&desired)?;
                metrics::record_created("volume");
                (volume, true)
            }
        };

        let exports = self
            .client
            .list_nfs_exports(&request.name, &cluster.cluster_id)?;
        if let Some(export) = exports.into_iter().next() {
            info!(volume = %volume.name, "NFS export already exists");
            return Ok(ProvisionedVolume {
                volume,
                export,
                volume_created,
                export_created: false,
            });
        }

        let nas_volume_id = volume
            .nas_volume_id
            .ok_or_else(|| ProvisionError::MissingVolumeId(volume.name.clone()))?;
        let export = self.client.create_nfs_export(&simple_nfs_export(
            nas_volume_id,
            &cluster.cluster_id,
            access_details,
        ))?;
        metrics::record_created("export");

        info!(
            volume = %volume.name,
            nas_volume_id,
            volume_created,
            "NFS volume provisioned"
        );
        Ok(ProvisionedVolume {
            volume,
            export,
            volume_created,
            export_created: true,
        })
    }

    fn remove_inner(&self, cluster_name: &str, name: &str) -> Result<RemovalReport> {
        let cluster = self.client.get_cluster(cluster_name)?;

        let mut volumes = self
            .client
            .list_nas_volumes(name, &cluster.cluster_id, None)?;
        let volume = match volumes.len() {
            0 => {
                info!(volume = name, "No NAS volume with this name, nothing to remove");
                return Ok(RemovalReport::default());
            }
            1 => volumes.remove(0),
            count => {
                return Err(ProvisionError::AmbiguousVolume {
                    name: name.to_string(),
                    count,
                });
            }
        };

        let mut report = RemovalReport::default();

        let exports = self.client.list_nfs_exports(name, &cluster.cluster_id)?;
        if exports.is_empty() {
            info!(volume = name, "No NFS exports for volume");
        }
        for export in &exports {
            self.client.delete_nfs_export(export)?;
            report.exports_deleted += 1;
        }
        metrics::record_deleted("export", report.exports_deleted as u64);

        if volume.name == name {
            self.client.delete_nas_volume(&volume)?;
            metrics::record_deleted("volume", 1);
            report.volume_deleted = true;
        } else {
            warn!(
                requested = name,
                found = %volume.name,
                "Lookup returned a differently named volume, leaving it in place"
            );
        }

        info!(
            volume = name,
            exports_deleted = report.exports_deleted,
            volume_deleted = report.volume_deleted,
            "NFS volume removed"
        );
        Ok(report)
    }
}
