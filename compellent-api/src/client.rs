//! DSM REST client for FluidFS NAS volumes and NFS exports.
//!
//! Every operation is one authenticated round trip: build the path, encode
//! the optional filter or body, check the status against the single code the
//! array answers with on success, then decode the body.

use std::fmt;
use std::time::Instant;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::filter::{Filter, FilterRequest, attr};
use crate::metrics;
use crate::transport::{
    ApiRequest, ApiResponse, HttpTransport, RequestAuth, Transport, session_cookie,
};
use crate::types::{FluidFsCluster, LoginResponse, NasVolume, NasVolumeFolder, NfsExport};

/// REST resource paths below `/api/rest`
pub mod paths {
    pub const LOGIN: &str = "/ApiConnection/Login";
    pub const CLUSTER: &str = "/FluidFs/FluidFsCluster";
    pub const VOLUME_FOLDER: &str = "/FluidFs/FluidFsNasVolumeFolder";
    pub const NAS_VOLUME: &str = "/FluidFs/FluidFsNasVolume";
    pub const NFS_EXPORT: &str = "/FluidFs/FluidFsNfsExport";
    /// Suffix of filtered list queries
    pub const GET_LIST: &str = "/GetList";
}

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

/// Body sent with DELETE requests
const EMPTY_BODY: &str = "{}";

/// Authenticated session state returned by the login call.
#[derive(Clone)]
pub struct Session {
    cookie: String,
    pub instance_id: String,
    pub user_id: i32,
}

impl Session {
    pub fn cookie(&self) -> &str {
        &self.cookie
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie", &"<redacted>")
            .field("instance_id", &self.instance_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Client bound to one logged-in session.
pub struct CompellentClient<T: Transport = HttpTransport> {
    transport: T,
    session: Session,
}

impl<T: Transport> fmt::Debug for CompellentClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompellentClient")
            .field("session", &self.session)
            .finish()
    }
}

impl CompellentClient<HttpTransport> {
    /// Open an HTTPS transport from `config` and log in.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::login(transport, &config.username, &config.password)
    }
}

impl<T: Transport> CompellentClient<T> {
    /// Log in with HTTP Basic credentials and keep the session cookie.
    ///
    /// Fails if the array does not answer 200 or sets no cookie.
    pub fn login(transport: T, username: &str, password: &str) -> Result<Self> {
        info!(username, "Logging in to DSM REST API");

        let request = ApiRequest {
            method: Method::POST,
            path: paths::LOGIN.to_string(),
            auth: RequestAuth::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            body: None,
        };
        let response = timed(&transport, request, paths::LOGIN)?;

        if response.status != STATUS_OK {
            warn!(status = response.status, "Login rejected");
            return Err(ApiError::LoginFailed {
                status: response.status,
                body: response.body,
            });
        }

        let login: LoginResponse = serde_json::from_str(&response.body)?;
        let cookie = session_cookie(&response.set_cookies).ok_or(ApiError::MissingSessionCookie)?;

        info!(
            username,
            instance_id = %login.instance_id,
            user_id = login.user_id,
            "Logged in to DSM REST API"
        );
        Ok(Self {
            transport,
            session: Session {
                cookie,
                instance_id: login.instance_id,
                user_id: login.user_id,
            },
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send an arbitrary authenticated request and return the raw response.
    pub fn request(&self, method: Method, path: &str, body: Option<String>) -> Result<ApiResponse> {
        self.send(method, "custom", path.to_string(), body)
    }

    /// Look up a FluidFS cluster by its instance name.
    #[instrument(skip(self))]
    pub fn get_cluster(&self, cluster_name: &str) -> Result<FluidFsCluster> {
        if cluster_name.is_empty() {
            return Err(ApiError::InvalidArgument("cluster name cannot be empty".into()));
        }
        let filter = Filter::equals_all(&[(attr::INSTANCE_NAME, cluster_name)])?;
        let clusters: Vec<FluidFsCluster> = self.get_list(paths::CLUSTER, &filter)?;
        exactly_one(clusters, "FluidFS cluster", cluster_name)
    }

    /// Look up a NAS volume folder by name within a cluster.
    #[instrument(skip(self))]
    pub fn get_volume_folder(&self, name: &str, cluster_id: &str) -> Result<NasVolumeFolder> {
        if name.is_empty() {
            return Err(ApiError::InvalidArgument("volume folder name cannot be empty".into()));
        }
        let filter = Filter::equals_all(&[(attr::NAME, name), (attr::CLUSTER_ID, cluster_id)])?;
        let folders: Vec<NasVolumeFolder> = self.get_list(paths::VOLUME_FOLDER, &filter)?;
        exactly_one(folders, "NAS volume folder", name)
    }

    /// List NAS volumes by name, optionally restricted to one folder.
    #[instrument(skip(self))]
    pub fn list_nas_volumes(
        &self,
        name: &str,
        cluster_id: &str,
        folder_id: Option<i64>,
    ) -> Result<Vec<NasVolume>> {
        let folder = folder_id.map(|id| id.to_string());
        // Folder-scoped lookups match on instanceName, as the array expects.
        let filter = match folder.as_deref() {
            Some(folder) => Filter::equals_all(&[
                (attr::INSTANCE_NAME, name),
                (attr::CLUSTER_ID, cluster_id),
                (attr::NAS_VOLUME_FOLDER_ID, folder),
            ])?,
            None => Filter::equals_all(&[(attr::NAME, name), (attr::CLUSTER_ID, cluster_id)])?,
        };
        let volumes: Vec<NasVolume> = self.get_list(paths::NAS_VOLUME, &filter)?;
        debug!(count = volumes.len(), "Found NAS volumes");
        Ok(volumes)
    }

    /// Create a NAS volume and return the array's view of it.
    #[instrument(skip(self, volume), fields(volume = %volume.name))]
    pub fn create_nas_volume(&self, volume: &NasVolume) -> Result<NasVolume> {
        let created: NasVolume = self.create(paths::NAS_VOLUME, volume)?;
        info!(
            volume = %created.name,
            nas_volume_id = ?created.nas_volume_id,
            "NAS volume created"
        );
        Ok(created)
    }

    /// Delete a NAS volume by its instance id.
    #[instrument(skip(self, volume), fields(volume = %volume.name))]
    pub fn delete_nas_volume(&self, volume: &NasVolume) -> Result<()> {
        let instance_id =
            required_instance_id(volume.instance_id.as_deref(), "NAS volume", &volume.name)?;
        self.delete(paths::NAS_VOLUME, instance_id)?;
        info!(volume = %volume.name, instance_id, "NAS volume deleted");
        Ok(())
    }

    /// List NFS exports of the named NAS volume.
    #[instrument(skip(self))]
    pub fn list_nfs_exports(&self, volume_name: &str, cluster_id: &str) -> Result<Vec<NfsExport>> {
        let filter = Filter::equals_all(&[
            (attr::VOLUME_NAME, volume_name),
            (attr::CLUSTER_ID, cluster_id),
        ])?;
        let exports: Vec<NfsExport> = self.get_list(paths::NFS_EXPORT, &filter)?;
        debug!(count = exports.len(), "Found NFS exports");
        Ok(exports)
    }

    /// Create an NFS export and return the array's view of it.
    #[instrument(skip(self, export), fields(nas_volume_id = export.nas_volume_id))]
    pub fn create_nfs_export(&self, export: &NfsExport) -> Result<NfsExport> {
        let created: NfsExport = self.create(paths::NFS_EXPORT, export)?;
        info!(
            nas_volume_id = created.nas_volume_id,
            instance_id = ?created.instance_id,
            "NFS export created"
        );
        Ok(created)
    }

    /// Delete an NFS export by its instance id.
    #[instrument(skip(self, export), fields(nas_volume_id = export.nas_volume_id))]
    pub fn delete_nfs_export(&self, export: &NfsExport) -> Result<()> {
        let label = export
            .volume_name
            .clone()
            .unwrap_or_else(|| export.nas_volume_id.to_string());
        let instance_id =
            required_instance_id(export.instance_id.as_deref(), "NFS export", &label)?;
        self.delete(paths::NFS_EXPORT, instance_id)?;
        info!(export = %label, instance_id, "NFS export deleted");
        Ok(())
    }

    fn get_list<R: DeserializeOwned>(
        &self,
        resource: &'static str,
        filter: &FilterRequest,
    ) -> Result<Vec<R>> {
        let body = serde_json::to_string(filter)?;
        let path = format!("{}{}", resource, paths::GET_LIST);
        let response = self.send(Method::POST, resource, path, Some(body))?;
        let response = expect_status(response, STATUS_OK)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    fn create<B: Serialize, R: DeserializeOwned>(
        &self,
        resource: &'static str,
        object: &B,
    ) -> Result<R> {
        let body = serde_json::to_string(object)?;
        let response = self.send(Method::POST, resource, resource.to_string(), Some(body))?;
        let response = expect_status(response, STATUS_CREATED)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    fn delete(&self, resource: &'static str, instance_id: &str) -> Result<()> {
        let path = format!("{}/{}", resource, instance_id);
        let response = self.send(Method::DELETE, resource, path, Some(EMPTY_BODY.to_string()))?;
        expect_status(response, STATUS_OK)?;
        Ok(())
    }

    fn send(
        &self,
        method: Method,
        endpoint: &'static str,
        path: String,
        body: Option<String>,
    ) -> Result<ApiResponse> {
        let request = ApiRequest {
            method,
            path,
            auth: RequestAuth::Session(self.session.cookie.clone()),
            body,
        };
        timed(&self.transport, request, endpoint)
    }
}

/// Execute a request and record its outcome.
fn timed<T: Transport>(
    transport: &T,
    request: ApiRequest,
    endpoint: &'static str,
) -> Result<ApiResponse> {
    let method = request.method.to_string();
    let start = Instant::now();
    let result = transport.execute(request);
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(response) => {
            metrics::record_request(&method, endpoint, &response.status.to_string(), elapsed)
        }
        Err(_) => metrics::record_request(&method, endpoint, "error", elapsed),
    }
    result
}

fn expect_status(response: ApiResponse, expected: u16) -> Result<ApiResponse> {
    if response.status == expected {
        return Ok(response);
    }
    warn!(status = response.status, expected, body = %response.body, "Unexpected response status");
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        expected,
        body: response.body,
    })
}

fn exactly_one<R>(mut items: Vec<R>, kind: &'static str, name: &str) -> Result<R> {
    match items.len() {
        1 => Ok(items.remove(0)),
        0 => Err(ApiError::NotFound {
            kind,
            name: name.to_string(),
        }),
        count => Err(ApiError::Ambiguous {
            kind,
            name: name.to_string(),
            count,
        }),
    }
}

fn required_instance_id<'a>(
    instance_id: Option<&'a str>,
    kind: &str,
    name: &str,
) -> Result<&'a str> {
    match instance_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::InvalidArgument(format!(
            "{} '{}' has no instance id",
            kind, name
        ))),
    }
}
