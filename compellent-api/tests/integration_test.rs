//! Integration tests for compellent-api
//!
//! These tests exercise the public client API end to end against an
//! in-memory transport, plus the HTTPS transport's behaviour when the array
//! cannot be reached. No real array is required.

use std::sync::Mutex;
use std::time::Duration;

use compellent_api::{
    ApiError, ApiRequest, ApiResponse, ClientConfig, CompellentClient, Method, NasVolume,
    RequestAuth, Result, Transport,
};

/// Answers by path and remembers the cookies it was sent.
struct FakeArray {
    cookies_seen: Mutex<Vec<Option<String>>>,
}

impl FakeArray {
    fn new() -> Self {
        Self {
            cookies_seen: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for FakeArray {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let cookie = match &request.auth {
            RequestAuth::Session(cookie) => Some(cookie.clone()),
            RequestAuth::Basic { .. } => None,
        };
        self.cookies_seen.lock().unwrap().push(cookie);

        let response = match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/ApiConnection/Login") => {
                ApiResponse::new(200, r#"{"instanceId":"1","userId":7}"#)
                    .with_cookie("JSESSIONID=one; Path=/")
                    .with_cookie("route=r2; Secure")
            }
            ("POST", "/FluidFs/FluidFsCluster/GetList") => ApiResponse::new(
                200,
                r#"[{"clusterId":"c1","objectType":"FluidFsCluster","instanceName":"fs1","instanceId":"c1"}]"#,
            ),
            ("POST", "/FluidFs/FluidFsNasVolume/GetList") => ApiResponse::new(
                200,
                r#"[{"clusterId":"c1","name":"pv-1","size":"2048","nasVolumeFolderId":{"instanceId":"c1.5"},"nasVolumeId":3,"instanceId":"c1.3"}]"#,
            ),
            ("DELETE", "/FluidFs/FluidFsNasVolume/c1.3") => ApiResponse::new(200, ""),
            _ => ApiResponse::new(404, "no such resource"),
        };
        Ok(response)
    }
}

#[test]
fn test_session_flow_against_fake_array() {
    let client = CompellentClient::login(FakeArray::new(), "admin", "secret").unwrap();
    assert_eq!(client.session().instance_id, "1");
    assert_eq!(client.session().cookie(), "JSESSIONID=one; route=r2");

    let cluster = client.get_cluster("fs1").unwrap();
    let volumes = client
        .list_nas_volumes("pv-1", &cluster.cluster_id, None)
        .unwrap();
    assert_eq!(volumes.len(), 1);

    let volume: &NasVolume = &volumes[0];
    // Folder references are kept as raw JSON
    assert_eq!(volume.nas_volume_folder_id["instanceId"], "c1.5");

    client.delete_nas_volume(volume).unwrap();

    let cookies = client.transport().cookies_seen.lock().unwrap().clone();
    assert_eq!(cookies.len(), 4);
    assert_eq!(cookies[0], None);
    for cookie in &cookies[1..] {
        assert_eq!(cookie.as_deref(), Some("JSESSIONID=one; route=r2"));
    }
}

#[test]
fn test_unknown_resource_surfaces_status_and_body() {
    let client = CompellentClient::login(FakeArray::new(), "admin", "secret").unwrap();

    let err = client.list_nfs_exports("pv-1", "c1").unwrap_err();
    match err {
        ApiError::UnexpectedStatus {
            status,
            expected,
            body,
        } => {
            assert_eq!(status, 404);
            assert_eq!(expected, 200);
            assert_eq!(body, "no such resource");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_raw_request_is_authenticated() {
    let client = CompellentClient::login(FakeArray::new(), "admin", "secret").unwrap();
    let response = client
        .request(Method::GET, "/StorageCenter/StorageCenter", None)
        .unwrap();
    assert_eq!(response.status, 404);

    let cookies = client.transport().cookies_seen.lock().unwrap().clone();
    assert_eq!(cookies.last().unwrap().as_deref(), Some("JSESSIONID=one; route=r2"));
}

#[test]
fn test_connect_to_unreachable_array_fails_with_http_error() {
    let mut config = ClientConfig::new("127.0.0.1", "admin", "secret");
    // Nothing listens on port 1
    config.port = 1;
    config.timeout = Duration::from_secs(5);

    let err = CompellentClient::connect(&config).unwrap_err();
    assert!(matches!(err, ApiError::Http(_)), "unexpected error: {err}");
    assert_eq!(err.status(), None);
}

#[test]
fn test_connect_rejects_invalid_config_without_network() {
    let config = ClientConfig::new("array", "", "secret");
    let err = CompellentClient::connect(&config).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}
