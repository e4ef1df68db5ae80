//! NFS provisioner CLI
//!
//! Creates and removes NFS-exported FluidFS NAS volumes on a Compellent
//! array through the DSM REST API.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use compellent_api::config::{DEFAULT_API_VERSION, DEFAULT_PORT, DEFAULT_TIMEOUT};
use compellent_api::{ClientConfig, CompellentClient};
use nfs_provisioner::metrics;
use nfs_provisioner::{CreateVolumeRequest, NfsProvisioner};

#[derive(Parser)]
#[command(name = "nfs-provisioner")]
#[command(about = "Create and remove NFS-exported FluidFS volumes on Compellent arrays")]
struct Args {
    /// DSM / Storage Center REST host
    #[arg(long, env = "COMPELLENT_HOST")]
    host: String,

    /// DSM REST port
    #[arg(long, env = "COMPELLENT_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// API user
    #[arg(long, env = "COMPELLENT_USER")]
    username: String,

    /// API password
    #[arg(long, env = "COMPELLENT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Value of the x-dell-api-version header
    #[arg(long, env = "COMPELLENT_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "COMPELLENT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Verify the array's TLS certificate
    #[arg(long, env = "COMPELLENT_VERIFY_TLS")]
    verify_tls: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Write Prometheus metrics to this file on exit (textfile collector format)
    /// If not set, metrics are not recorded
    #[arg(long, env = "METRICS_FILE")]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .field("log_level", &self.log_level)
            .field("metrics_file", &self.metrics_file)
            .field("command", &self.command)
            .finish()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a NAS volume and export it over NFS (existing objects are reused)
    Create {
        /// FluidFS cluster name
        #[arg(long)]
        cluster: String,
        /// Volume name
        #[arg(long)]
        name: String,
        /// Volume size in bytes
        #[arg(long)]
        size_bytes: i64,
        /// NAS volume folder to create the volume in
        #[arg(long)]
        folder: String,
        /// Allowed clients, e.g. "192.168.1.0/24, 192.168.0.1/32"
        #[arg(long)]
        access: String,
    },
    /// Delete a volume's NFS exports and the volume itself
    Remove {
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        name: String,
    },
    /// Show NAS volumes with the given name
    Volumes {
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        name: String,
        /// Only look inside this folder
        #[arg(long)]
        folder: Option<String>,
    },
    /// Show NFS exports of the named volume
    Exports {
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing with configured log level
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let metrics_handle = match args.metrics_file {
        Some(_) => Some(
            metrics::init_metrics()
                .map_err(|e| format!("Failed to initialize metrics: {}", e))?,
        ),
        None => None,
    };

    let result = run(&args);

    // Written on failure too, so failed runs show up in the counters.
    if let (Some(path), Some(handle)) = (&args.metrics_file, &metrics_handle) {
        metrics::write_textfile(path, &handle.render())?;
    }

    result
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::new(&args.host, &args.username, &args.password);
    config.port = args.port;
    config.api_version = args.api_version.clone();
    config.timeout = Duration::from_secs(args.timeout_secs);
    config.verify_tls = args.verify_tls;

    info!(
        host = %config.host,
        port = config.port,
        api_version = %config.api_version,
        verify_tls = config.verify_tls,
        "Connecting to DSM REST API"
    );
    let client = CompellentClient::connect(&config)?;
    let provisioner = NfsProvisioner::new(client);

    match &args.command {
        Command::Create {
            cluster,
            name,
            size_bytes,
            folder,
            access,
        } => {
            let request = CreateVolumeRequest {
                cluster_name: cluster.clone(),
                name: name.clone(),
                size_bytes: *size_bytes,
                folder_name: folder.clone(),
                access: access.clone(),
            };
            print_json(&provisioner.create_nfs_volume(&request)?)
        }
        Command::Remove { cluster, name } => {
            print_json(&provisioner.remove_nfs_volume(cluster, name)?)
        }
        Command::Volumes {
            cluster,
            name,
            folder,
        } => {
            let client = provisioner.client();
            let cluster = client.get_cluster(cluster)?;
            let folder_id = match folder {
                Some(folder) => Some(
                    client
                        .get_volume_folder(folder, &cluster.cluster_id)?
                        .folder_id,
                ),
                None => None,
            };
            print_json(&client.list_nas_volumes(name, &cluster.cluster_id, folder_id)?)
        }
        Command::Exports { cluster, name } => {
            let client = provisioner.client();
            let cluster = client.get_cluster(cluster)?;
            print_json(&client.list_nfs_exports(name, &cluster.cluster_id)?)
        }
    }
}

fn print_json<S: Serialize>(value: &S) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_create() {
        let args = Args::try_parse_from([
            "nfs-provisioner",
            "--host",
            "array",
            "--username",
            "admin",
            "--password",
            "secret",
            "create",
            "--cluster",
            "fs1",
            "--name",
            "pv-1",
            "--size-bytes",
            "1073741824",
            "--folder",
            "k8s",
            "--access",
            "10.0.0.0/8",
        ])
        .unwrap();

        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.timeout_secs, 120);
        assert!(!args.verify_tls);
        match args.command {
            Command::Create {
                size_bytes, access, ..
            } => {
                assert_eq!(size_bytes, 1073741824);
                assert_eq!(access, "10.0.0.0/8");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_args_debug_hides_password() {
        let args = Args::try_parse_from([
            "nfs-provisioner",
            "--host",
            "array",
            "--username",
            "admin",
            "--password",
            "hunter2",
            "exports",
            "--cluster",
            "fs1",
            "--name",
            "pv-1",
        ])
        .unwrap();

        let debug = format!("{:?}", args);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("admin"));
    }

    #[test]
    fn test_args_require_subcommand() {
        let result = Args::try_parse_from([
            "nfs-provisioner",
            "--host",
            "array",
            "--username",
            "admin",
            "--password",
            "secret",
        ]);
        assert!(result.is_err());
    }
}
