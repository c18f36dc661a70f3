//! CLI structure and command definitions
//!
//! Defines the command-line interface using clap with a three-layer architecture:
//! 1. Raw API access (`api` commands)
//! 2. Human-friendly resource commands (`gpu-image`, `floating-ip`, `task`)
//! 3. Workflow orchestration (the `--wait` flag on asynchronous operations)

use clap::{Args, Parser, Subcommand};
use nimbus_cloud::gpu_images::{HwFirmwareType, ImageArchitecture, OsType, SshKeyPolicy};
use std::net::IpAddr;

/// Nimbus Cloud management CLI
#[derive(Parser, Debug)]
#[command(name = "nimbusctl")]
#[command(
    version,
    about = "Nimbus Cloud management CLI for GPU images, floating IPs, and tasks"
)]
#[command(long_about = "
Nimbus Cloud management CLI for GPU images, floating IPs, and tasks

Asynchronous operations return a task ID immediately. Pass --wait to block
until the task completes, or track it later with 'nimbusctl task wait'.

EXAMPLES:
    # Set up a profile
    nimbusctl profile set prod --api-key KEY --project 1234 --region 7

    # Upload a baremetal GPU image and wait for the server to fetch it
    nimbusctl gpu-image upload-baremetal \\
        --url https://images.example.com/ubuntu-gpu.qcow2 \\
        --name ubuntu-gpu --wait

    # Get JSON output for scripting
    nimbusctl floating-ip list -o json

    # Filter output with JMESPath
    nimbusctl gpu-image list -q '[?status==`active`].name'

    # Direct API access
    nimbusctl api get /v1/tasks/TASK_ID

For more help on a specific command, run:
    nimbusctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "NIMBUS_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "NIMBUS_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Project ID override for scoped commands
    #[arg(long, global = true)]
    pub project: Option<u32>,

    /// Region ID override for scoped commands
    #[arg(long, global = true)]
    pub region: Option<u32>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Automatically choose format based on command and context
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Raw API access - direct REST endpoint calls
    #[command(name = "api")]
    #[command(after_help = "EXAMPLES:
    # GET request
    nimbusctl api get /v1/tasks/TASK_ID

    # POST request with JSON data
    nimbusctl api post /v1/floatingips/1234/7 --data '{\"port_id\":\"PORT\",\"fixed_ip_address\":\"10.0.0.5\"}'

    # POST request from file
    nimbusctl api post /v3/gpu/baremetal/1234/7/images --data @image.json

    # DELETE request
    nimbusctl api delete /v1/floatingips/1234/7/FIP_ID

    # Output as YAML for scripting
    nimbusctl api get /v1/floatingips/1234/7 -o yaml
")]
    Api {
        /// HTTP method
        #[arg(value_parser = parse_http_method)]
        method: HttpMethod,

        /// API endpoint path (e.g., /v1/tasks/TASK_ID)
        path: String,

        /// Request body (JSON string or @file)
        #[arg(long)]
        data: Option<String>,
    },

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    nimbusctl profile set prod --api-key KEY --project 1234 --region 7

    # List all profiles
    nimbusctl profile list

    # Show profile details
    nimbusctl profile show prod

    # Set the default profile
    nimbusctl profile default prod
")]
    Profile(ProfileCommands),

    /// GPU image operations
    #[command(subcommand, visible_alias = "image", visible_alias = "img")]
    GpuImage(GpuImageCommands),

    /// Floating IP operations
    #[command(subcommand, visible_alias = "fip")]
    FloatingIp(FloatingIpCommands),

    /// Task tracking operations
    #[command(subcommand)]
    Task(TaskCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// HTTP methods for raw API access
#[derive(Debug, Clone)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// Parse HTTP method case-insensitively
fn parse_http_method(s: &str) -> Result<HttpMethod, String> {
    match s.to_lowercase().as_str() {
        "get" => Ok(HttpMethod::Get),
        "post" => Ok(HttpMethod::Post),
        "delete" => Ok(HttpMethod::Delete),
        _ => Err(format!(
            "invalid HTTP method: {} (valid: get, post, delete)",
            s
        )),
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    # Create a profile with default project and region
    nimbusctl profile set prod \\
        --api-key nclk_4q2vx64hwddh8vminqnkgfq \\
        --project 1234 \\
        --region 7

    # Create a profile against a different API endpoint
    nimbusctl profile set staging \\
        --api-key nclk_8ecrrnaguqkvwfveal \\
        --api-url https://staging.nimbuscloud.io

    # Scope can be omitted and supplied per command instead
    nimbusctl profile set minimal --api-key nclk_o4rb0ud3qm77c
")]
    Set {
        /// Profile name
        name: String,

        /// API key
        #[arg(long)]
        api_key: String,

        /// API URL
        #[arg(long, default_value = nimbus_cloud::DEFAULT_API_URL)]
        api_url: String,

        /// Default project ID for scoped commands
        #[arg(long)]
        project: Option<u32>,

        /// Default region ID for scoped commands
        #[arg(long)]
        region: Option<u32>,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to set as default
        name: String,
    },
}

/// GPU image commands
#[derive(Subcommand, Debug)]
pub enum GpuImageCommands {
    /// Register a baremetal GPU image from a URL
    #[command(name = "upload-baremetal", visible_alias = "upload-bm")]
    #[command(after_help = "EXAMPLES:
    # Register an image and return the task ID immediately
    nimbusctl gpu-image upload-baremetal \\
        --url https://images.example.com/ubuntu-gpu.qcow2 \\
        --name ubuntu-gpu

    # Wait for the server to finish downloading the image
    nimbusctl gpu-image upload-baremetal \\
        --url https://images.example.com/ubuntu-gpu.qcow2 \\
        --name ubuntu-gpu \\
        --os-distro ubuntu --os-version 22.04 \\
        --wait --wait-timeout 600

    # Attach metadata entries
    nimbusctl gpu-image upload-baremetal \\
        --url https://images.example.com/train.qcow2 \\
        --name training-image \\
        --metadata team=ml --metadata tier=gold
")]
    UploadBaremetal {
        #[command(flatten)]
        args: GpuImageUploadArgs,
    },

    /// Register a virtual GPU image from a URL
    #[command(name = "upload-virtual", visible_alias = "upload-vm")]
    UploadVirtual {
        #[command(flatten)]
        args: GpuImageUploadArgs,
    },

    /// List GPU images
    #[command(visible_alias = "ls")]
    List {
        /// List virtual images instead of baremetal
        #[arg(long)]
        r#virtual: bool,
    },

    /// Get GPU image details
    #[command(visible_alias = "show")]
    Get {
        /// Image ID
        id: String,

        /// Look up a virtual image instead of baremetal
        #[arg(long)]
        r#virtual: bool,
    },
}

/// Shared arguments for GPU image uploads
#[derive(Args, Debug, Clone)]
pub struct GpuImageUploadArgs {
    /// URL the server downloads the image from
    #[arg(long)]
    pub url: String,

    /// Image name
    #[arg(long)]
    pub name: String,

    /// Permission to use an SSH key on instances (allow or deny)
    #[arg(long)]
    pub ssh_key: Option<SshKeyPolicy>,

    /// Register the image in copy-on-write format
    #[arg(long)]
    pub cow_format: bool,

    /// Image CPU architecture (aarch64 or x86_64)
    #[arg(long)]
    pub architecture: Option<ImageArchitecture>,

    /// OS distribution (e.g. ubuntu, debian)
    #[arg(long)]
    pub os_distro: Option<String>,

    /// OS type (linux or windows)
    #[arg(long)]
    pub os_type: Option<OsType>,

    /// OS version (e.g. 22.04)
    #[arg(long)]
    pub os_version: Option<String>,

    /// Firmware used to boot instances (bios or uefi)
    #[arg(long)]
    pub hw_firmware_type: Option<HwFirmwareType>,

    /// Metadata entry as key=value (repeatable)
    #[arg(long = "metadata", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Async operation options
    #[command(flatten)]
    pub async_ops: crate::commands::async_utils::AsyncOperationArgs,
}

/// Floating IP commands
#[derive(Subcommand, Debug)]
pub enum FloatingIpCommands {
    /// List floating IPs
    #[command(visible_alias = "ls")]
    List,

    /// Get floating IP details
    #[command(visible_alias = "show")]
    Get {
        /// Floating IP ID
        id: String,
    },

    /// Create a floating IP attached to a port
    #[command(after_help = "EXAMPLES:
    # Create a floating IP and return the task ID immediately
    nimbusctl floating-ip create --port-id PORT --fixed-ip 10.0.0.5

    # Create and wait for the address to be provisioned
    nimbusctl floating-ip create --port-id PORT --fixed-ip 10.0.0.5 --wait
")]
    Create {
        /// Port to attach the floating IP to
        #[arg(long)]
        port_id: String,

        /// Fixed IP address on the port
        #[arg(long)]
        fixed_ip: IpAddr,

        /// Async operation options
        #[command(flatten)]
        async_ops: crate::commands::async_utils::AsyncOperationArgs,
    },

    /// Delete a floating IP
    #[command(visible_alias = "rm", visible_alias = "del")]
    Delete {
        /// Floating IP ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,

        /// Async operation options
        #[command(flatten)]
        async_ops: crate::commands::async_utils::AsyncOperationArgs,
    },

    /// Assign a floating IP to a port
    Assign {
        /// Floating IP ID
        id: String,

        /// Port to assign the floating IP to
        #[arg(long)]
        port_id: String,

        /// Fixed IP address on the port
        #[arg(long)]
        fixed_ip: IpAddr,
    },

    /// Detach a floating IP from its port
    Unassign {
        /// Floating IP ID
        id: String,
    },
}

/// Task tracking commands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Get task status and details
    Get {
        /// Task ID (UUID format)
        id: String,
    },

    /// Wait for one or more tasks to complete
    #[command(after_help = "EXAMPLES:
    # Wait for a single task
    nimbusctl task wait TASK_ID

    # Wait for several tasks in order, sharing one time budget
    nimbusctl task wait TASK_A TASK_B --timeout 600

    # Poll less aggressively
    nimbusctl task wait TASK_ID --interval 15
")]
    Wait {
        /// Task IDs to wait for, in order
        #[arg(required = true)]
        ids: Vec<String>,

        /// Maximum time to wait in seconds for the whole set
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Polling interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}
