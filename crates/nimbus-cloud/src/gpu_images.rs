//! GPU image endpoints
//!
//! GPU images come in two flavours, baremetal and virtual, which share one
//! request/response shape and differ only in the path segment. A
//! [`GpuImageHandler`] is bound to one flavour at construction.
//!
//! Upload is asynchronous: the server registers the image, answers with a
//! task envelope, and downloads the image from the given URL in the
//! background.

use crate::client::CloudClient;
use crate::error::{CloudError, Result};
use crate::tasks::TaskResults;
use crate::types::{MetadataValue, Page};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which GPU image family a handler addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuImageKind {
    Baremetal,
    Virtual,
}

impl GpuImageKind {
    fn as_path_segment(&self) -> &'static str {
        match self {
            GpuImageKind::Baremetal => "baremetal",
            GpuImageKind::Virtual => "virtual",
        }
    }
}

impl fmt::Display for GpuImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

/// Whether instances booted from the image may use SSH keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SshKeyPolicy {
    Allow,
    Deny,
}

impl fmt::Display for SshKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshKeyPolicy::Allow => f.write_str("allow"),
            SshKeyPolicy::Deny => f.write_str("deny"),
        }
    }
}

impl FromStr for SshKeyPolicy {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(SshKeyPolicy::Allow),
            "deny" => Ok(SshKeyPolicy::Deny),
            _ => Err(CloudError::ValidationError {
                message: format!("invalid SSH key policy '{s}' (expected allow or deny)"),
            }),
        }
    }
}

/// CPU architecture of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageArchitecture {
    Aarch64,
    X86_64,
}

impl fmt::Display for ImageArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageArchitecture::Aarch64 => f.write_str("aarch64"),
            ImageArchitecture::X86_64 => f.write_str("x86_64"),
        }
    }
}

impl FromStr for ImageArchitecture {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aarch64" => Ok(ImageArchitecture::Aarch64),
            "x86_64" => Ok(ImageArchitecture::X86_64),
            _ => Err(CloudError::ValidationError {
                message: format!("invalid architecture '{s}' (expected aarch64 or x86_64)"),
            }),
        }
    }
}

/// Operating system family of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsType {
    Linux,
    Windows,
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsType::Linux => f.write_str("linux"),
            OsType::Windows => f.write_str("windows"),
        }
    }
}

impl FromStr for OsType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(OsType::Linux),
            "windows" => Ok(OsType::Windows),
            _ => Err(CloudError::ValidationError {
                message: format!("invalid OS type '{s}' (expected linux or windows)"),
            }),
        }
    }
}

/// Firmware used to boot guests from the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HwFirmwareType {
    Bios,
    Uefi,
}

impl fmt::Display for HwFirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HwFirmwareType::Bios => f.write_str("bios"),
            HwFirmwareType::Uefi => f.write_str("uefi"),
        }
    }
}

impl FromStr for HwFirmwareType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bios" => Ok(HwFirmwareType::Bios),
            "uefi" => Ok(HwFirmwareType::Uefi),
            _ => Err(CloudError::ValidationError {
                message: format!("invalid firmware type '{s}' (expected bios or uefi)"),
            }),
        }
    }
}

/// Body for registering a GPU image.
///
/// `url` and `name` are required; everything else is omitted from the wire
/// when unset.
///
/// # Example
///
/// ```rust
/// use nimbus_cloud::gpu_images::{GpuImageUploadRequest, OsType};
///
/// let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu")
///     .with_os_type(OsType::Linux)
///     .with_os_version("22.04");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuImageUploadRequest {
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<SshKeyPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cow_format: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<ImageArchitecture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_distro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OsType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_firmware_type: Option<HwFirmwareType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
}

impl GpuImageUploadRequest {
    /// New upload request with the required fields
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            ssh_key: None,
            cow_format: None,
            architecture: None,
            os_distro: None,
            os_type: None,
            os_version: None,
            hw_firmware_type: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_ssh_key(mut self, policy: SshKeyPolicy) -> Self {
        self.ssh_key = Some(policy);
        self
    }

    /// Copy-on-write format: the image cannot be deleted while volumes
    /// created from it exist
    #[must_use]
    pub fn with_cow_format(mut self, cow_format: bool) -> Self {
        self.cow_format = Some(cow_format);
        self
    }

    #[must_use]
    pub fn with_architecture(mut self, architecture: ImageArchitecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    #[must_use]
    pub fn with_os_distro(mut self, os_distro: impl Into<String>) -> Self {
        self.os_distro = Some(os_distro.into());
        self
    }

    #[must_use]
    pub fn with_os_type(mut self, os_type: OsType) -> Self {
        self.os_type = Some(os_type);
        self
    }

    #[must_use]
    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = Some(os_version.into());
        self
    }

    #[must_use]
    pub fn with_hw_firmware_type(mut self, hw_firmware_type: HwFirmwareType) -> Self {
        self.hw_firmware_type = Some(hw_firmware_type);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, MetadataValue>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A GPU image as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuImage {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<SshKeyPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cow_format: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<ImageArchitecture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_distro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OsType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_firmware_type: Option<HwFirmwareType>,
    /// Image size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<u32>,
}

/// Handler for one GPU image family, scoped to the client's project/region
pub struct GpuImageHandler {
    client: CloudClient,
    kind: GpuImageKind,
}

impl GpuImageHandler {
    pub fn new(client: CloudClient, kind: GpuImageKind) -> Self {
        Self { client, kind }
    }

    fn base(&self) -> Result<String> {
        let (project_id, region_id) = self.client.scope()?;
        Ok(format!(
            "v3/gpu/{}/{project_id}/{region_id}/images",
            self.kind.as_path_segment()
        ))
    }

    /// Register an image for background download (asynchronous)
    pub async fn upload(&self, request: &GpuImageUploadRequest) -> Result<TaskResults> {
        self.client.post(&self.base()?, request).await
    }

    /// List the first page of images
    pub async fn list(&self) -> Result<Page<GpuImage>> {
        self.client.get(&self.base()?).await
    }

    /// List all images, following pagination links
    pub async fn list_all(&self) -> Result<Vec<GpuImage>> {
        self.client.collect_pages(&self.base()?).await
    }

    /// Get an image by ID
    pub async fn get(&self, image_id: &str) -> Result<GpuImage> {
        self.client
            .get(&format!("{}/{image_id}", self.base()?))
            .await
    }
}
