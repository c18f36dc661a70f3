//! Rust client for the Nimbus Cloud REST API
//!
//! Covers GPU image management (baremetal and virtual), floating IPs, and
//! the task endpoints that track asynchronous operations. Handlers share one
//! [`CloudClient`], which carries the base URL, API token, and the
//! project/region scope most endpoints embed in their paths.
//!
//! Asynchronous mutations (image upload, floating IP create/delete) answer
//! with a [`TaskResults`] envelope; poll the IDs with [`TaskHandler`] until
//! each task reaches a terminal [`TaskState`].
//!
//! # Example
//!
//! ```rust,no_run
//! use nimbus_cloud::{CloudClient, GpuImageHandler, GpuImageKind};
//! use nimbus_cloud::gpu_images::GpuImageUploadRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CloudClient::builder()
//!         .api_key("nim_live_...")
//!         .project_id(1234)
//!         .region_id(7)
//!         .build()?;
//!
//!     let images = GpuImageHandler::new(client, GpuImageKind::Baremetal);
//!     let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu");
//!     let results = images.upload(&request).await?;
//!     println!("waiting on tasks: {:?}", results.tasks);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod floating_ips;
pub mod gpu_images;
pub mod tasks;
pub mod types;

pub use client::{CloudClient, CloudClientBuilder, DEFAULT_API_URL};
pub use error::{CloudError, Result};
pub use floating_ips::{FloatingIp, FloatingIpCreateRequest, FloatingIpHandler};
pub use gpu_images::{GpuImage, GpuImageHandler, GpuImageKind, GpuImageUploadRequest};
pub use tasks::{Task, TaskHandler, TaskResults, TaskState};
pub use types::{MetadataValue, Page};
