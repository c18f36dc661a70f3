//! Multi-step workflows composing SDK operations
//!
//! These workflows submit an asynchronous mutation, poll every task in the
//! resulting envelope to completion, and fetch the produced resource.

use crate::error::{CoreError, Result};
use crate::progress::{ProgressCallback, wait_for_tasks};
use nimbus_cloud::floating_ips::{FloatingIp, FloatingIpCreateRequest};
use nimbus_cloud::gpu_images::{GpuImage, GpuImageUploadRequest};
use nimbus_cloud::{CloudClient, FloatingIpHandler, GpuImageHandler, GpuImageKind};
use std::time::Duration;

/// Upload a GPU image and wait for the server to finish downloading it
///
/// This is a convenience workflow that:
/// 1. Registers the image (returns task envelope)
/// 2. Polls every task in the envelope until all reach a terminal state
/// 3. Fetches and returns the created image
///
/// # Arguments
///
/// * `client` - The API client (must carry project/region scope)
/// * `kind` - Baremetal or virtual image family
/// * `request` - The upload request
/// * `timeout` - Maximum time to wait for completion
/// * `interval` - Time between polling attempts
/// * `on_progress` - Optional callback for progress updates
///
/// # Example
///
/// ```rust,ignore
/// use nimbus_cloud::GpuImageKind;
/// use nimbus_cloud::gpu_images::GpuImageUploadRequest;
/// use nimbusctl_core::upload_gpu_image_and_wait;
/// use std::time::Duration;
///
/// let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu");
///
/// let image = upload_gpu_image_and_wait(
///     &client,
///     GpuImageKind::Baremetal,
///     &request,
///     Duration::from_secs(600),
///     Duration::from_secs(5),
///     None,  // No progress callback
/// ).await?;
///
/// println!("Uploaded image: {}", image.name);
/// ```
pub async fn upload_gpu_image_and_wait(
    client: &CloudClient,
    kind: GpuImageKind,
    request: &GpuImageUploadRequest,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<GpuImage> {
    let handler = GpuImageHandler::new(client.clone(), kind);

    // Step 1: Register the image (returns task envelope)
    let results = handler.upload(request).await?;
    if results.tasks.is_empty() {
        return Err(CoreError::TaskFailed("No task ID returned".to_string()));
    }

    // Step 2: Drive the whole envelope to terminal state, collecting the
    // image IDs each finished task reports
    let image_ids = wait_for_tasks(
        client,
        &results.tasks,
        timeout,
        interval,
        on_progress,
        true,
        |task| {
            Ok(task
                .created_resources
                .as_ref()
                .map(|r| r.images.clone())
                .unwrap_or_default())
        },
    )
    .await?
    .unwrap_or_default();

    // Step 3: Fetch the created resource
    let image_id = image_ids
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| CoreError::TaskFailed("No image ID in completed task".to_string()))?;

    let image = handler.get(&image_id).await?;
    Ok(image)
}

/// Create a floating IP and wait for completion
///
/// # Arguments
///
/// * `client` - The API client (must carry project/region scope)
/// * `request` - Port and fixed IP to attach the floating IP to
/// * `timeout` - Maximum time to wait for completion
/// * `interval` - Time between polling attempts
/// * `on_progress` - Optional callback for progress updates
pub async fn create_floating_ip_and_wait(
    client: &CloudClient,
    request: &FloatingIpCreateRequest,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<FloatingIp> {
    let handler = FloatingIpHandler::new(client.clone());

    // Step 1: Create (returns task envelope)
    let results = handler.create(request).await?;
    if results.tasks.is_empty() {
        return Err(CoreError::TaskFailed("No task ID returned".to_string()));
    }

    // Step 2: Drive the whole envelope to terminal state
    let fip_ids = wait_for_tasks(
        client,
        &results.tasks,
        timeout,
        interval,
        on_progress,
        true,
        |task| {
            Ok(task
                .created_resources
                .as_ref()
                .map(|r| r.floating_ips.clone())
                .unwrap_or_default())
        },
    )
    .await?
    .unwrap_or_default();

    // Step 3: Fetch the created resource
    let fip_id = fip_ids
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| {
            CoreError::TaskFailed("No floating IP ID in completed task".to_string())
        })?;

    let floating_ip = handler.get(&fip_id).await?;
    Ok(floating_ip)
}

/// Delete a floating IP and wait for completion
///
/// # Arguments
///
/// * `client` - The API client (must carry project/region scope)
/// * `fip_id` - The floating IP to delete
/// * `timeout` - Maximum time to wait for completion
/// * `interval` - Time between polling attempts
/// * `on_progress` - Optional callback for progress updates
pub async fn delete_floating_ip_and_wait(
    client: &CloudClient,
    fip_id: &str,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let handler = FloatingIpHandler::new(client.clone());

    // Step 1: Delete (returns task envelope)
    let results = handler.delete(fip_id).await?;
    if results.tasks.is_empty() {
        return Err(CoreError::TaskFailed("No task ID returned".to_string()));
    }

    // Step 2: Poll every task until complete
    wait_for_tasks(
        client,
        &results.tasks,
        timeout,
        interval,
        on_progress,
        false,
        |_| Ok(()),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> CloudClient {
        CloudClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .project_id(1)
            .region_id(2)
            .build()
            .unwrap()
    }

    const FAST: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_upload_and_wait_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/gpu/baremetal/1/2/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-up"]})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-up"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "t-up", "state": "NEW"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-up",
                "state": "FINISHED",
                "created_resources": {"images": ["img-9"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/gpu/baremetal/1/2/images/img-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "img-9",
                "name": "ubuntu-gpu",
                "status": "ready"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu");
        let image = upload_gpu_image_and_wait(
            &client,
            GpuImageKind::Baremetal,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap();

        assert_eq!(image.id, "img-9");
        assert_eq!(image.name, "ubuntu-gpu");
    }

    #[tokio::test]
    async fn test_upload_and_wait_surfaces_task_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/gpu/virtual/1/2/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-up"]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-up",
                "state": "ERROR",
                "error": "image registry unreachable"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "img");
        let err = upload_gpu_image_and_wait(
            &client,
            GpuImageKind::Virtual,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("image registry unreachable"));

        // The image fetch never happened
        let fetched_image = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .any(|r| r.url.path().contains("/images/"));
        assert!(!fetched_image);
    }

    #[tokio::test]
    async fn test_upload_and_wait_rejects_empty_task_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/gpu/baremetal/1/2/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": []})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "img");
        let err = upload_gpu_image_and_wait(
            &client,
            GpuImageKind::Baremetal,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("No task ID returned"));
    }

    #[tokio::test]
    async fn test_create_floating_ip_and_wait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/floatingips/1/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-fip"]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-fip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-fip",
                "state": "FINISHED",
                "created_resources": {"floating_ips": ["fip-3"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/floatingips/1/2/fip-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "fip-3",
                "floating_ip_address": "203.0.113.20",
                "status": "ACTIVE"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = FloatingIpCreateRequest::new("port-1", "10.0.0.5".parse().unwrap());
        let floating_ip = create_floating_ip_and_wait(
            &client,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap();

        assert_eq!(floating_ip.id, "fip-3");
        assert_eq!(floating_ip.status.as_deref(), Some("ACTIVE"));
    }

    #[tokio::test]
    async fn test_delete_floating_ip_and_wait() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/floatingips/1/2/fip-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-del"]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-del"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-del",
                "state": "FINISHED"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        delete_floating_ip_and_wait(&client, "fip-3", Duration::from_secs(5), FAST, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_and_wait_polls_every_task_in_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/gpu/baremetal/1/2/images"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-1", "t-2"]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-1",
                "state": "FINISHED",
                "created_resources": {"images": ["img-1"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "t-2", "state": "RUNNING"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "t-2", "state": "FINISHED"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/gpu/baremetal/1/2/images/img-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "img-1",
                "name": "ubuntu-gpu",
                "status": "ready"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu");
        let image = upload_gpu_image_and_wait(
            &client,
            GpuImageKind::Baremetal,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap();

        assert_eq!(image.id, "img-1");

        // The second task was polled through to its terminal state
        let second_task_polls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path().ends_with("/tasks/t-2"))
            .count();
        assert_eq!(second_task_polls, 2);
    }

    #[tokio::test]
    async fn test_upload_and_wait_fails_when_sibling_task_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/gpu/baremetal/1/2/images"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-1", "t-2"]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-1",
                "state": "FINISHED",
                "created_resources": {"images": ["img-1"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-2",
                "state": "ERROR",
                "error": "replica sync failed"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = GpuImageUploadRequest::new("https://example.com/img.qcow2", "ubuntu-gpu");
        let err = upload_gpu_image_and_wait(
            &client,
            GpuImageKind::Baremetal,
            &request,
            Duration::from_secs(5),
            FAST,
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("replica sync failed"));

        // No success while a sibling failed: the image was never fetched
        let fetched_image = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .any(|r| r.url.path().contains("/images/"));
        assert!(!fetched_image);
    }

    #[tokio::test]
    async fn test_delete_and_wait_polls_every_task_in_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/floatingips/1/2/fip-3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-a", "t-b"]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-a"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "t-a", "state": "FINISHED"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t-b"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "t-b", "state": "FINISHED"})),
            )
            .expect(1..)
            .mount(&server)
            .await;

        let client = test_client(&server);
        delete_floating_ip_and_wait(&client, "fip-3", Duration::from_secs(5), FAST, None)
            .await
            .unwrap();
    }
}
