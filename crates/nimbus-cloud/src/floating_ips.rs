//! Floating IP endpoints
//!
//! Create and delete are asynchronous and answer with a task envelope;
//! assign and unassign act on the port mapping directly and answer with the
//! updated floating IP.

use crate::client::CloudClient;
use crate::error::Result;
use crate::tasks::TaskResults;
use crate::types::Page;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A floating IP as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floating_ip_address: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<u32>,
}

/// Body for creating a floating IP or assigning one to a port.
///
/// Both operations take the same two fields and both are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingIpCreateRequest {
    pub port_id: String,
    pub fixed_ip_address: IpAddr,
}

impl FloatingIpCreateRequest {
    pub fn new(port_id: impl Into<String>, fixed_ip_address: IpAddr) -> Self {
        Self {
            port_id: port_id.into(),
            fixed_ip_address,
        }
    }
}

/// Handler for floating IP endpoints, scoped to the client's project/region
pub struct FloatingIpHandler {
    client: CloudClient,
}

impl FloatingIpHandler {
    pub fn new(client: CloudClient) -> Self {
        Self { client }
    }

    fn base(&self) -> Result<String> {
        let (project_id, region_id) = self.client.scope()?;
        Ok(format!("v1/floatingips/{project_id}/{region_id}"))
    }

    /// List the first page of floating IPs
    pub async fn list(&self) -> Result<Page<FloatingIp>> {
        self.client.get(&self.base()?).await
    }

    /// List all floating IPs, following pagination links
    pub async fn list_all(&self) -> Result<Vec<FloatingIp>> {
        self.client.collect_pages(&self.base()?).await
    }

    /// Get a floating IP by ID
    pub async fn get(&self, fip_id: &str) -> Result<FloatingIp> {
        self.client.get(&format!("{}/{fip_id}", self.base()?)).await
    }

    /// Create a floating IP attached to a port (asynchronous)
    pub async fn create(&self, request: &FloatingIpCreateRequest) -> Result<TaskResults> {
        self.client.post(&self.base()?, request).await
    }

    /// Delete a floating IP (asynchronous)
    pub async fn delete(&self, fip_id: &str) -> Result<TaskResults> {
        self.client
            .delete(&format!("{}/{fip_id}", self.base()?))
            .await
    }

    /// Assign a floating IP to a port (synchronous)
    pub async fn assign(
        &self,
        fip_id: &str,
        request: &FloatingIpCreateRequest,
    ) -> Result<FloatingIp> {
        self.client
            .post(&format!("{}/{fip_id}/assign", self.base()?), request)
            .await
    }

    /// Detach a floating IP from its port (synchronous, no request body)
    pub async fn unassign(&self, fip_id: &str) -> Result<FloatingIp> {
        self.client
            .post_empty(&format!("{}/{fip_id}/unassign", self.base()?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handler(server: &MockServer) -> FloatingIpHandler {
        let client = CloudClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .project_id(1234)
            .region_id(7)
            .build()
            .unwrap();
        FloatingIpHandler::new(client)
    }

    #[test]
    fn test_create_request_serializes_both_fields() {
        let request = FloatingIpCreateRequest::new("port-1", "192.168.1.5".parse().unwrap());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"port_id": "port-1", "fixed_ip_address": "192.168.1.5"})
        );
    }

    #[tokio::test]
    async fn test_create_posts_to_scoped_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/floatingips/1234/7"))
            .and(body_json(json!({
                "port_id": "port-1",
                "fixed_ip_address": "10.0.0.12"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-1"]})))
            .expect(1)
            .mount(&server)
            .await;

        let request = FloatingIpCreateRequest::new("port-1", "10.0.0.12".parse().unwrap());
        let results = handler(&server).create(&request).await.unwrap();
        assert_eq!(results.tasks, vec!["t-1"]);
    }

    #[tokio::test]
    async fn test_delete_returns_task_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/floatingips/1234/7/fip-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": ["t-2"]})))
            .expect(1)
            .mount(&server)
            .await;

        let results = handler(&server).delete("fip-9").await.unwrap();
        assert_eq!(results.tasks, vec!["t-2"]);
    }

    #[tokio::test]
    async fn test_assign_and_unassign_return_floating_ip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/floatingips/1234/7/fip-9/assign"))
            .and(body_json(json!({
                "port_id": "port-2",
                "fixed_ip_address": "10.0.0.3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "fip-9",
                "port_id": "port-2",
                "status": "ACTIVE"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/floatingips/1234/7/fip-9/unassign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "fip-9",
                "status": "DOWN"
            })))
            .mount(&server)
            .await;

        let h = handler(&server);
        let request = FloatingIpCreateRequest::new("port-2", "10.0.0.3".parse().unwrap());
        let assigned = h.assign("fip-9", &request).await.unwrap();
        assert_eq!(assigned.port_id.as_deref(), Some("port-2"));

        let released = h.unassign("fip-9").await.unwrap();
        assert_eq!(released.status.as_deref(), Some("DOWN"));
        assert!(released.port_id.is_none());
    }

    #[tokio::test]
    async fn test_list_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/floatingips/1234/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{
                    "id": "fip-1",
                    "floating_ip_address": "203.0.113.9",
                    "status": "ACTIVE"
                }],
                "next": null
            })))
            .mount(&server)
            .await;

        let page = handler(&server).list().await.unwrap();
        assert_eq!(page.count, Some(1));
        assert_eq!(page.results[0].id, "fip-1");
        assert_eq!(
            page.results[0].floating_ip_address,
            Some("203.0.113.9".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn test_unscoped_client_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let client = CloudClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .build()
            .unwrap();

        let err = FloatingIpHandler::new(client).list().await.unwrap_err();
        assert!(err.to_string().contains("project ID"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
