//! Tests for command output formatting

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn test_gpu_image_table_format() {
        // Test data that mimics real API responses
        let test_data = json!([
            {
                "id": "726ecfcc-7fd0-4e30-a86e-7892524aa483",
                "name": "ubuntu-gpu",
                "status": "active",
                "size": 5368709120_i64,
                "os_distro": "ubuntu",
                "os_version": "22.04",
                "created_at": "2026-08-20T10:30:00Z",
                "architecture": "x86_64",
                "hw_firmware_type": "uefi"
            },
            {
                "id": "44e136f9-bc18-4d18-9cbf-b3a3a3096ff5",
                "name": "rocky-train",
                "status": "creating",
                "os_distro": "rocky",
                "created_at": "2026-08-21T08:00:00Z"
            }
        ]);

        // Just verify the test data structure is valid
        assert!(test_data.is_array());
        assert_eq!(test_data.as_array().unwrap().len(), 2);

        // Verify we can extract expected fields
        let first = &test_data[0];
        assert_eq!(first["id"], "726ecfcc-7fd0-4e30-a86e-7892524aa483");
        assert_eq!(first["name"], "ubuntu-gpu");
        assert_eq!(first["status"], "active");
    }

    #[test]
    fn test_floating_ip_table_format() {
        let test_data = json!([
            {
                "id": "e8ab1be4-1bc5-4d09-9cf9-dd7b1b535b1f",
                "floating_ip_address": "172.24.4.34",
                "fixed_ip_address": "10.0.0.12",
                "port_id": "1f0ca6ef-358b-41bd-9f3b-5a873a0b6a55",
                "status": "ACTIVE"
            },
            {
                "id": "0dc342ed-77c5-4b3d-88c4-ba4d11a54ffe",
                "floating_ip_address": "172.24.4.42",
                "status": "DOWN"
            }
        ]);

        assert!(test_data.is_array());
        let second = &test_data[1];
        // Unattached addresses have no port or fixed IP
        assert!(second["port_id"].is_null());
        assert_eq!(second["status"], "DOWN");
    }

    #[test]
    fn test_jmespath_filtering() {
        let data = json!([
            {"id": "a", "status": "active", "size": 4},
            {"id": "b", "status": "creating", "size": 2},
            {"id": "c", "status": "active", "size": 8}
        ]);

        let expr = jpx_core::compile("[?status=='active']").unwrap();
        let filtered = expr.search(&data).unwrap();

        assert!(filtered.is_array());
        assert_eq!(filtered.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_jmespath_extended_functions() {
        let runtime = jpx_core::Runtime::builder().with_all_extensions().build();

        let data = json!([
            {"id": "a", "name": "ubuntu-gpu", "status": "active", "size_bytes": 5368709120_i64},
            {"id": "b", "name": "rocky-train", "status": "creating", "size_bytes": 2147483648_i64},
            {"id": "c", "name": "debian-infer", "status": "active", "size_bytes": 1073741824_i64}
        ]);

        // Test upper() function
        let expr = runtime
            .compile("[].{name: name, status: upper(status)}")
            .unwrap();
        let transformed = expr.search(&data).unwrap();
        assert_eq!(transformed[0]["status"], "ACTIVE");
        assert_eq!(transformed[1]["status"], "CREATING");

        // Test unique() function
        let expr = runtime.compile("unique([].status)").unwrap();
        let unique_statuses = expr.search(&data).unwrap();
        assert!(unique_statuses.is_array());
        assert_eq!(unique_statuses.as_array().unwrap().len(), 2);

        // Test type_of() function
        let expr = runtime
            .compile("[0].{name: name, type: type_of(size_bytes)}")
            .unwrap();
        let type_check = expr.search(&data).unwrap();
        assert_eq!(type_check["type"], "number");

        // Test is_empty() function
        let empty_data = json!({"tasks": [], "name": "test"});
        let expr = runtime
            .compile("{is_empty_tasks: is_empty(tasks)}")
            .unwrap();
        let empty_check = expr.search(&empty_data).unwrap();
        assert_eq!(empty_check["is_empty_tasks"], true);
    }

    #[test]
    fn test_jmespath_created_resources_extraction() {
        // The shape a finished task comes back with
        let task = json!({
            "id": "f28a4982-9be1-4e50-84e7-6d1a6d3f8a02",
            "state": "FINISHED",
            "task_type": "upload_gpu_image",
            "created_resources": {
                "images": ["726ecfcc-7fd0-4e30-a86e-7892524aa483"],
                "floating_ips": []
            }
        });

        let expr = jpx_core::compile("created_resources.images[0]").unwrap();
        let image_id = expr.search(&task).unwrap();
        assert_eq!(image_id, json!("726ecfcc-7fd0-4e30-a86e-7892524aa483"));

        // Task envelopes from async mutations are a plain ID list
        let envelope = json!({"tasks": ["t-1", "t-2"]});
        let expr = jpx_core::compile("tasks | length(@)").unwrap();
        let count = expr.search(&envelope).unwrap();
        assert_eq!(count, json!(2));
    }

    #[test]
    fn test_jmespath_extended_string_functions() {
        let runtime = jpx_core::Runtime::builder().with_all_extensions().build();

        let data = json!({
            "name": "  ubuntu-gpu-image  ",
            "url": "https://images.example.com/ubuntu.qcow2"
        });

        // Test trim() function
        let expr = runtime.compile("trim(name)").unwrap();
        let result = expr.search(&data).unwrap();
        assert_eq!(result, json!("ubuntu-gpu-image"));

        // Test split() function
        let expr = runtime.compile("split(name, '-')").unwrap();
        let parts = expr.search(&data).unwrap();
        assert!(parts.is_array());
    }

    #[test]
    fn test_jmespath_extended_utility_functions() {
        let runtime = jpx_core::Runtime::builder().with_all_extensions().build();

        let data = json!({
            "floating_ip_address": null,
            "fixed_ip_address": "10.0.0.12"
        });

        // Test coalesce() function - returns first non-null value
        let expr = runtime
            .compile("coalesce(floating_ip_address, fixed_ip_address, `\"unassigned\"`)")
            .unwrap();
        let result = expr.search(&data).unwrap();
        assert_eq!(result, json!("10.0.0.12"));

        // Test default() function
        let expr = runtime
            .compile("default(floating_ip_address, `\"unassigned\"`)")
            .unwrap();
        let result = expr.search(&data).unwrap();
        assert_eq!(result, json!("unassigned"));
    }
}
