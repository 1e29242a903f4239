//! Users API Integration Tests
//!
//! Drives the assembled router end to end against the in-memory store and
//! identity provider.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use ua_platform::store::StoredRecord;
use ua_platform::{
    build_router, AppServices, DocumentStore, IdentityProvider, MemoryDocumentStore, MemoryIdentityProvider,
    PutCondition, RouterOptions, SignUpRequest, StoreError,
};

struct TestApp {
    router: Router,
    store: Arc<MemoryDocumentStore>,
    idp: Arc<MemoryIdentityProvider>,
}

fn test_app() -> TestApp {
    let store = MemoryDocumentStore::new_shared();
    let idp = Arc::new(MemoryIdentityProvider::new());
    let router = build_router(AppServices::new(store.clone(), idp.clone()), RouterOptions::default());
    TestApp { router, store, idp }
}

fn app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    let idp: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentityProvider::new());
    build_router(AppServices::new(store, idp), RouterOptions::default())
}

async fn send(router: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder().method(method).uri(path).body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

async fn role(router: &Router, name: &str) -> Value {
    let (status, _, body) = send(router, "GET", &format!("/roles/{}", name), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

mod role_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_role_module_permission_scenario() {
        let app = test_app();
        let r = &app.router;

        let (status, _, body) = send(r, "POST", "/roles", Some(json!({"name": "Admin"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Role Created successfully"}));

        let (status, _, body) = send(r, "POST", "/roles", Some(json!({"name": "admin"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"message": "Role already exist with admin"}));

        let (status, _, body) = send(
            r,
            "POST",
            "/modules/Admin",
            Some(json!({"name": "Billing", "permissions": []})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Module Added successfully"}));

        let (status, _, body) = send(r, "POST", "/permissions/Admin/Billing", Some(json!(["view", "edit"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Permission Added successfully"}));

        let (status, _, body) = send(r, "DELETE", "/permissions/Admin/Billing", Some(json!(["view"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Permissions Deleted successfully"}));

        let (status, _, roles) = send(r, "GET", "/roles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            roles,
            json!([{"name": "Admin", "modules": [{"name": "Billing", "permissions": ["edit"]}], "childRoles": []}])
        );
    }

    #[tokio::test]
    async fn test_create_conflict_ignores_case_both_ways() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "admin"}))).await;

        for name in ["Admin", "ADMIN", "admin"] {
            let (status, _, _) = send(r, "POST", "/roles", Some(json!({"name": name}))).await;
            assert_eq!(status, StatusCode::CONFLICT);
        }
    }

    #[tokio::test]
    async fn test_permissions_union_not_replace() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "Admin", "modules": [{"name": "Billing"}]}))).await;

        send(r, "POST", "/permissions/Admin/Billing", Some(json!(["read"]))).await;
        send(r, "POST", "/permissions/Admin/billing", Some(json!(["read", "write"]))).await;
        assert_eq!(role(r, "Admin").await["modules"][0]["permissions"], json!(["read", "write"]));

        let (status, _, _) = send(r, "DELETE", "/permissions/Admin/Billing", Some(json!(["missing"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(role(r, "Admin").await["modules"][0]["permissions"], json!(["read", "write"]));
    }

    #[tokio::test]
    async fn test_update_role_validates_children_then_role() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "Admin"}))).await;
        send(r, "POST", "/roles", Some(json!({"name": "Viewer"}))).await;

        let (status, _, body) = send(r, "PUT", "/roles/Ghost", Some(json!(["viewer"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Invalid roles provided [viewer]"}));

        let (status, _, body) = send(r, "PUT", "/roles/Ghost", Some(json!(["Viewer"]))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Role does not exist for Ghost"}));

        let (status, _, body) = send(r, "PUT", "/roles/Admin", Some(json!(["Viewer"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Role Updated successfully"}));
        assert_eq!(role(r, "Admin").await["childRoles"], json!(["Viewer"]));
    }

    #[tokio::test]
    async fn test_delete_modules_exact_match() {
        let app = test_app();
        let r = &app.router;
        send(
            r,
            "POST",
            "/roles",
            Some(json!({"name": "Admin", "modules": [{"name": "Billing"}, {"name": "Reports"}]})),
        )
        .await;

        let (status, _, body) = send(r, "DELETE", "/modules/Admin", Some(json!(["billing", "Reports"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Module Deleted successfully"}));
        assert_eq!(role(r, "Admin").await["modules"], json!([{"name": "Billing", "permissions": []}]));
    }

    #[tokio::test]
    async fn test_unknown_role_returns_404_with_zero_writes() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "Admin", "modules": [{"name": "Billing"}]}))).await;
        let writes = app.store.write_count();

        let calls = [
            ("POST", "/modules/Ghost", json!({"name": "Billing"})),
            ("DELETE", "/modules/Ghost", json!(["Billing"])),
            ("POST", "/permissions/Ghost/Billing", json!(["view"])),
            ("DELETE", "/permissions/Ghost/Billing", json!(["view"])),
            ("POST", "/permissions/Admin/Reports", json!(["view"])),
            ("PUT", "/roles/Ghost", json!([])),
        ];
        for (method, path, body) in calls {
            let (status, _, _) = send(r, method, path, Some(body)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, path);
        }

        let (status, _, body) = send(r, "POST", "/permissions/Admin/Reports", Some(json!(["view"]))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Module does not exist for Reports"}));
        assert_eq!(app.store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_untyped_list_rejected() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "Admin", "modules": [{"name": "Billing"}]}))).await;

        let (status, _, body) = send(r, "POST", "/permissions/Admin/Billing", Some(json!(["view", 7]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Malformed request body"));
    }
}

mod user_api_tests {
    use super::*;

    async fn with_roles(names: &[&str]) -> TestApp {
        let app = test_app();
        for name in names {
            send(&app.router, "POST", "/roles", Some(json!({"name": name}))).await;
        }
        app
    }

    fn new_user(username: &str, roles: Value) -> Value {
        json!({
            "username": username,
            "password": "Secret-123",
            "email": format!("{}@example.com", username),
            "roles": roles
        })
    }

    #[tokio::test]
    async fn test_create_and_list_users() {
        let app = with_roles(&["a"]).await;
        let r = &app.router;

        let (status, _, body) = send(r, "POST", "/users", Some(new_user("jdoe", json!(["a", "a"])))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User Saved successfully"}));
        assert!(app.idp.account("jdoe").is_some());

        let (status, _, users) = send(r, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users, json!([{"username": "jdoe", "roles": ["a"], "status": "ACTIVE"}]));
    }

    #[tokio::test]
    async fn test_create_with_unknown_role_skips_identity_provider() {
        let app = with_roles(&["a"]).await;
        let (status, _, body) = send(&app.router, "POST", "/users", Some(new_user("jdoe", json!(["a", "b"])))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Invalid roles provided [a, b]"}));
        assert_eq!(app.idp.account_count(), 0);
    }

    #[tokio::test]
    async fn test_assign_unknown_role_is_400_whether_or_not_user_exists() {
        let app = with_roles(&["a"]).await;
        let r = &app.router;
        send(r, "POST", "/users", Some(new_user("jdoe", json!([])))).await;

        for username in ["jdoe", "ghost"] {
            let (status, _, _) = send(r, "POST", &format!("/users/{}/roles", username), Some(json!(["x"]))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, _, body) = send(r, "POST", "/users/ghost/roles", Some(json!(["a"]))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "User not found for ghost"}));
    }

    #[tokio::test]
    async fn test_assign_roles_is_idempotent() {
        let app = with_roles(&["a"]).await;
        let r = &app.router;
        send(r, "POST", "/users", Some(new_user("jdoe", json!([])))).await;

        let (status, _, body) = send(r, "POST", "/users/jdoe/roles", Some(json!(["a", "a"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User Updated successfully"}));
        send(r, "POST", "/users/jdoe/roles", Some(json!(["a"]))).await;

        let (_, _, user) = send(r, "GET", "/users/jdoe", None).await;
        assert_eq!(user["roles"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_suspend_user() {
        let app = with_roles(&[]).await;
        let r = &app.router;
        send(r, "POST", "/users", Some(new_user("jdoe", json!([])))).await;

        let (status, _, body) = send(r, "POST", "/users/jdoe/suspend", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User Suspended successfully"}));
        assert!(!app.idp.account("jdoe").unwrap().enabled);

        let (_, _, user) = send(r, "GET", "/users/jdoe", None).await;
        assert_eq!(user["status"], "SUSPENDED");

        let (status, _, _) = send(r, "POST", "/users/ghost/suspend", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_identity_provider_failure_is_400_with_raw_message() {
        let app = with_roles(&[]).await;
        let r = &app.router;
        send(r, "POST", "/users", Some(new_user("jdoe", json!([])))).await;

        let (status, _, body) = send(r, "POST", "/users", Some(new_user("jdoe", json!([])))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "User account already exists: jdoe"}));
    }
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_unmatched_route_is_404_json() {
        let app = test_app();
        let (status, headers, body) = send(&app.router, "GET", "/nothing/here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "No implementation found for GET /nothing/here"}));
        assert_eq!(headers["content-type"], "application/json");

        let (status, _, body) = send(&app.router, "PATCH", "/roles", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "No implementation found for PATCH /roles"}));
    }

    #[tokio::test]
    async fn test_every_response_carries_headers() {
        let app = test_app();
        for (method, path, body) in [
            ("GET", "/roles", None),
            ("POST", "/roles", Some(json!({"name": "Admin"}))),
            ("POST", "/roles", Some(json!({"name": "Admin"}))),
            ("GET", "/health", None),
        ] {
            let (_, headers, _) = send(&app.router, method, path, body).await;
            assert_eq!(headers["content-type"], "application/json");
            assert_eq!(headers["x-custom-header"], "application/json");
        }
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let app = test_app();
        let (status, _, doc) = send(&app.router, "GET", "/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/roles",
            "/roles/{roleName}",
            "/modules/{roleName}",
            "/permissions/{roleName}/{moduleName}",
            "/users",
            "/users/{username}/roles",
            "/users/{username}/suspend",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}

mod consistency_tests {
    use super::*;

    /// Lets another writer bump the record before each of the first
    /// `contended` version-checked puts.
    struct ContendedStore {
        inner: MemoryDocumentStore,
        contended: AtomicU32,
    }

    #[async_trait]
    impl DocumentStore for ContendedStore {
        async fn get(&self, table: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
            self.inner.get(table, key).await
        }

        async fn query(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<StoredRecord>, StoreError> {
            self.inner.query(table, attribute, value).await
        }

        async fn scan(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
            self.inner.scan(table).await
        }

        async fn put(&self, table: &str, key: &str, body: Value, condition: PutCondition) -> Result<u64, StoreError> {
            if let PutCondition::Version(_) = condition {
                let contend = self
                    .contended
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
                if contend {
                    if let Some(current) = self.inner.get(table, key).await? {
                        self.inner
                            .put(table, key, current.body, PutCondition::Version(current.version))
                            .await?;
                    }
                }
            }
            self.inner.put(table, key, body, condition).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }

        fn name(&self) -> &'static str {
            "contended"
        }
    }

    fn contended(times: u32) -> Arc<ContendedStore> {
        Arc::new(ContendedStore {
            inner: MemoryDocumentStore::new(),
            contended: AtomicU32::new(times),
        })
    }

    #[tokio::test]
    async fn test_lost_race_is_retried() {
        let store = contended(0);
        let r = app_with_store(store.clone());
        send(&r, "POST", "/roles", Some(json!({"name": "Admin", "modules": [{"name": "Billing"}]}))).await;
        store.contended.store(2, Ordering::SeqCst);

        let (status, _, _) = send(&r, "POST", "/permissions/Admin/Billing", Some(json!(["view"]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(role(&r, "Admin").await["modules"][0]["permissions"], json!(["view"]));
    }

    #[tokio::test]
    async fn test_persistent_contention_is_409() {
        let store = contended(0);
        let r = app_with_store(store.clone());
        send(&r, "POST", "/roles", Some(json!({"name": "Admin"}))).await;
        store.contended.store(100, Ordering::SeqCst);

        let (status, _, body) = send(&r, "POST", "/modules/Admin", Some(json!({"name": "Billing"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"message": "Concurrent modification of Admin, please retry"}));
    }

    #[tokio::test]
    async fn test_concurrent_permission_merges_are_not_lost() {
        let app = test_app();
        let r = &app.router;
        send(r, "POST", "/roles", Some(json!({"name": "Admin", "modules": [{"name": "Billing"}]}))).await;

        let mut tasks = Vec::new();
        for i in 0..2 {
            let router = app.router.clone();
            tasks.push(tokio::spawn(async move {
                send(&router, "POST", "/permissions/Admin/Billing", Some(json!([format!("p{}", i)]))).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().0, StatusCode::OK);
        }

        assert_eq!(role(r, "Admin").await["modules"][0]["permissions"], json!(["p0", "p1"]));
    }

    /// Refuses every write to the users table.
    struct UsersReadOnlyStore {
        inner: MemoryDocumentStore,
    }

    #[async_trait]
    impl DocumentStore for UsersReadOnlyStore {
        async fn get(&self, table: &str, key: &str) -> Result<Option<StoredRecord>, StoreError> {
            self.inner.get(table, key).await
        }

        async fn query(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<StoredRecord>, StoreError> {
            self.inner.query(table, attribute, value).await
        }

        async fn scan(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
            self.inner.scan(table).await
        }

        async fn put(&self, table: &str, key: &str, body: Value, condition: PutCondition) -> Result<u64, StoreError> {
            if table == "Users" {
                return Err(StoreError::Serialization("write rejected".to_string()));
            }
            self.inner.put(table, key, body, condition).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "users-read-only"
        }
    }

    #[tokio::test]
    async fn test_record_write_failure_leaves_identity_registered() {
        let store = Arc::new(UsersReadOnlyStore {
            inner: MemoryDocumentStore::new(),
        });
        let idp = Arc::new(MemoryIdentityProvider::new());
        let r = build_router(AppServices::new(store, idp.clone()), RouterOptions::default());

        let (status, _, body) = send(
            &r,
            "POST",
            "/users",
            Some(json!({"username": "jdoe", "password": "Secret-123", "email": "jdoe@example.com", "roles": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Serialization error: write rejected"}));
        assert!(idp.account("jdoe").is_some());
    }

    #[tokio::test]
    async fn test_record_write_failure_after_disable_leaves_user_active() {
        let inner = MemoryDocumentStore::new();
        inner
            .put(
                "Users",
                "jdoe",
                json!({"username": "jdoe", "roles": [], "status": "ACTIVE"}),
                PutCondition::NotExists,
            )
            .await
            .unwrap();
        let store = Arc::new(UsersReadOnlyStore { inner });
        let idp = Arc::new(MemoryIdentityProvider::new());
        idp.sign_up(SignUpRequest {
            username: "jdoe".to_string(),
            password: "Secret-123".to_string(),
            email: "jdoe@example.com".to_string(),
        })
        .await
        .unwrap();
        let r = build_router(AppServices::new(store.clone(), idp.clone()), RouterOptions::default());

        let (status, _, body) = send(&r, "POST", "/users/jdoe/suspend", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Serialization error: write rejected"}));

        assert!(!idp.account("jdoe").unwrap().enabled);
        let record = store.inner.get("Users", "jdoe").await.unwrap().unwrap();
        assert_eq!(record.body["status"], "ACTIVE");
    }
}

mod gateway_tests {
    use super::*;
    use ua_platform::{handle_event, GatewayEvent};

    fn event(value: Value) -> GatewayEvent {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_gateway_event_round_trip() {
        let app = test_app();

        let response = handle_event(
            app.router.clone(),
            event(json!({
                "routeKey": "POST /roles",
                "rawPath": "/roles",
                "body": "{\"name\":\"Admin\",\"modules\":[{\"name\":\"Billing\"}]}",
                "isBase64Encoded": false,
                "requestContext": {"http": {"method": "POST", "path": "/roles"}}
            })),
        )
        .await
        .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"message":"Role Created successfully"}"#);
        assert_eq!(response.headers["content-type"], "application/json");
        assert_eq!(response.headers["x-custom-header"], "application/json");

        let response = handle_event(
            app.router.clone(),
            event(json!({
                "routeKey": "POST /permissions/{roleName}/{moduleName}",
                "pathParameters": {"roleName": "Admin", "moduleName": "billing"},
                "body": "WyJ2aWV3Il0=",
                "isBase64Encoded": true
            })),
        )
        .await
        .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(role(&app.router, "Admin").await["modules"][0]["permissions"], json!(["view"]));
    }

    #[tokio::test]
    async fn test_gateway_template_path_with_space() {
        let app = test_app();
        send(&app.router, "POST", "/roles", Some(json!({"name": "Read Only"}))).await;

        let response = handle_event(
            app.router.clone(),
            event(json!({
                "routeKey": "GET /roles/{roleName}",
                "pathParameters": {"roleName": "Read Only"}
            })),
        )
        .await
        .unwrap();
        assert_eq!(response.status_code, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["name"], "Read Only");
    }

    #[tokio::test]
    async fn test_gateway_unmatched_route() {
        let app = test_app();
        let response = handle_event(
            app.router,
            event(json!({"routeKey": "GET /unknown", "rawPath": "/unknown"})),
        )
        .await
        .unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, r#"{"message":"No implementation found for GET /unknown"}"#);
    }
}
