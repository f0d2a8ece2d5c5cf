//! Integration tests for the app creation workflow.
//!
//! Each test drives `create_app` end to end against a wiremock server,
//! asserting both the outcome and the traffic that was (or was not) sent.

use std::time::Duration;

use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gangway::config::{Config, TemplateSettings};
use gangway::platform::{Pacing, PlatformClient};
use gangway::provision::{create_app, CreateError};

const API_KEY: &str = "gwk_0123456789abcdefghijklmnopqrstuvwxyzABCD";

fn client(server: &MockServer) -> PlatformClient {
    PlatformClient::with_pacing(
        server.uri(),
        API_KEY,
        Pacing {
            pace: Duration::from_millis(1),
            backoff: Duration::from_millis(1),
        },
    )
}

fn config(app_name: &str, global: bool) -> Config {
    Config {
        api_key: API_KEY.to_string(),
        api_base: "unused-in-tests".to_string(),
        account: "acme".to_string(),
        org: "eng".to_string(),
        app_name: app_name.to_string(),
        template: Some(TemplateSettings {
            name: "go-service".to_string(),
            global,
            visibility: "private".to_string(),
            description: "Order processing".to_string(),
        }),
        gitops: None,
        git_base: "unused-in-tests".to_string(),
    }
}

fn descriptor_json(global: bool, replacement: Option<&str>) -> String {
    let mut descriptor = serde_json::json!({
        "org_login": "acme-templates",
        "source_repo": "go-service",
        "is_global": global,
        "language": "go",
    });
    if let Some(token) = replacement {
        descriptor["replacement_string"] = serde_json::Value::String(token.to_string());
    }
    descriptor.to_string()
}

async fn mount_probe_absent(server: &MockServer, app: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/accounts/acme/organizations/eng/apps/{app}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn invalid_name_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("Bad_Name", true))
        .await
        .unwrap_err();
    match err {
        CreateError::InvalidName { name, .. } => assert_eq!(name, "Bad_Name"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn existing_app_fails_before_template_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acme/organizations/eng/apps/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/global/templates/go-service"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::AlreadyExists(name) if name == "orders"));
}

#[tokio::test]
async fn probe_error_is_a_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acme/organizations/eng/apps/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::Client(_)));
}

#[tokio::test]
async fn incomplete_descriptor_echoes_raw_payload() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    let raw = r#"{"org_login": "acme-templates", "is_global": true}"#;
    Mock::given(method("GET"))
        .and(path("/global/templates/go-service"))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap_err();
    match err {
        CreateError::UnusableTemplate { reason, raw: echoed, .. } => {
            assert!(reason.contains("source_repo"));
            assert!(reason.contains("language"));
            assert_eq!(echoed, raw);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn global_template_payload_omits_replacement_token() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    Mock::given(method("GET"))
        .and(path("/global/templates/go-service"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(descriptor_json(true, Some("__app__"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/acme/organizations/eng/apps"))
        .and(query_param("app_name", "orders"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"success": true, "data": {"resultant_repos": {"app": "eng/orders"}}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let created = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap();
    assert_eq!(created.repos["app"], "eng/orders");

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("creation request sent");
    let payload: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    assert!(payload.get("replacement_string").is_none());
    assert_eq!(payload["global_template"], true);
    assert_eq!(payload["source_repo"], "go-service");
}

#[tokio::test]
async fn account_template_without_token_fails_before_submission() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    Mock::given(method("GET"))
        .and(path("/accounts/acme/templates/go-service"))
        .respond_with(ResponseTemplate::new(200).set_body_string(descriptor_json(false, None)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", false))
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::MissingReplacement(_)));
}

#[tokio::test]
async fn account_template_payload_carries_replacement_token() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    Mock::given(method("GET"))
        .and(path("/accounts/acme/templates/go-service"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(descriptor_json(false, Some("__app__"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/acme/organizations/eng/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"success": true, "data": {"resultant_repos": {}}}"#,
        ))
        .mount(&server)
        .await;

    create_app(&client(&server), &config("orders", false))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let post = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(payload["replacement_string"], "__app__");
}

#[tokio::test]
async fn http_success_with_false_flag_is_a_failure() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    Mock::given(method("GET"))
        .and(path("/global/templates/go-service"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(descriptor_json(true, None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/acme/organizations/eng/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"success": false, "error": "org quota exceeded"}"#,
        ))
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap_err();
    match err {
        CreateError::Rejected { body } => assert!(body.contains("org quota exceeded")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn submission_4xx_is_not_retried() {
    let server = MockServer::start().await;
    mount_probe_absent(&server, "orders").await;
    Mock::given(method("GET"))
        .and(path("/global/templates/go-service"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(descriptor_json(true, None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/acme/organizations/eng/apps"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad visibility"))
        .expect(1)
        .mount(&server)
        .await;

    let err = create_app(&client(&server), &config("orders", true))
        .await
        .unwrap_err();
    match err {
        CreateError::Client(client_err) => {
            assert!(client_err.to_string().contains("bad visibility"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
