// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;
use std::sync::Once;

use httpmock::prelude::*;
use openstack_lite::{ErrorKind, Method, ServiceType, Session};
use reqwest::StatusCode;
use serde_json::json;
use tempfile::NamedTempFile;

static INIT: Once = Once::new();

fn set_up(server: &MockServer) -> NamedTempFile {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let mut file = NamedTempFile::new().expect("Cannot create a temporary file");
    write!(
        file,
        r#"
clouds:
  openstack:
    auth:
      auth_url: http://127.0.0.1:{}/identity/v3
      username: demo
      project_id: 8b6f4c1e2a
      project_name: demo
      user_domain_name: Default
    region_name: RegionOne
    interface: public
    identity_api_version: 3
"#,
        server.port()
    )
    .expect("Cannot write clouds.yaml");
    file
}

fn token_response() -> serde_json::Value {
    json!({
        "token": {
            "issued_at": "2099-01-01T00:00:00.000000Z",
            "audit_ids": ["VcxU2JYqT8OzfUVvrjEITQ"],
            "methods": ["password"],
            "expires_at": "2099-01-01T01:00:00.000000Z",
            "user": {
                "id": "ee4dfb6e5540447cb3741905149d9b6e",
                "name": "demo",
                "domain": {"id": "default", "name": "Default"},
                "password_expires_at": null
            }
        }
    })
}

#[tokio::test]
async fn test_authenticate_and_call_service() {
    let server = MockServer::start();
    let config = set_up(&server);

    let auth = server.mock(|when, then| {
        when.method(POST)
            .path("/identity/v3/auth/tokens")
            .json_body(json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "name": "demo",
                                "domain": {"name": "Default"},
                                "password": "secret"
                            }
                        }
                    }
                }
            }));
        then.status(201)
            .header("x-subject-token", "gAAAAABdemo")
            .json_body(token_response());
    });
    let validate = server.mock(|when, then| {
        when.method(GET)
            .path("/identity/v3/auth/tokens")
            .header("x-auth-token", "gAAAAABdemo")
            .header("x-subject-token", "gAAAAABdemo");
        then.status(200).json_body(token_response());
    });
    let flavors = server.mock(|when, then| {
        when.method(GET)
            .path("/compute/flavors")
            .header("x-auth-token", "gAAAAABdemo");
        then.status(200)
            .json_body(json!({"flavors": [{"id": "1", "name": "m1.tiny"}]}));
    });

    let session = Session::authenticate(config.path(), "secret")
        .await
        .expect("Authentication failed");
    auth.assert_calls(1);

    assert_eq!(session.token(), "gAAAAABdemo");
    assert_eq!(session.user_id(), "ee4dfb6e5540447cb3741905149d9b6e");
    assert!(!session.is_expired());
    assert_eq!(
        session.endpoint(ServiceType::Identity),
        format!("http://127.0.0.1:{}/identity/v3", server.port())
    );
    assert_eq!(
        session.endpoint(ServiceType::VolumeV3),
        "http://127.0.0.1:8776/v3/8b6f4c1e2a"
    );
    assert_eq!(
        session.endpoint(ServiceType::Placement),
        "http://127.0.0.1:8778/placement"
    );

    assert!(session.is_valid().await.expect("Token check failed"));
    validate.assert_calls(1);

    let resp = session
        .request(Method::Get, server.url("/compute/flavors"))
        .expect("Cannot build a request")
        .fetch::<serde_json::Value>()
        .await
        .expect("Cannot list flavors");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["flavors"][0]["name"], "m1.tiny");
    flavors.assert_calls(1);
}

#[tokio::test]
async fn test_authenticate_rejected_leaves_no_session() {
    let server = MockServer::start();
    let config = set_up(&server);

    let auth = server.mock(|when, then| {
        when.method(POST).path("/identity/v3/auth/tokens");
        then.status(401).json_body(json!({
            "error": {
                "code": 401,
                "message": "The request you have made requires authentication.",
                "title": "Unauthorized"
            }
        }));
    });

    let err = Session::authenticate(config.path(), "wrong")
        .await
        .err()
        .expect("Authentication unexpectedly succeeded");
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    auth.assert_calls(1);
}

#[tokio::test]
async fn test_validation_of_revoked_token() {
    let server = MockServer::start();
    let config = set_up(&server);

    let _auth = server.mock(|when, then| {
        when.method(POST).path("/identity/v3/auth/tokens");
        then.status(201)
            .header("x-subject-token", "gAAAAABdemo")
            .json_body(token_response());
    });
    let _validate = server.mock(|when, then| {
        when.method(GET).path("/identity/v3/auth/tokens");
        then.status(404);
    });

    let session = Session::authenticate(config.path(), "secret")
        .await
        .expect("Authentication failed");
    assert!(!session.is_valid().await.expect("Token check failed"));
}

#[cfg(feature = "sync")]
#[test]
fn test_sync_authenticate_with_password_expiry() {
    let server = MockServer::start();
    let config = set_up(&server);

    let mut body = token_response();
    body["token"]["user"]["password_expires_at"] = json!("2099-06-01T00:00:00.000000");
    let _auth = server.mock(|when, then| {
        when.method(POST).path("/identity/v3/auth/tokens");
        then.status(201)
            .header("x-subject-token", "gAAAAABsync")
            .json_body(body);
    });

    let session = openstack_lite::SyncSession::authenticate(config.path(), "secret")
        .expect("Authentication failed");
    assert_eq!(session.session().token(), "gAAAAABsync");
    assert!(!session.session().is_expired());
}
