// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Session structure definition.
//!
//! A `Session` is the result of one successful authentication: a token, its
//! expiration time and the base URLs of all services. It is never modified;
//! authenticate again to get a new one.

use std::path::Path;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use log::{debug, trace};
use static_assertions::assert_impl_all;

use super::endpoints::{ServiceEndpoints, ServiceType};
use super::identity::{self, Token};
use super::request::{ApiRequest, Method, RequestExecutor};
use super::{IdentityConfig, Result};

/// An authenticated OpenStack session.
#[derive(Debug, Clone)]
pub struct Session {
    token: Token,
    expires_at: DateTime<FixedOffset>,
    user_id: String,
    user_name: String,
    project_id: String,
    endpoints: ServiceEndpoints,
    executor: RequestExecutor,
}

assert_impl_all!(Session: Send, Sync);

impl Session {
    /// Authenticate using the configuration file and a password.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn example() -> openstack_lite::Result<()> {
    /// let session = openstack_lite::Session::authenticate("clouds.yaml", "pa$$w0rd").await?;
    /// println!("Compute API is at {}", session.endpoint(openstack_lite::ServiceType::Compute));
    /// # Ok(()) }
    /// ```
    pub async fn authenticate<P, S>(config_path: P, password: S) -> Result<Session>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let config = IdentityConfig::from_file(config_path)?;
        Session::from_config(&config, password).await
    }

    /// Authenticate using an already loaded configuration.
    pub async fn from_config<S: AsRef<str>>(
        config: &IdentityConfig,
        password: S,
    ) -> Result<Session> {
        // Fail on an unusable auth_url before sending the password anywhere.
        let endpoints = ServiceEndpoints::derive(&config.auth_url, &config.project_id)?;
        let (token, body) = identity::request_token(config, password.as_ref()).await?;
        debug!(
            "Created a session for user {} in project {}",
            body.user.name, config.project_id
        );
        trace!("Service endpoints: {:?}", endpoints);
        Ok(Session {
            token,
            expires_at: body.expires_at,
            user_id: body.user.id,
            user_name: body.user.name,
            project_id: config.project_id.clone(),
            endpoints,
            executor: RequestExecutor::new(),
        })
    }

    /// Authentication token.
    #[inline]
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Token expiration time.
    #[inline]
    pub fn expires_at(&self) -> DateTime<FixedOffset> {
        self.expires_at
    }

    /// Whether the token has already expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Whether the token expires within the given time from now.
    pub fn expires_within(&self, duration: Duration) -> bool {
        let left = self.expires_at.signed_duration_since(Utc::now());
        trace!("Token is valid for {:?}", left);
        left <= duration
    }

    /// ID of the authenticated user.
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Name of the authenticated user.
    #[inline]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Project used to build project-scoped endpoints.
    #[inline]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// All service endpoints.
    #[inline]
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Base URL of a service.
    #[inline]
    pub fn endpoint(&self, service: ServiceType) -> &str {
        self.endpoints.get(service)
    }

    /// Executor used for requests made through this session.
    #[inline]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Start a request authenticated with this session's token.
    pub fn request<U: AsRef<str>>(&self, method: Method, url: U) -> Result<ApiRequest> {
        self.executor.request(method, url, self.token.as_str())
    }

    /// Check the token with the Identity service.
    ///
    /// Returns `Ok(false)` if the token was rejected. Transport failures and
    /// unexpected responses are errors.
    pub async fn is_valid(&self) -> Result<bool> {
        identity::check_token(
            &self.executor,
            self.endpoints.get(ServiceType::Identity),
            &self.token,
        )
        .await
    }

    #[cfg(test)]
    pub(crate) fn new_with_params(
        token: &str,
        expires_at: DateTime<FixedOffset>,
        auth_url: &str,
    ) -> Session {
        Session {
            token: Token::new(String::from(token)).expect("empty token in a test"),
            expires_at,
            user_id: String::from("u-1"),
            user_name: String::from("admin"),
            project_id: String::from("abc123"),
            endpoints: ServiceEndpoints::derive(auth_url, "abc123").expect("invalid test URL"),
            executor: RequestExecutor::new(),
        }
    }
}

#[cfg(test)]
mod test {
    #![allow(unused_results)]

    use std::io::Write;

    use chrono::{Duration, Utc};
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use serde_json::json;

    use super::Session;
    use crate::request::Method;
    use crate::{ErrorKind, IdentityConfig, ServiceType};

    fn config_yaml(auth_url: &str) -> String {
        format!(
            r#"
clouds:
  openstack:
    auth:
      auth_url: {}
      username: admin
      project_id: abc123
      project_name: demo
      user_domain_name: Default
    region_name: RegionOne
    interface: public
    identity_api_version: 3
"#,
            auth_url
        )
    }

    fn token_body() -> serde_json::Value {
        json!({
            "token": {
                "issued_at": "2024-05-02T10:00:00.000000Z",
                "audit_ids": ["a1"],
                "methods": ["password"],
                "expires_at": "2024-05-02T11:00:00.000000Z",
                "user": {
                    "id": "u-1",
                    "name": "admin",
                    "domain": {"id": "default", "name": "Default"},
                    "password_expires_at": null
                }
            }
        })
    }

    #[tokio::test]
    async fn test_authenticate() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v3/auth/tokens");
            then.status(201)
                .header("x-subject-token", "tok-1")
                .json_body(token_body());
        });

        let auth_url = format!("http://127.0.0.1:{}/v3", server.port());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config_yaml(&auth_url).as_bytes()).unwrap();

        let session = Session::authenticate(file.path(), "pa$$w0rd").await.unwrap();
        mock.assert_calls(1);

        assert_eq!(session.token(), "tok-1");
        assert_eq!(
            session.expires_at().to_rfc3339(),
            "2024-05-02T11:00:00+00:00"
        );
        assert_eq!(session.user_id(), "u-1");
        assert_eq!(session.user_name(), "admin");
        assert_eq!(session.project_id(), "abc123");
        assert_eq!(session.endpoint(ServiceType::Identity), auth_url);
        assert_eq!(
            session.endpoint(ServiceType::Compute),
            "http://127.0.0.1:8441/v2.1/abc123"
        );
        assert_eq!(
            session.endpoint(ServiceType::ObjectStore),
            "http://127.0.0.1:8080/v1/AUTH_abc123"
        );
        assert!(session.is_expired());
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/auth/tokens");
            then.status(401);
        });

        let config = IdentityConfig::from_yaml(&config_yaml(&server.url("/v3"))).unwrap();
        let err = Session::from_config(&config, "wrong").await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_authenticate_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::authenticate(dir.path().join("clouds.yaml"), "pa$$w0rd")
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn test_authenticate_bad_auth_url_sends_nothing() {
        let config = IdentityConfig::from_yaml(&config_yaml("keystone.local/v3")).unwrap();
        let err = Session::from_config(&config, "pa$$w0rd").await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_expiry() {
        let expires_at = (Utc::now() + Duration::minutes(30)).fixed_offset();
        let session = Session::new_with_params("tok", expires_at, "http://127.0.0.1:5000/v3");
        assert!(!session.is_expired());
        assert!(!session.expires_within(Duration::minutes(10)));
        assert!(session.expires_within(Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_is_valid() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v3/auth/tokens")
                .header("x-auth-token", "tok")
                .header("x-subject-token", "tok");
            then.status(200);
        });

        let expires_at = (Utc::now() + Duration::hours(1)).fixed_offset();
        let session = Session::new_with_params("tok", expires_at, &server.url("/v3"));
        assert!(session.is_valid().await.unwrap());
        mock.assert();
    }

    #[tokio::test]
    async fn test_is_valid_revoked() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v3/auth/tokens");
            then.status(404);
        });

        let expires_at = (Utc::now() + Duration::hours(1)).fixed_offset();
        let session = Session::new_with_params("tok", expires_at, &server.url("/v3"));
        assert!(!session.is_valid().await.unwrap());
    }

    #[tokio::test]
    async fn test_request_uses_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/servers")
                .header("x-auth-token", "tok")
                .header("x-subject-token", "tok");
            then.status(200).json_body(json!({"servers": []}));
        });

        let expires_at = (Utc::now() + Duration::hours(1)).fixed_offset();
        let session = Session::new_with_params("tok", expires_at, "http://127.0.0.1:5000/v3");
        let resp = session
            .request(Method::Get, server.url("/servers"))
            .unwrap()
            .fetch::<serde_json::Value>()
            .await
            .unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"servers": []}));
        mock.assert();
    }
}
