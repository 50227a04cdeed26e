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

//! Low-level HTTP utilities.
//!
//! Every request carries the token twice: as `X-Auth-Token` and as
//! `X-Subject-Token`, so that the same call works against services expecting
//! either. Status codes are never interpreted here.

use std::fmt;
use std::str::FromStr;

use log::{debug, error, trace};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use static_assertions::assert_impl_all;

use super::{Error, ErrorKind, Result};

/// Header carrying the token of the caller.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Header carrying the token being operated on.
pub const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

/// HTTP method supported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// HTTP name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Method> {
        [
            Method::Get,
            Method::Post,
            Method::Patch,
            Method::Put,
            Method::Delete,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Unsupported HTTP method {}", s),
            )
        })
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> reqwest::Method {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Parsed JSON response together with its status and headers.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code, not checked for success.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Deserialized body.
    pub body: T,
}

/// Stateless executor of single HTTP requests.
///
/// Clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    client: Client,
}

assert_impl_all!(RequestExecutor: Send, Sync);

/// Request with both token headers set.
#[derive(Debug)]
pub struct ApiRequest {
    inner: RequestBuilder,
    method: Method,
    url: Url,
}

fn token_value(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(token).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Token cannot be used as a header value: {}", e),
        )
    })?;
    value.set_sensitive(true);
    Ok(value)
}

impl RequestExecutor {
    /// Create an executor with a default HTTP client.
    #[inline]
    pub fn new() -> RequestExecutor {
        RequestExecutor::default()
    }

    /// Create an executor using the provided HTTP client.
    #[inline]
    pub fn with_client(client: Client) -> RequestExecutor {
        RequestExecutor { client }
    }

    /// Start a request.
    ///
    /// An empty token is allowed and is sent as empty header values.
    pub fn request<U: AsRef<str>>(
        &self,
        method: Method,
        url: U,
        token: &str,
    ) -> Result<ApiRequest> {
        let url = Url::parse(url.as_ref()).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid URL {}: {}", url.as_ref(), e),
            )
        })?;
        let value = token_value(token)?;
        let inner = self
            .client
            .request(method.into(), url.clone())
            .header(HeaderName::from_static(AUTH_TOKEN_HEADER), value.clone())
            .header(HeaderName::from_static(SUBJECT_TOKEN_HEADER), value);
        Ok(ApiRequest { inner, method, url })
    }

    /// Issue a request and return the raw response.
    pub async fn execute<U, P>(
        &self,
        method: Method,
        url: U,
        token: &str,
        payload: Option<&P>,
    ) -> Result<Response>
    where
        U: AsRef<str>,
        P: Serialize + ?Sized,
    {
        let mut request = self.request(method, url, token)?;
        if let Some(payload) = payload {
            request = request.json(payload)?;
        }
        request.send().await
    }

    /// Issue a request and parse the response body as JSON.
    pub async fn execute_json<U, P, R>(
        &self,
        method: Method,
        url: U,
        token: &str,
        payload: Option<&P>,
    ) -> Result<ApiResponse<R>>
    where
        U: AsRef<str>,
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.request(method, url, token)?;
        if let Some(payload) = payload {
            request = request.json(payload)?;
        }
        request.fetch().await
    }
}

impl ApiRequest {
    /// Add a JSON body.
    ///
    /// Serialization happens immediately, so a failure is reported before
    /// anything is sent.
    pub fn json<P: Serialize + ?Sized>(self, payload: &P) -> Result<ApiRequest> {
        let body = serde_json::to_vec(payload).map_err(|e| {
            error!("Cannot serialize a payload for {} {}: {}", self.method, self.url, e);
            Error::new(
                ErrorKind::InvalidInput,
                format!("Cannot serialize request payload: {}", e),
            )
        })?;
        Ok(ApiRequest {
            inner: self
                .inner
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body),
            ..self
        })
    }

    /// HTTP method of this request.
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Target URL of this request.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send this request without checking the status code.
    pub async fn send(self) -> Result<Response> {
        debug!("Sending {} request to {}", self.method, self.url);
        let resp = self.inner.send().await.map_err(|e| {
            error!("{} request to {} failed: {}", self.method, self.url, e);
            Error::from(e)
        })?;
        trace!("{} {} returned {}", self.method, self.url, resp.status());
        Ok(resp)
    }

    /// Send this request and parse the body as JSON.
    ///
    /// The body is read once. If it does not match `R`, the error carries
    /// the response status and the raw body.
    pub async fn fetch<R: DeserializeOwned>(self) -> Result<ApiResponse<R>> {
        let method = self.method;
        let url = self.url.clone();
        let resp = self.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::from(e).with_status(status))?;
        let body = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Invalid JSON received from {} {}: {}", method, url, e);
            Error::new_with_details(
                ErrorKind::InvalidResponse,
                Some(status),
                Some(format!(
                    "Cannot parse response body: {}; body was: {}",
                    e,
                    String::from_utf8_lossy(&bytes)
                )),
            )
        })?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
