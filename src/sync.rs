// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Synchronous wrapper for a session.
//!
//! This module is only available when the `sync` feature is enabled.
//! Must not be used from within an asynchronous runtime.

use std::path::Path;

use serde::de::DeserializeOwned;
use tokio::runtime::{Builder as RuntimeBuilder, Runtime};

use super::request::{ApiRequest, ApiResponse};
use super::{Error, ErrorKind, IdentityConfig, Result, Session};

/// A synchronous wrapper for an asynchronous session.
#[derive(Debug)]
pub struct SyncSession {
    inner: Session,
    runtime: Runtime,
}

impl From<SyncSession> for Session {
    fn from(value: SyncSession) -> Session {
        value.inner
    }
}

fn new_runtime() -> Result<Runtime> {
    RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::new(
                ErrorKind::ProtocolError,
                format!("Could not create a runtime: {}", e),
            )
        })
}

impl SyncSession {
    /// Create a new synchronous wrapper.
    pub fn new(session: Session) -> Result<SyncSession> {
        Ok(SyncSession {
            inner: session,
            runtime: new_runtime()?,
        })
    }

    /// Authenticate using the configuration file and a password.
    ///
    /// See [Session::authenticate](../struct.Session.html#method.authenticate) for details.
    pub fn authenticate<P, S>(config_path: P, password: S) -> Result<SyncSession>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let runtime = new_runtime()?;
        let inner = runtime.block_on(Session::authenticate(config_path, password))?;
        Ok(SyncSession { inner, runtime })
    }

    /// Authenticate using an already loaded configuration.
    pub fn from_config<S: AsRef<str>>(config: &IdentityConfig, password: S) -> Result<SyncSession> {
        let runtime = new_runtime()?;
        let inner = runtime.block_on(Session::from_config(config, password))?;
        Ok(SyncSession { inner, runtime })
    }

    /// Underlying asynchronous session.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.inner
    }

    /// Check the token with the Identity service.
    #[inline]
    pub fn is_valid(&self) -> Result<bool> {
        self.runtime.block_on(self.inner.is_valid())
    }

    /// Send a request and return its raw body.
    pub fn send(&self, request: ApiRequest) -> Result<ApiResponse<Vec<u8>>> {
        self.runtime.block_on(async {
            let resp = request.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp
                .bytes()
                .await
                .map_err(|e| Error::from(e).with_status(status))?;
            Ok::<_, Error>(ApiResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        })
    }

    /// Send a request and parse the body as JSON.
    #[inline]
    pub fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<ApiResponse<R>> {
        self.runtime.block_on(request.fetch())
    }
}
