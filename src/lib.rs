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

//! Minimal OpenStack client in Rust.
//!
//! Authenticates against the Identity service with a user name and password
//! and derives base URLs of the other services from the Identity host.
//!
//! # Usage
//!
//! 1. Describe the cloud in a `clouds.yaml`-style file (see
//!    [config](config/index.html)).
//! 2. Create a [Session](struct.Session.html) with
//!    [Session::authenticate](struct.Session.html#method.authenticate).
//! 3. Issue requests with [Session::request](struct.Session.html#method.request)
//!    against one of the [service endpoints](enum.ServiceType.html).
//!
//! ```rust,no_run
//! use openstack_lite::{Method, ServiceType, Session};
//!
//! # async fn example() -> openstack_lite::Result<()> {
//! let session = Session::authenticate("clouds.yaml", "pa$$w0rd").await?;
//! let url = format!("{}/servers", session.endpoint(ServiceType::Compute));
//! let servers = session
//!     .request(Method::Get, url)?
//!     .fetch::<serde_json::Value>()
//!     .await?;
//! println!("{}", servers.body);
//! # Ok(()) }
//! ```
//!
//! Tokens are not refreshed automatically: check
//! [is_expired](struct.Session.html#method.is_expired) and authenticate again
//! when needed.
//!
//! # Limitations
//!
//! * Only password authentication with Identity API v3 is supported.
//! * Service ports are fixed, the service catalog is not used.

#![crate_name = "openstack_lite"]
#![crate_type = "lib"]
#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

pub mod config;
pub mod endpoints;
mod error;
mod identity;
pub mod request;
mod session;
#[cfg(feature = "sync")]
pub mod sync;

pub use crate::config::IdentityConfig;
pub use crate::endpoints::{ServiceEndpoints, ServiceType};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::identity::AUTH_TIMEOUT;
pub use crate::request::{ApiRequest, ApiResponse, Method, RequestExecutor};
pub use crate::session::Session;
#[cfg(feature = "sync")]
pub use crate::sync::SyncSession;
