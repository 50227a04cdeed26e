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

//! Support for cloud configuration file.
//!
//! The file follows the `clouds.yaml` layout:
//!
//! ```yaml
//! clouds:
//!   openstack:
//!     auth:
//!       auth_url: https://cloud.example.com:5000/v3
//!       username: admin
//!       project_id: 0123456789abcdef
//!       project_name: admin
//!       user_domain_name: Default
//!     region_name: RegionOne
//!     interface: public
//!     identity_api_version: 3
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, error};
use serde_derive::Deserialize;

use super::{Error, ErrorKind, Result};

/// Name of the cloud entry used by default.
pub const DEFAULT_CLOUD: &str = "openstack";

const DEFAULT_DOMAIN: &str = "Default";

#[derive(Debug, Clone, Deserialize)]
struct Auth {
    auth_url: String,
    username: String,
    project_id: String,
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default)]
    user_domain_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Cloud {
    auth: Auth,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    interface: Option<String>,
    #[serde(default)]
    identity_api_version: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
struct Root {
    clouds: HashMap<String, Cloud>,
}

/// Identity configuration of one cloud.
///
/// Only `auth_url`, `username`, `user_domain_name` and `project_id` take
/// part in authentication; the rest is kept for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// URL of the Identity service, used verbatim.
    pub auth_url: String,
    /// User name.
    pub username: String,
    /// Project ID, substituted into project-scoped endpoints.
    pub project_id: String,
    /// Project name.
    pub project_name: Option<String>,
    /// Name of the domain the user belongs to.
    pub user_domain_name: String,
    /// Region name.
    pub region_name: Option<String>,
    /// Endpoint interface.
    pub interface: Option<String>,
    /// Identity API version.
    pub identity_api_version: Option<u8>,
}

impl IdentityConfig {
    /// Load the default (`openstack`) cloud from a configuration file.
    #[inline]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<IdentityConfig> {
        IdentityConfig::from_file_with_cloud(path, DEFAULT_CLOUD)
    }

    /// Load a named cloud from a configuration file.
    pub fn from_file_with_cloud<P, S>(path: P, cloud_name: S) -> Result<IdentityConfig>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let path = path.as_ref();
        debug!("Reading cloud configuration from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Cannot read {:?}: {}", path, e);
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {}: {}", path.display(), e),
            )
        })?;
        IdentityConfig::from_yaml_with_cloud(&content, cloud_name)
    }

    /// Parse the default (`openstack`) cloud from a YAML string.
    #[inline]
    pub fn from_yaml(content: &str) -> Result<IdentityConfig> {
        IdentityConfig::from_yaml_with_cloud(content, DEFAULT_CLOUD)
    }

    /// Parse a named cloud from a YAML string.
    pub fn from_yaml_with_cloud<S: AsRef<str>>(
        content: &str,
        cloud_name: S,
    ) -> Result<IdentityConfig> {
        let mut root: Root = serde_yaml::from_str(content).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse clouds.yaml: {}", e),
            )
        })?;

        let name = cloud_name.as_ref();
        let cloud = root
            .clouds
            .remove(name)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidConfig, format!("No such cloud: {}", name))
            })?;

        let auth = cloud.auth;
        Ok(IdentityConfig {
            auth_url: auth.auth_url,
            username: auth.username,
            project_id: auth.project_id,
            project_name: auth.project_name,
            user_domain_name: auth
                .user_domain_name
                .unwrap_or_else(|| String::from(DEFAULT_DOMAIN)),
            region_name: cloud.region_name,
            interface: cloud.interface,
            identity_api_version: cloud.identity_api_version,
        })
    }
}
