// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Service endpoints derived from the Identity host.
//!
//! No service catalog is consulted: every service is assumed to listen on
//! its well-known port on the same host as the Identity service.

use std::fmt;
use std::str::FromStr;

use log::{debug, error};
use reqwest::Url;

use super::{Error, ErrorKind, Result};

/// Type of an OpenStack service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceType {
    /// Alarming service (Aodh).
    Alarming,
    /// Compute service (Nova).
    Compute,
    /// Identity service (Keystone).
    Identity,
    /// Image service (Glance).
    Image,
    /// Metering service (Ceilometer).
    Metering,
    /// Metric service (Gnocchi).
    Metric,
    /// Network service (Neutron).
    Network,
    /// Object storage (Swift).
    ObjectStore,
    /// Placement service.
    Placement,
    /// Block storage API v2 (Cinder).
    VolumeV2,
    /// Block storage API v3 (Cinder).
    VolumeV3,
}

impl ServiceType {
    /// All known service types.
    pub const ALL: [ServiceType; 11] = [
        ServiceType::Alarming,
        ServiceType::Compute,
        ServiceType::Identity,
        ServiceType::Image,
        ServiceType::Metering,
        ServiceType::Metric,
        ServiceType::Network,
        ServiceType::ObjectStore,
        ServiceType::Placement,
        ServiceType::VolumeV2,
        ServiceType::VolumeV3,
    ];

    /// Service type name.
    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Alarming => "alarming",
            ServiceType::Compute => "compute",
            ServiceType::Identity => "identity",
            ServiceType::Image => "image",
            ServiceType::Metering => "metering",
            ServiceType::Metric => "metric",
            ServiceType::Network => "network",
            ServiceType::ObjectStore => "object-store",
            ServiceType::Placement => "placement",
            ServiceType::VolumeV2 => "volumev2",
            ServiceType::VolumeV3 => "volumev3",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<ServiceType> {
        ServiceType::ALL
            .into_iter()
            .find(|x| x.name() == s)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Unknown service type {}", s),
                )
            })
    }
}

/// Base URLs of all known services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    alarming: String,
    compute: String,
    identity: String,
    image: String,
    metering: String,
    metric: String,
    network: String,
    object_store: String,
    placement: String,
    volume_v2: String,
    volume_v3: String,
}

/// Split an authentication URL into its scheme and host.
///
/// Port, path, query and user information are dropped.
pub fn split_auth_url(auth_url: &str) -> Result<(String, String)> {
    if !auth_url.contains("://") {
        error!("auth_url {} has no scheme", auth_url);
        return Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("Invalid auth_url {}: missing scheme", auth_url),
        ));
    }

    let url = Url::parse(auth_url).map_err(|e| {
        error!("Cannot parse auth_url {}: {}", auth_url, e);
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Invalid auth_url {}: {}", auth_url, e),
        )
    })?;
    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid auth_url {}: missing host", auth_url),
            ))
        }
    };
    Ok((url.scheme().to_string(), host))
}

impl ServiceEndpoints {
    /// Derive endpoints from the authentication URL and a project ID.
    ///
    /// The Identity endpoint is `auth_url` itself, unmodified.
    pub fn derive(auth_url: &str, project_id: &str) -> Result<ServiceEndpoints> {
        let (scheme, host) = split_auth_url(auth_url)?;
        let base = |port: u16| format!("{}://{}:{}", scheme, host, port);

        let result = ServiceEndpoints {
            alarming: base(8042),
            compute: format!("{}/v2.1/{}", base(8441), project_id),
            identity: auth_url.to_string(),
            image: base(9292),
            metering: base(8777),
            metric: base(8041),
            network: base(9696),
            object_store: format!("{}/v1/AUTH_{}", base(8080), project_id),
            placement: format!("{}/placement", base(8778)),
            volume_v2: format!("{}/v2/{}", base(8776), project_id),
            volume_v3: format!("{}/v3/{}", base(8776), project_id),
        };
        debug!(
            "Derived service endpoints for host {} and project {}",
            host, project_id
        );
        Ok(result)
    }

    /// Base URL of the given service.
    pub fn get(&self, service: ServiceType) -> &str {
        match service {
            ServiceType::Alarming => &self.alarming,
            ServiceType::Compute => &self.compute,
            ServiceType::Identity => &self.identity,
            ServiceType::Image => &self.image,
            ServiceType::Metering => &self.metering,
            ServiceType::Metric => &self.metric,
            ServiceType::Network => &self.network,
            ServiceType::ObjectStore => &self.object_store,
            ServiceType::Placement => &self.placement,
            ServiceType::VolumeV2 => &self.volume_v2,
            ServiceType::VolumeV3 => &self.volume_v3,
        }
    }

    /// Iterate over all services and their base URLs.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceType, &str)> + '_ {
        ServiceType::ALL.into_iter().map(move |x| (x, self.get(x)))
    }
}
