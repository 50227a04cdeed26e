// Copyright 2019-2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Authentication using Identity API v3.
//!
//! Only password authentication is supported.

mod password;
pub(crate) mod protocol;
mod token;

use std::time::Duration;

pub(crate) use self::password::request_token;
pub(crate) use self::token::{check_token, Token};

const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";
const INVALID_SUBJECT_HEADER: &str = "Invalid X-Subject-Token header";
const EMPTY_SUBJECT_HEADER: &str = "Empty X-Subject-Token header";

/// Time out for the token request.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// URL of the token API for the given Identity endpoint.
#[inline]
pub(crate) fn token_endpoint(identity_url: &str) -> String {
    format!("{}/auth/tokens", identity_url.trim_end_matches('/'))
}
