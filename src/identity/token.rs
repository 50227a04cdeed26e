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

//! Token value and validation.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::{debug, error, info};
use reqwest::StatusCode;

use super::token_endpoint;
use crate::request::{Method, RequestExecutor};
use crate::{Error, ErrorKind, Result};

/// Opaque authentication token.
///
/// Never empty.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Token(String);

impl Token {
    pub fn new(value: String) -> Option<Token> {
        if value.is_empty() {
            None
        } else {
            Some(Token(value))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        write!(f, "Token {{ hash: {} }}", hasher.finish())
    }
}

/// Ask the Identity service whether the token is still valid.
///
/// 200 means valid; 401, 403 and 404 mean it is not. Anything else is an
/// error.
pub(crate) async fn check_token(
    executor: &RequestExecutor,
    identity_url: &str,
    token: &Token,
) -> Result<bool> {
    let url = token_endpoint(identity_url);
    debug!("Validating a token against {}", url);
    let resp = executor
        .request(Method::Get, &url, token.as_str())?
        .send()
        .await?;
    match resp.status() {
        StatusCode::OK => Ok(true),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            info!("Token was rejected by {} with {}", url, resp.status());
            Ok(false)
        }
        other => {
            error!("Unexpected HTTP code {} when validating a token", other);
            Err(Error::new_with_details(
                ErrorKind::AuthenticationFailed,
                Some(other),
                Some(format!("Unexpected HTTP code {} when validating a token", other)),
            ))
        }
    }
}
