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

//! Password authentication.

use std::time::Duration;

use log::{debug, error, info, trace};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};

use super::protocol::{self, AuthRoot};
use super::token::Token;
use super::{
    token_endpoint, AUTH_TIMEOUT, EMPTY_SUBJECT_HEADER, INVALID_SUBJECT_HEADER,
    MISSING_SUBJECT_HEADER,
};
use crate::request::SUBJECT_TOKEN_HEADER;
use crate::{Error, ErrorKind, IdentityConfig, Result};

/// Request a new token using a user name and password.
///
/// The request carries no token headers and is limited by `AUTH_TIMEOUT`.
/// Only 201 is accepted.
#[inline]
pub(crate) async fn request_token(
    config: &IdentityConfig,
    password: &str,
) -> Result<(Token, protocol::Token)> {
    request_token_with_timeout(config, password, AUTH_TIMEOUT).await
}

pub(crate) async fn request_token_with_timeout(
    config: &IdentityConfig,
    password: &str,
    timeout: Duration,
) -> Result<(Token, protocol::Token)> {
    let body = AuthRoot::with_password(
        config.username.clone(),
        password,
        config.user_domain_name.clone(),
    );
    let payload = serde_json::to_vec(&body).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Cannot serialize authentication request: {}", e),
        )
    })?;

    let endpoint = token_endpoint(&config.auth_url);
    let client = Client::builder().timeout(timeout).build()?;
    debug!(
        "Requesting a token for user {} from {}",
        config.username, endpoint
    );
    let resp = client
        .post(&endpoint)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(payload)
        .send()
        .await
        .map_err(|e| {
            error!("Token request to {} failed: {}", endpoint, e);
            Error::from(e)
        })?;

    token_from_response(resp, &config.username).await
}

async fn token_from_response(
    resp: Response,
    user_name: &str,
) -> Result<(Token, protocol::Token)> {
    let status = resp.status();
    match status {
        StatusCode::CREATED => {}
        StatusCode::UNAUTHORIZED => {
            error!("Invalid credentials for user {}", user_name);
            return Err(Error::new_with_details(
                ErrorKind::AuthenticationFailed,
                Some(status),
                Some(String::from("Unable to authenticate")),
            ));
        }
        other => {
            error!(
                "Unexpected HTTP code {} when getting a token for {}",
                other, user_name
            );
            return Err(Error::new_with_details(
                ErrorKind::AuthenticationFailed,
                Some(other),
                Some(format!("Unexpected HTTP code {} when authenticating", other)),
            ));
        }
    }

    let value = match resp.headers().get(SUBJECT_TOKEN_HEADER) {
        Some(hdr) => match hdr.to_str() {
            Ok(s) => Token::new(s.to_string()).ok_or_else(|| {
                error!("Empty X-Subject-Token received from {}", resp.url());
                Error::new_with_details(
                    ErrorKind::InvalidResponse,
                    Some(status),
                    Some(String::from(EMPTY_SUBJECT_HEADER)),
                )
            }),
            Err(e) => {
                error!(
                    "Invalid X-Subject-Token received from {}: {}",
                    resp.url(),
                    e
                );
                Err(Error::new_with_details(
                    ErrorKind::InvalidResponse,
                    Some(status),
                    Some(String::from(INVALID_SUBJECT_HEADER)),
                ))
            }
        },
        None => {
            error!("No X-Subject-Token header received from {}", resp.url());
            Err(Error::new_with_details(
                ErrorKind::InvalidResponse,
                Some(status),
                Some(String::from(MISSING_SUBJECT_HEADER)),
            ))
        }
    }?;

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::from(e).with_status(status))?;
    let root: protocol::TokenRoot = serde_json::from_slice(&bytes).map_err(|e| {
        error!("Malformed token response for user {}: {}", user_name, e);
        Error::new_with_details(
            ErrorKind::InvalidResponse,
            Some(status),
            Some(format!("Cannot parse token response: {}", e)),
        )
    })?;

    info!(
        "Received a token for user {} expiring at {}",
        user_name, root.token.expires_at
    );
    trace!(
        "Token methods {:?}, audit IDs {:?}",
        root.token.methods,
        root.token.audit_ids
    );
    Ok((value, root.token))
}
