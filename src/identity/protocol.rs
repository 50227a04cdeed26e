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

//! JSON structures and protocol bits for the Identity V3 API.

#![allow(dead_code)] // not every response field is consumed
#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_derive::{Deserialize, Serialize};

const PASSWORD_METHOD: &str = "password";

#[derive(Clone, Debug, Serialize)]
pub struct Domain {
    pub name: String,
}

#[derive(Clone, Serialize)]
pub struct UserAndPassword {
    pub name: String,
    pub domain: Domain,
    pub password: String,
}

impl fmt::Debug for UserAndPassword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserAndPassword")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordAuth {
    pub user: UserAndPassword,
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordIdentity {
    pub methods: Vec<String>,
    pub password: PasswordAuth,
}

#[derive(Clone, Debug, Serialize)]
pub struct Auth {
    pub identity: PasswordIdentity,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthRoot {
    pub auth: Auth,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IdAndName {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub domain: IdAndName,
    // Keystone sends this without a timezone, e.g. 2016-11-06T15:32:17.000000
    #[serde(default)]
    pub password_expires_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Token {
    pub issued_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub audit_ids: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    pub expires_at: DateTime<FixedOffset>,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenRoot {
    pub token: Token,
}

impl AuthRoot {
    /// Password authentication body for a user in a domain.
    pub fn with_password<S1, S2, S3>(user_name: S1, password: S2, domain_name: S3) -> AuthRoot
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        AuthRoot {
            auth: Auth {
                identity: PasswordIdentity {
                    methods: vec![String::from(PASSWORD_METHOD)],
                    password: PasswordAuth {
                        user: UserAndPassword {
                            name: user_name.into(),
                            domain: Domain {
                                name: domain_name.into(),
                            },
                            password: password.into(),
                        },
                    },
                },
            },
        }
    }
}
