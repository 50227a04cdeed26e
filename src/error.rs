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

//! Error and Result implementations.

use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration file is missing, unreadable or malformed.
    InvalidConfig,

    /// Invalid value passed to one of parameters.
    ///
    /// Also used when a request payload cannot be serialized.
    InvalidInput,

    /// The Identity service rejected the authentication request.
    ///
    /// Includes any status other than 201 on the token request.
    AuthenticationFailed,

    /// Operation has reached the time out.
    OperationTimedOut,

    /// Transport-level error reported by the underlying HTTP library.
    ProtocolError,

    /// Response received from the server is malformed.
    InvalidResponse,
}

/// Error from an OpenStack call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    status: Option<StatusCode>,
    message: Option<String>,
}

/// Result of an OpenStack call.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            status: None,
            message: Some(message.into()),
        }
    }

    /// Create with providing all details.
    #[inline]
    pub fn new_with_details(
        kind: ErrorKind,
        status: Option<StatusCode>,
        message: Option<String>,
    ) -> Error {
        Error {
            kind,
            status,
            message,
        }
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code (if the error came with a response).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Attach an HTTP status to this error.
    pub(crate) fn with_status(mut self, status: StatusCode) -> Error {
        self.status = Some(status);
        self
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::InvalidConfig => "Configuration file cannot be used",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::OperationTimedOut => "Time out reached while waiting for the operation",
            ErrorKind::ProtocolError => "Error when accessing the server",
            ErrorKind::InvalidResponse => "Received invalid response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status.as_u16())?;
        }

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl ::std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let kind = if value.is_timeout() {
            ErrorKind::OperationTimedOut
        } else if value.is_decode() {
            ErrorKind::InvalidResponse
        } else if value.is_builder() {
            ErrorKind::InvalidInput
        } else {
            ErrorKind::ProtocolError
        };

        Error::new_with_details(kind, value.status(), Some(value.to_string()))
    }
}
