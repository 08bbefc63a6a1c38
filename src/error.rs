// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("API error: {0}")]
    Api(#[from] Api),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("validation error: {0}")]
    Validation(#[from] Validation),
    #[error("operation cancelled")]
    Cancelled,
    #[error("command execution failed")]
    Command,
    #[error("not signed in")]
    Anonymous,
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(reqwest::StatusCode::UNAUTHORIZED) => Self::Api(Api::Unauthorized),
            Some(status) => Self::Api(Api::Status(status)),
            None => Self::Transport(value),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("authentication required (the server rejected our token)")]
    Unauthorized,
    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("response body does not carry the expected payload envelope")]
    MissingEnvelope,
    #[error("response is missing required field {0:?}")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub(crate) enum Storage {
    #[error("no platform data directory is available to persist the session")]
    NoDataDirectory,
}

#[derive(Error, Debug)]
pub(crate) enum Validation {
    #[error("username and password must not be empty")]
    MissingCredentials,
    #[error("username, email, and password must not be empty")]
    MissingProfileFields,
    #[error("new password and confirmation do not match")]
    PasswordMismatch,
    #[error("the base URL must be an absolute HTTP(S) origin")]
    UnsupportedBaseUrl,
    #[error("session record is missing required fields")]
    IncompleteSession,
}
