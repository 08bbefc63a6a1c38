// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::{Result, Validation};

/// An opaque bearer credential issued by the login and registration
/// endpoints. Sent verbatim in the `Authorization` header; never inspected
/// client-side.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct Token(String);

impl Token {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl secrecy::Zeroize for Token {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl secrecy::CloneableSecret for Token {}

impl secrecy::SerializableSecret for Token {}

pub(crate) type SecretToken = secrecy::Secret<Token>;

/// The record identifying the currently authenticated user. Persisted to the
/// session store as `{"username": …, "userID": …, "token": …}`, matching the
/// key historically written by the mobile clients.
#[derive(Clone, Deserialize, Serialize)]
pub(crate) struct Session {
    username: String,
    #[serde(rename = "userID")]
    user_id: i64,
    token: SecretToken,
}

impl Session {
    /// A session is only constructible complete: a non-empty username and
    /// token and a valid user id. Anything less is a validation error, never
    /// a partially-filled session.
    pub(crate) fn new(username: String, user_id: i64, token: SecretToken) -> Result<Self> {
        if username.is_empty() || user_id <= 0 || token.expose_secret().as_str().is_empty() {
            return Err(Validation::IncompleteSession.into());
        }

        Ok(Self {
            username,
            user_id,
            token,
        })
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) const fn user_id(&self) -> i64 {
        self.user_id
    }

    pub(crate) const fn token(&self) -> &SecretToken {
        &self.token
    }
}

/// Authentication lifecycle of the process. Fully reversible; there is no
/// terminal state.
#[derive(Clone, Default)]
pub(crate) enum State {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(Session),
    Anonymous,
}

impl State {
    pub(crate) const fn session(&self) -> Option<&Session> {
        match *self {
            Self::Authenticated(ref session) => Some(session),
            Self::Uninitialized | Self::Loading | Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result, Validation};

    #[test]
    fn serializes_with_the_historical_key_names() -> Result<()> {
        let session = Session::new(
            "alice".to_owned(),
            7,
            SecretToken::new(Token::from("abc".to_owned())),
        )?;

        assert_eq!(
            serde_json::to_string(&session)?,
            r#"{"username":"alice","userID":7,"token":"abc"}"#
        );
        Ok(())
    }

    #[test]
    fn round_trips_through_json() -> Result<()> {
        let session: Session =
            serde_json::from_str(r#"{"username":"alice","userID":7,"token":"abc"}"#)?;

        assert_eq!(session.username(), "alice");
        assert_eq!(session.user_id(), 7);
        assert_eq!(session.token().expose_secret().as_str(), "abc");
        Ok(())
    }

    #[test]
    fn rejects_incomplete_records() {
        let candidates = [
            Session::new(
                String::new(),
                7,
                SecretToken::new(Token::from("abc".to_owned())),
            ),
            Session::new(
                "alice".to_owned(),
                0,
                SecretToken::new(Token::from("abc".to_owned())),
            ),
            Session::new(
                "alice".to_owned(),
                7,
                SecretToken::new(Token::from(String::new())),
            ),
        ];

        for candidate in candidates {
            assert!(matches!(
                candidate,
                Err(Error::Validation(Validation::IncompleteSession))
            ));
        }
    }
}
