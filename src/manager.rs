// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

//! The single source of truth for "is a user currently authenticated, and as
//! whom." Exactly one `SessionManager` exists per process; everything else
//! receives it by reference.

use std::sync::Arc;

use log::warn;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::{
    client::{Authenticator, Registration},
    error::{self, Result},
    http::AuthEvent,
    session::{Session, State},
    storage::Storage,
};

pub(crate) struct SessionManager<A> {
    api: A,
    state: RwLock<State>,
    storage: Mutex<Box<dyn Storage<Session>>>,
}

impl<A: Authenticator + Send + Sync> SessionManager<A> {
    pub(crate) fn new(api: A, storage: Box<dyn Storage<Session>>) -> Self {
        Self {
            api,
            state: RwLock::new(State::Uninitialized),
            storage: Mutex::new(storage),
        }
    }

    pub(crate) async fn state(&self) -> State {
        self.state.read().await.clone()
    }

    pub(crate) async fn session(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    pub(crate) async fn require_session(&self) -> Result<Session> {
        self.session().await.ok_or(error::Error::Anonymous)
    }

    /// Restore any persisted session. A storage or decode failure degrades
    /// to `Anonymous`: a missing session just means the user signs in again.
    pub(crate) async fn load(&self) -> State {
        {
            let mut state = self.state.write().await;
            *state = State::Loading;
        }

        let candidate = { self.storage.lock().await.get().await };
        let next = match candidate {
            Ok(Some(session)) => {
                self.api.set_token(session.token().clone()).await;
                State::Authenticated(session)
            }
            Ok(None) => State::Anonymous,
            Err(e) => {
                warn!(
                    "Failed to restore the stored session, so you need to sign in again: {}",
                    e
                );
                State::Anonymous
            }
        };

        let mut state = self.state.write().await;
        *state = next.clone();
        next
    }

    pub(crate) async fn sign_in(&self, username: &str, password: &SecretString) -> Result<Session> {
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(error::Validation::MissingCredentials.into());
        }

        let credentials = self.api.login(username, password).await?;
        let session = Session::new(username.to_owned(), credentials.user_id, credentials.token)?;
        self.establish(session.clone()).await;
        Ok(session)
    }

    /// Registration only succeeds when the server hands back complete
    /// credentials; an acknowledgement without them never turns into a
    /// session.
    pub(crate) async fn sign_up(&self, registration: &Registration) -> Result<Session> {
        if registration.username.is_empty()
            || registration.email.is_empty()
            || registration.password.expose_secret().is_empty()
        {
            return Err(error::Validation::MissingProfileFields.into());
        }

        let credentials = self.api.register(registration).await?;
        self.api.set_token(credentials.token.clone()).await;
        let session = Session::new(
            registration.username.clone(),
            credentials.user_id,
            credentials.token,
        )?;
        self.establish(session.clone()).await;
        Ok(session)
    }

    pub(crate) async fn sign_out(&self) {
        self.api.clear_token().await;
        {
            let mut state = self.state.write().await;
            *state = State::Anonymous;
        }
        if let Err(e) = self.storage.lock().await.clear().await {
            warn!("Failed to clear the stored session: {}", e);
        }
    }

    /// React to a session-invalidating response observed by the network
    /// layer. The token is already gone by the time this runs; here the
    /// session state and its durable copy follow.
    pub(crate) async fn handle(&self, event: AuthEvent) {
        warn!(
            "The server rejected our session (HTTP {}), so you need to sign in again",
            event.status
        );
        {
            let mut state = self.state.write().await;
            *state = State::Anonymous;
        }
        if let Err(e) = self.storage.lock().await.clear().await {
            warn!("Failed to clear the stored session: {}", e);
        }
    }

    /// Long-running form used by the application: consumes invalidation
    /// events for the life of the process.
    pub(crate) async fn run_invalidation_listener(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<AuthEvent>,
    ) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
    }

    /// Deterministic form: process whatever invalidations have queued up,
    /// then return.
    pub(crate) async fn drain_invalidations(
        &self,
        events: &mut mpsc::UnboundedReceiver<AuthEvent>,
    ) {
        while let Ok(event) = events.try_recv() {
            self.handle(event).await;
        }
    }

    async fn establish(&self, session: Session) {
        if let Err(e) = self.storage.lock().await.update(&session).await {
            warn!("Failed to persist the session; it will last until exit: {}", e);
        }
        let mut state = self.state.write().await;
        *state = State::Authenticated(session);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        client::{Authenticator, Credentials, Registration},
        error::{Api, Error, Validation},
        session::{SecretToken, Token},
        storage::Memory,
    };

    /// Canned network layer: grants fixed credentials or a fixed error.
    struct FakeAuth {
        user_id: Option<i64>,
        token: Option<&'static str>,
    }

    #[async_trait]
    impl Authenticator for FakeAuth {
        async fn login(&self, _username: &str, _password: &SecretString) -> Result<Credentials> {
            self.grant()
        }

        async fn register(&self, _registration: &Registration) -> Result<Credentials> {
            self.grant()
        }

        async fn set_token(&self, _token: SecretToken) {}

        async fn clear_token(&self) {}
    }

    impl FakeAuth {
        fn grant(&self) -> Result<Credentials> {
            let user_id = self.user_id.ok_or(Api::MissingField("user_id"))?;
            let token = self.token.ok_or(Api::MissingField("access_token"))?;
            Ok(Credentials {
                user_id,
                token: SecretToken::new(Token::from(token.to_owned())),
            })
        }
    }

    fn manager(user_id: Option<i64>, token: Option<&'static str>) -> SessionManager<FakeAuth> {
        SessionManager::new(FakeAuth { user_id, token }, Box::new(Memory::new()))
    }

    fn registration() -> Registration {
        Registration {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            phone: None,
            password: SecretString::new("pw123".to_owned()),
            buddy_name: None,
        }
    }

    #[tokio::test]
    async fn load_without_a_stored_session_is_anonymous() {
        let manager = manager(Some(7), Some("abc"));
        assert!(matches!(manager.load().await, State::Anonymous));
        assert!(manager.session().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_establishes_and_persists_a_session() -> Result<()> {
        let manager = manager(Some(7), Some("abc"));
        let _state = manager.load().await;

        let session = manager
            .sign_in("alice", &SecretString::new("pw123".to_owned()))
            .await?;
        assert_eq!(session.username(), "alice");
        assert_eq!(session.user_id(), 7);

        assert!(matches!(manager.state().await, State::Authenticated(_)));
        let stored = manager.storage.lock().await.get().await?;
        assert_eq!(stored.map(|s| s.user_id()), Some(7));
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_with_empty_credentials_never_touches_the_network() {
        let manager = manager(Some(7), Some("abc"));
        let result = manager.sign_in("", &SecretString::new(String::new())).await;
        assert!(matches!(
            result,
            Err(Error::Validation(Validation::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn failed_sign_in_stays_anonymous_and_persists_nothing() -> Result<()> {
        let manager = manager(None, None);
        let _state = manager.load().await;

        let result = manager
            .sign_in("alice", &SecretString::new("wrong".to_owned()))
            .await;
        assert!(result.is_err());
        assert!(matches!(manager.state().await, State::Anonymous));
        assert!(manager.storage.lock().await.get().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_without_complete_credentials_is_a_hard_failure() -> Result<()> {
        // Server acknowledged the registration but returned no token.
        let manager = manager(Some(7), None);
        let _state = manager.load().await;

        let result = manager.sign_up(&registration()).await;
        assert!(matches!(
            result,
            Err(Error::Api(Api::MissingField("access_token")))
        ));
        assert!(matches!(manager.state().await, State::Anonymous));
        assert!(manager.storage.lock().await.get().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_with_complete_credentials_behaves_like_sign_in() -> Result<()> {
        let manager = manager(Some(9), Some("xyz"));
        let _state = manager.load().await;

        let session = manager.sign_up(&registration()).await?;
        assert_eq!(session.user_id(), 9);
        assert!(matches!(manager.state().await, State::Authenticated(_)));
        Ok(())
    }

    #[tokio::test]
    async fn sign_out_clears_state_and_store() -> Result<()> {
        let manager = manager(Some(7), Some("abc"));
        let _state = manager.load().await;
        let _session = manager
            .sign_in("alice", &SecretString::new("pw123".to_owned()))
            .await?;

        manager.sign_out().await;
        assert!(matches!(manager.state().await, State::Anonymous));
        assert!(manager.storage.lock().await.get().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalidation_event_forces_anonymous() -> Result<()> {
        let manager = manager(Some(7), Some("abc"));
        let _state = manager.load().await;
        let _session = manager
            .sign_in("alice", &SecretString::new("pw123".to_owned()))
            .await?;

        manager
            .handle(AuthEvent {
                status: StatusCode::UNAUTHORIZED,
            })
            .await;
        assert!(matches!(manager.state().await, State::Anonymous));
        assert!(manager.storage.lock().await.get().await?.is_none());
        Ok(())
    }
}
