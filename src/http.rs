// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

//! The network access layer: the only component that performs HTTP.
//!
//! One `HttpApi` exists per process and is shared by every command; its only
//! mutable state is the current bearer token (last write wins). Read-shaped
//! operations that feed list rendering degrade to an empty collection on
//! failure; mutating operations the caller must react to propagate their
//! error. Each operation documents which side of that line it is on.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::warn;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    RequestBuilder, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    api, client,
    error::{self, Error, Result},
    metadata,
    session::SecretToken,
};

/// Applied to every request; callers cannot override it.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Section titles the feed degrades to when the server has nothing for the
/// user yet. Feed absence is an expected state, not an error.
pub(crate) const FEED_FALLBACK_SECTIONS: [&str; 2] = ["Für dich", "In deiner Nähe"];

const REMOVE_FRIEND_FALLBACK: &str = "An error occurred while removing the friend.";

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) base_url: Url,
    /// Conservatively treat any 5xx like a session-invalidating failure.
    /// The server cannot currently tell us whether a 5xx invalidated the
    /// session, so this defaults to on.
    pub(crate) clear_token_on_server_error: bool,
}

/// Emitted whenever a response indicates the session is no longer usable.
/// The session manager consumes these and forces re-authentication even when
/// the calling screen ignores its own error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AuthEvent {
    pub(crate) status: StatusCode,
}

struct Shared {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretToken>>,
    events: mpsc::UnboundedSender<AuthEvent>,
    clear_token_on_server_error: bool,
}

#[derive(Clone)]
pub(crate) struct HttpApi {
    shared: Arc<Shared>,
    scope: CancellationToken,
}

impl HttpApi {
    pub(crate) fn new(config: Config) -> Result<(Self, mpsc::UnboundedReceiver<AuthEvent>)> {
        if config.base_url.cannot_be_a_base() {
            return Err(error::Validation::UnsupportedBaseUrl.into());
        }

        let mut headers = HeaderMap::new();
        let _previous = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let (tx, rx) = mpsc::unbounded_channel();

        Ok((
            Self {
                shared: Arc::new(Shared {
                    http,
                    base_url: config.base_url,
                    token: RwLock::new(None),
                    events: tx,
                    clear_token_on_server_error: config.clear_token_on_server_error,
                }),
                scope: CancellationToken::new(),
            },
            rx,
        ))
    }

    /// A handle whose requests are abandoned when `scope` is cancelled,
    /// resolving to `Error::Cancelled`. The token and connection pool stay
    /// shared with the parent.
    pub(crate) fn scoped(&self, scope: CancellationToken) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            scope,
        }
    }

    pub(crate) async fn set_token(&self, token: SecretToken) {
        let mut guard = self.shared.token.write().await;
        *guard = Some(token);
    }

    pub(crate) async fn clear_token(&self) {
        let mut guard = self.shared.token.write().await;
        *guard = None;
    }

    #[cfg(test)]
    pub(crate) async fn has_token(&self) -> bool {
        self.shared.token.read().await.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.shared.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            let _parts = parts.pop_if_empty().extend(segments);
        }
        url
    }

    fn notify_invalidated(&self, status: StatusCode) {
        // A dropped receiver only means nobody is listening anymore.
        let _result = self.shared.events.send(AuthEvent { status });
    }

    /// Send a request through the global failure interceptor. On 401 the
    /// token is cleared and an `AuthEvent` emitted before the error is
    /// propagated; 5xx gets the same conservative treatment when configured.
    async fn dispatch(&self, req: RequestBuilder, authenticated: bool) -> Result<reqwest::Response> {
        let req = if authenticated {
            match *self.shared.token.read().await {
                Some(ref token) => req.header(
                    AUTHORIZATION,
                    format!("Bearer {}", token.expose_secret().as_str()),
                ),
                None => req,
            }
        } else {
            req
        };

        let response = tokio::select! {
            () = self.scope.cancelled() => return Err(Error::Cancelled),
            response = req.send() => response?,
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.clear_token().await;
            self.notify_invalidated(status);
            return Err(error::Api::Unauthorized.into());
        }
        if status.is_server_error() {
            if self.shared.clear_token_on_server_error {
                self.clear_token().await;
                self.notify_invalidated(status);
            }
            return Err(error::Api::Status(status).into());
        }
        if !status.is_success() {
            return Err(error::Api::Status(status).into());
        }

        Ok(response)
    }

    async fn payload(&self, req: RequestBuilder) -> Result<Value> {
        let response = self.dispatch(req, true).await?;
        let body: Value = response.json().await?;
        api::unwrap_envelope(body)
    }

    async fn acknowledged(&self, req: RequestBuilder) -> Result<String> {
        let response = self.dispatch(req, true).await?;
        let body: Value = response.json().await?;
        let ack: api::Acknowledgement = serde_json::from_value(body).unwrap_or_default();
        Ok(ack.info.unwrap_or_else(|| "OK".to_owned()))
    }

    /// `GET /events/{user}/{event}`: raises.
    pub(crate) async fn get_event(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<client::EventBundle> {
        let url = self.endpoint(&["events", &user_id.to_string(), &event_id.to_string()]);
        let bundle: api::EventBundle = serde_json::from_value(
            self.payload(self.shared.http.get(url)).await?,
        )?;
        Ok(bundle.into())
    }

    /// `GET /events?user_id=`: a 404 means the server has no feed for the
    /// user yet and yields the fixed empty sections; other failures raise.
    pub(crate) async fn get_feed(&self, user_id: i64) -> Result<client::Feed> {
        let url = self.endpoint(&["events"]);
        let req = self.shared.http.get(url).query(&[("user_id", user_id)]);

        let payload = match self.payload(req).await {
            Ok(payload) => payload,
            Err(Error::Api(error::Api::Status(StatusCode::NOT_FOUND))) => {
                return Ok(FEED_FALLBACK_SECTIONS
                    .iter()
                    .map(|section| ((*section).to_owned(), Vec::new()))
                    .collect());
            }
            Err(e) => return Err(e),
        };

        let sections: HashMap<String, Vec<Value>> = serde_json::from_value(payload)?;
        Ok(sections
            .into_iter()
            .map(|(title, events)| (title, api::collect::<api::EventPreview, _>(events, "feed event")))
            .collect())
    }

    /// `POST /saved_events/{event}/{user}`: raises so the screen can show
    /// success or failure feedback.
    pub(crate) async fn save_event(&self, user_id: i64, event_id: i64) -> Result<String> {
        let url = self.endpoint(&["saved_events", &event_id.to_string(), &user_id.to_string()]);
        self.acknowledged(self.shared.http.post(url)).await
    }

    /// `GET /saved_events/{user}`: degrades to an empty list on any
    /// failure so the screen can render an empty state.
    pub(crate) async fn get_saved_events(&self, user_id: i64) -> Vec<client::EventPreview> {
        let url = self.endpoint(&["saved_events", &user_id.to_string()]);
        let result: Result<Vec<Value>> = async {
            Ok(serde_json::from_value(
                self.payload(self.shared.http.get(url)).await?,
            )?)
        }
        .await;

        match result {
            Ok(items) => api::collect::<api::EventPreview, _>(items, "saved event"),
            Err(e) => {
                warn!("Error while fetching saved events: {}", e);
                Vec::new()
            }
        }
    }

    /// `POST /events`: raises.
    pub(crate) async fn create_event(&self, event: &client::NewEvent) -> Result<()> {
        let url = self.endpoint(&["events"]);
        let body = api::NewEventBody::from(event);
        let _response = self
            .dispatch(self.shared.http.post(url).json(&body), true)
            .await?;
        Ok(())
    }

    /// `GET /search?user_id=&q=`: raises.
    pub(crate) async fn search(&self, user_id: i64, query: &str) -> Result<client::SearchResults> {
        let url = self.endpoint(&["search"]);
        let req = self
            .shared
            .http
            .get(url)
            .query(&[("user_id", user_id.to_string()), ("q", query.to_owned())]);
        let results: api::SearchResults = serde_json::from_value(self.payload(req).await?)?;
        Ok(results.into())
    }

    /// `POST /friend_requests/send`: degrades to `false`.
    pub(crate) async fn send_friend_request(&self, from_user_id: i64, to_user_id: i64) -> bool {
        let url = self.endpoint(&["friend_requests", "send"]);
        let req = self.shared.http.post(url).query(&[
            ("fromUserId", from_user_id),
            ("toUserId", to_user_id),
        ]);

        match self.dispatch(req, true).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Error sending friend request: {}", e);
                false
            }
        }
    }

    /// `POST /friend_requests/respond`: degrades to `false`.
    pub(crate) async fn respond_friend_request(
        &self,
        user_id: i64,
        request_id: i64,
        status: client::FriendRequestStatus,
    ) -> bool {
        let url = self.endpoint(&["friend_requests", "respond"]);
        let req = self.shared.http.post(url).query(&[
            ("user_id", user_id.to_string()),
            ("requestId", request_id.to_string()),
            ("status", status.as_str().to_owned()),
        ]);

        match self.dispatch(req, true).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Error responding to friend request: {}", e);
                false
            }
        }
    }

    /// `GET /users/received_friend_requests`: degrades to an empty list.
    pub(crate) async fn get_friend_requests(&self, user_id: i64) -> Vec<client::FriendRequest> {
        let url = self.endpoint(&["users", "received_friend_requests"]);
        let req = self.shared.http.get(url).query(&[("user_id", user_id)]);
        let result: Result<Vec<Value>> =
            async { Ok(serde_json::from_value(self.payload(req).await?)?) }.await;

        match result {
            Ok(items) => api::collect::<api::FriendRequest, _>(items, "friend request"),
            Err(e) => {
                warn!("Error getting friend requests: {}", e);
                Vec::new()
            }
        }
    }

    /// `GET /users/friends`: degrades to an empty list.
    pub(crate) async fn get_friends(&self, user_id: i64) -> Vec<client::Friend> {
        let url = self.endpoint(&["users", "friends"]);
        let req = self.shared.http.get(url).query(&[("user_id", user_id)]);
        let result: Result<Vec<Value>> =
            async { Ok(serde_json::from_value(self.payload(req).await?)?) }.await;

        match result {
            Ok(items) => api::collect::<api::Friend, _>(items, "friend"),
            Err(e) => {
                warn!("Error getting user friends: {}", e);
                Vec::new()
            }
        }
    }

    /// `DELETE /users/friends/delete`: degrades to a fixed failure message;
    /// the screen renders whatever string comes back.
    pub(crate) async fn remove_friend(&self, user_id: i64, friend_id: i64) -> String {
        let url = self.endpoint(&["users", "friends", "delete"]);
        let req = self.shared.http.delete(url).query(&[
            ("user_id", user_id),
            ("friend_id", friend_id),
        ]);

        match self.acknowledged(req).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!("Error removing friend: {}", e);
                REMOVE_FRIEND_FALLBACK.to_owned()
            }
        }
    }

    /// `GET /users?user_id=`: raises.
    pub(crate) async fn get_user(&self, user_id: i64) -> Result<client::User> {
        let url = self.endpoint(&["users"]);
        let req = self.shared.http.get(url).query(&[("user_id", user_id)]);
        let user: api::User = serde_json::from_value(self.payload(req).await?)?;
        Ok(user.into())
    }

    /// `GET /tickets/{user}`: degrades to an empty list.
    pub(crate) async fn get_user_tickets(&self, user_id: i64) -> Vec<client::Ticket> {
        let url = self.endpoint(&["tickets", &user_id.to_string()]);
        let result: Result<Vec<Value>> = async {
            Ok(serde_json::from_value(
                self.payload(self.shared.http.get(url)).await?,
            )?)
        }
        .await;

        match result {
            Ok(items) => api::collect::<api::Ticket, _>(items, "ticket"),
            Err(e) => {
                warn!("Error fetching user tickets: {}", e);
                Vec::new()
            }
        }
    }

    /// `POST /tickets/purchase`: raises.
    pub(crate) async fn purchase_ticket(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<client::Ticket> {
        let url = self.endpoint(&["tickets", "purchase"]);
        let req = self
            .shared
            .http
            .post(url)
            .json(&serde_json::json!({ "userId": user_id, "eventId": event_id }));
        let ticket: api::Ticket = serde_json::from_value(self.payload(req).await?)?;
        Ok(ticket.into())
    }

    /// `POST /tickets/verify`: raises; a rejected ticket surfaces as
    /// `Error::Api(Api::Status(..))` so the caller can branch on the HTTP
    /// status.
    pub(crate) async fn verify_ticket(&self, qr_code: &str) -> Result<client::TicketScan> {
        let url = self.endpoint(&["tickets", "verify"]);
        let req = self
            .shared
            .http
            .post(url)
            .json(&serde_json::json!({ "QRCode": qr_code }));

        let response = self.dispatch(req, true).await?;
        let status = response.status();
        let body: Value = response.json().await?;
        let ack: api::Acknowledgement = serde_json::from_value(body).unwrap_or_default();

        Ok(client::TicketScan {
            status,
            info: ack.info,
        })
    }

    /// `PUT /users/preferences`: degrades to `false`.
    pub(crate) async fn update_preferences(
        &self,
        user_id: i64,
        preferences: &client::Preferences,
    ) -> bool {
        let url = self.endpoint(&["users", "preferences"]);
        let req = self
            .shared
            .http
            .put(url)
            .query(&[("user_id", user_id)])
            .json(&api::PreferencesBody::from(preferences));

        match self.dispatch(req, true).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Error updating user preferences: {}", e);
                false
            }
        }
    }

    /// `PUT /users/change_password`: raises.
    pub(crate) async fn change_password(
        &self,
        user_id: i64,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<String> {
        let url = self.endpoint(&["users", "change_password"]);
        let req = self.shared.http.put(url).json(&serde_json::json!({
            "user_id": user_id,
            "current_password": current_password.expose_secret(),
            "new_password": new_password.expose_secret(),
        }));
        self.acknowledged(req).await
    }

    /// `DELETE /users/delete`: raises.
    pub(crate) async fn delete_user(&self, user_id: i64, password: &SecretString) -> Result<String> {
        let url = self.endpoint(&["users", "delete"]);
        let req = self.shared.http.delete(url).query(&[
            ("user_id", user_id.to_string()),
            ("password", password.expose_secret().clone()),
        ]);
        self.acknowledged(req).await
    }

    /// `POST /refresh-token`: raises; on success the stored token is
    /// replaced in place.
    pub(crate) async fn refresh_token(&self) -> Result<()> {
        let url = self.endpoint(&["refresh-token"]);
        let payload: api::CredentialsPayload =
            serde_json::from_value(self.payload(self.shared.http.post(url)).await?)?;
        let token = payload
            .access_token
            .ok_or(error::Api::MissingField("access_token"))?;

        self.set_token(SecretToken::new(token.into())).await;
        Ok(())
    }
}

#[async_trait]
impl client::Authenticator for HttpApi {
    /// `POST /users/login`: raises; on success the returned token is also
    /// installed as the active bearer token. The login request itself never
    /// carries an `Authorization` header.
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<client::Credentials> {
        let url = self.endpoint(&["users", "login"]);
        let req = self
            .shared
            .http
            .post(url)
            .query(&[
                ("username", username),
                ("password", password.expose_secret().as_str()),
            ]);

        let response = self.dispatch(req, false).await?;
        let body: Value = response.json().await?;
        let payload: api::CredentialsPayload = serde_json::from_value(api::unwrap_envelope(body)?)?;
        let credentials = client::Credentials::try_from(payload)?;

        self.set_token(credentials.token.clone()).await;
        Ok(credentials)
    }

    /// `POST /users/register`: raises. A response without `user_id` and
    /// `access_token` is a hard failure: we never fabricate a partial
    /// session out of a registration acknowledgement.
    async fn register(&self, registration: &client::Registration) -> Result<client::Credentials> {
        let url = self.endpoint(&["users", "register"]);
        let body = api::RegistrationBody::from(registration);
        let response = self
            .dispatch(self.shared.http.post(url).json(&body), false)
            .await?;

        let body: Value = response.json().await?;
        let payload: api::CredentialsPayload =
            serde_json::from_value(api::unwrap_envelope(body)?).unwrap_or_default();
        client::Credentials::try_from(payload)
    }

    async fn set_token(&self, token: SecretToken) {
        let mut guard = self.shared.token.write().await;
        *guard = Some(token);
    }

    async fn clear_token(&self) {
        let mut guard = self.shared.token.write().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use super::*;
    use crate::{
        client::Authenticator,
        manager::SessionManager,
        session::{State, Token},
        storage,
    };

    /// Serve `router` on an ephemeral local port and return the base URL to
    /// reach it.
    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn connect(
        base_url: Url,
        clear_token_on_server_error: bool,
    ) -> (HttpApi, mpsc::UnboundedReceiver<AuthEvent>) {
        HttpApi::new(Config {
            base_url,
            clear_token_on_server_error,
        })
        .unwrap()
    }

    async fn authenticated(api: &HttpApi) {
        api.set_token(SecretToken::new(Token::from("abc".to_owned())))
            .await;
    }

    /// Echoes the `Authorization` header back as the username so tests can
    /// observe exactly what the server received.
    fn header_echo_router() -> Router {
        Router::new().route(
            "/users",
            get(|headers: axum::http::HeaderMap| async move {
                Json(json!({
                    "id": 1,
                    "username": headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("none"),
                }))
            }),
        )
    }

    #[tokio::test]
    async fn attaches_the_bearer_token_only_while_one_is_set() -> Result<()> {
        let (api, _rx) = connect(serve(header_echo_router()).await, true);

        assert_eq!(api.get_user(1).await?.username, "none");

        authenticated(&api).await;
        assert_eq!(api.get_user(1).await?.username, "Bearer abc");

        api.clear_token().await;
        assert_eq!(api.get_user(1).await?.username, "none");
        Ok(())
    }

    #[tokio::test]
    async fn login_installs_the_returned_token() -> Result<()> {
        let router = header_echo_router().route(
            "/users/login",
            post(|| async {
                Json(json!({
                    "info": "Login successful",
                    "payload": {"user_id": 7, "access_token": "tok-123"},
                }))
            }),
        );
        let (api, _rx) = connect(serve(router).await, true);

        let credentials = api
            .login("alice", &SecretString::new("pw123".to_owned()))
            .await?;
        assert_eq!(credentials.user_id, 7);

        assert_eq!(api.get_user(1).await?.username, "Bearer tok-123");
        Ok(())
    }

    #[tokio::test]
    async fn registration_without_credentials_is_a_hard_failure() {
        let router = Router::new().route(
            "/users/register",
            post(|| async { Json(json!({"info": "User registered"})) }),
        );
        let (api, _rx) = connect(serve(router).await, true);

        let result = api
            .register(&client::Registration {
                username: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                phone: None,
                password: SecretString::new("pw123".to_owned()),
                buddy_name: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(Error::Api(error::Api::MissingField("user_id")))
        ));
        assert!(!api.has_token().await);
    }

    #[tokio::test]
    async fn unauthorized_clears_the_token_and_notifies() {
        let router = Router::new().route(
            "/users",
            get(|| async { StatusCode::UNAUTHORIZED }),
        );
        let (api, mut rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        let result = api.get_user(1).await;
        assert!(matches!(
            result,
            Err(Error::Api(error::Api::Unauthorized))
        ));
        assert!(!api.has_token().await);
        assert_eq!(
            rx.try_recv().ok(),
            Some(AuthEvent {
                status: StatusCode::UNAUTHORIZED
            })
        );
    }

    #[tokio::test]
    async fn invalidation_reaches_the_session_manager() {
        let router = Router::new().route(
            "/users",
            get(|| async { StatusCode::UNAUTHORIZED }),
        );
        let (api, mut rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        let manager = SessionManager::new(api.clone(), Box::new(storage::Memory::new()));
        let _result = api.get_user(1).await;

        manager.drain_invalidations(&mut rx).await;
        assert!(matches!(manager.state().await, State::Anonymous));
    }

    #[tokio::test]
    async fn server_errors_clear_the_token_by_default() {
        let router = Router::new().route(
            "/users",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let (api, mut rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        let result = api.get_user(1).await;
        assert!(matches!(
            result,
            Err(Error::Api(error::Api::Status(StatusCode::INTERNAL_SERVER_ERROR)))
        ));
        assert!(!api.has_token().await);
        assert_eq!(
            rx.try_recv().ok(),
            Some(AuthEvent {
                status: StatusCode::INTERNAL_SERVER_ERROR
            })
        );
    }

    #[tokio::test]
    async fn server_errors_keep_the_token_when_configured() {
        let router = Router::new().route(
            "/users",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let (api, mut rx) = connect(serve(router).await, false);
        authenticated(&api).await;

        let result = api.get_user(1).await;
        assert!(result.is_err());
        assert!(api.has_token().await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn missing_feed_degrades_to_the_fixed_empty_sections() -> Result<()> {
        // No routes at all, so every request comes back 404.
        let (api, _rx) = connect(serve(Router::new()).await, true);

        let feed = api.get_feed(1).await?;
        assert_eq!(feed.len(), FEED_FALLBACK_SECTIONS.len());
        for section in FEED_FALLBACK_SECTIONS {
            assert_eq!(feed.get(section).map(Vec::len), Some(0));
        }
        Ok(())
    }

    #[tokio::test]
    async fn feed_sections_decode_from_the_envelope() -> Result<()> {
        let router = Router::new().route(
            "/events",
            get(|| async {
                Json(json!({
                    "info": "Events found",
                    "payload": {
                        "Für dich": [{"id": 1, "title": "Concert"}],
                        "In deiner Nähe": [],
                    },
                }))
            }),
        );
        let (api, _rx) = connect(serve(router).await, true);

        let feed = api.get_feed(1).await?;
        assert_eq!(feed.get("Für dich").map(Vec::len), Some(1));
        assert_eq!(feed.get("In deiner Nähe").map(Vec::len), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn saved_events_degrade_to_an_empty_list() {
        let router = Router::new().route(
            "/saved_events/{user_id}",
            get(|| async { StatusCode::BAD_REQUEST }),
        );
        let (api, _rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        assert!(api.get_saved_events(1).await.is_empty());
        assert!(api.has_token().await);
    }

    #[tokio::test]
    async fn saving_an_event_makes_it_appear_in_the_saved_list() -> Result<()> {
        let saved = Arc::new(std::sync::Mutex::new(Vec::<i64>::new()));

        let recorder = Arc::clone(&saved);
        let reader = Arc::clone(&saved);
        let router = Router::new()
            .route(
                "/saved_events/{event_id}/{user_id}",
                post(
                    move |axum::extract::Path((event_id, _user_id)): axum::extract::Path<(
                        i64,
                        i64,
                    )>| {
                        let recorder = Arc::clone(&recorder);
                        async move {
                            recorder.lock().unwrap().push(event_id);
                            Json(json!({"info": "Event saved"}))
                        }
                    },
                ),
            )
            .route(
                "/saved_events/{user_id}",
                get(move || {
                    let reader = Arc::clone(&reader);
                    async move {
                        let events: Vec<Value> = reader
                            .lock()
                            .unwrap()
                            .iter()
                            .map(|id| json!({"id": id, "title": format!("Event {}", id)}))
                            .collect();
                        Json(json!({"info": "Saved events found", "payload": events}))
                    }
                }),
            );
        let (api, _rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        let ack = api.save_event(7, 42).await?;
        assert_eq!(ack, "Event saved");

        let events = api.get_saved_events(7).await;
        assert!(events.iter().any(|event| event.id == 42));
        Ok(())
    }

    #[tokio::test]
    async fn ticket_verification_reports_both_outcomes() -> Result<()> {
        let router = Router::new()
            .route(
                "/tickets/verify",
                post(|| async { Json(json!({"info": "Ticket valid"})) }),
            );
        let (api, _rx) = connect(serve(router).await, true);
        authenticated(&api).await;

        let scan = api.verify_ticket("qr-data").await?;
        assert_eq!(scan.status, StatusCode::OK);
        assert_eq!(scan.info.as_deref(), Some("Ticket valid"));

        let rejecting = Router::new().route(
            "/tickets/verify",
            post(|| async { StatusCode::CONFLICT }),
        );
        let (api, _rx) = connect(serve(rejecting).await, true);
        authenticated(&api).await;

        assert!(matches!(
            api.verify_ticket("qr-data").await,
            Err(Error::Api(error::Api::Status(StatusCode::CONFLICT)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn a_cancelled_scope_abandons_the_request() {
        let router = Router::new().route(
            "/users",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"id": 1, "username": "late"}))
            }),
        );
        let (api, _rx) = connect(serve(router).await, true);

        let scope = CancellationToken::new();
        scope.cancel();
        let scoped = api.scoped(scope);

        assert!(matches!(scoped.get_user(1).await, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn sign_in_persists_the_historical_session_record() -> Result<()> {
        let router = Router::new().route(
            "/users/login",
            post(|| async {
                Json(json!({
                    "info": "Login successful",
                    "payload": {"user_id": 7, "access_token": "abc"},
                }))
            }),
        );
        let (api, _rx) = connect(serve(router).await, true);

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        let manager =
            SessionManager::new(api, Box::new(storage::File::with_path(path.clone())));

        let session = manager
            .sign_in("alice", &SecretString::new("pw123".to_owned()))
            .await?;
        assert_eq!(session.user_id(), 7);

        assert_eq!(
            fs::read_to_string(path)?,
            r#"{"username":"alice","userID":7,"token":"abc"}"#
        );
        Ok(())
    }
}
