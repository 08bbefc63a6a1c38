// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use async_trait::async_trait;
use clap::ValueEnum;
use secrecy::SecretString;
use tabled::Tabled;

use crate::{error::Result, session::SecretToken};

/// The stable, display-ready projection of a server event record. Raw server
/// field spellings never make it past `api`; everything here is canonical.
#[derive(Clone, Debug, PartialEq, Tabled)]
pub(crate) struct EventPreview {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(skip)]
    pub(crate) image_url: String,
    #[tabled(rename = "Starts", display_with = "display_option")]
    pub(crate) start_date: Option<String>,
    #[tabled(rename = "Ends", display_with = "display_option")]
    pub(crate) end_date: Option<String>,
    #[tabled(rename = "Saves")]
    pub(crate) saved_count: u64,
    #[tabled(rename = "Saved")]
    pub(crate) saved: bool,
    #[tabled(rename = "Match", display_with = "display_option")]
    pub(crate) match_score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EventDetail {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image_url: String,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) organizer_id: Option<i64>,
    pub(crate) attendee_count: u64,
    pub(crate) saved_count: u64,
    pub(crate) saved: bool,
    pub(crate) match_score: Option<f64>,
}

/// The event-detail endpoint returns the event plus two related carousels.
#[derive(Clone, Debug)]
pub(crate) struct EventBundle {
    pub(crate) event: EventDetail,
    pub(crate) similar_events: Vec<EventPreview>,
    pub(crate) organizer_events: Vec<EventPreview>,
}

/// Sections of the personalized feed, keyed by the server-provided section
/// title.
pub(crate) type Feed = HashMap<String, Vec<EventPreview>>;

#[derive(Clone, Debug, PartialEq, Tabled)]
pub(crate) struct Friend {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Username")]
    pub(crate) username: String,
    #[tabled(rename = "Name", display_with = "display_option")]
    pub(crate) display_name: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
pub(crate) enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl FriendRequestStatus {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Tabled)]
pub(crate) struct FriendRequest {
    #[tabled(rename = "Request")]
    pub(crate) id: i64,
    #[tabled(rename = "From")]
    pub(crate) from_user_id: i64,
    #[tabled(rename = "Username")]
    pub(crate) username: String,
    #[tabled(rename = "Status")]
    pub(crate) status: FriendRequestStatus,
}

/// Server-issued only; the client never constructs one locally.
#[derive(Clone, Debug, PartialEq, Tabled)]
pub(crate) struct Ticket {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Event")]
    pub(crate) event_id: i64,
    #[tabled(rename = "Issued", display_with = "display_option")]
    pub(crate) created_at: Option<String>,
    #[tabled(rename = "QR Code")]
    pub(crate) qr_code: String,
}

#[derive(Clone, Debug, PartialEq, Tabled)]
pub(crate) struct User {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Username")]
    pub(crate) username: String,
    #[tabled(rename = "Email", display_with = "display_option")]
    pub(crate) email: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct SearchResults {
    pub(crate) users: Vec<User>,
    pub(crate) events: Vec<EventPreview>,
}

/// 2xx outcome of a ticket scan. Rejections surface as
/// `Error::Api(Api::Status(..))` so the caller can branch on the HTTP
/// status, mirroring how gate-scanner screens decide what to display.
#[derive(Clone, Debug)]
pub(crate) struct TicketScan {
    pub(crate) status: reqwest::StatusCode,
    pub(crate) info: Option<String>,
}

/// What a successful login or registration yields: enough to build a
/// `Session` together with the username the caller already has.
pub(crate) struct Credentials {
    pub(crate) user_id: i64,
    pub(crate) token: SecretToken,
}

/// Profile fields collected at registration time.
pub(crate) struct Registration {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) password: SecretString,
    pub(crate) buddy_name: Option<String>,
}

/// Fields accepted by the event-creation endpoint.
pub(crate) struct NewEvent {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image_url: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) organizer_id: i64,
}

/// Discovery preferences attached to the user's profile.
pub(crate) struct Preferences {
    pub(crate) preferred_event_size: u32,
    pub(crate) preferred_interactivity: u32,
    pub(crate) preferred_noisiness: u32,
    pub(crate) preferred_crowdedness: u32,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) radius: f64,
}

/// The slice of the network layer the session manager depends on: the two
/// credential-issuing operations plus bearer-token custody. Kept narrow so
/// tests can drive the manager against a canned implementation.
#[async_trait]
pub(crate) trait Authenticator {
    async fn login(&self, username: &str, password: &SecretString) -> Result<Credentials>;

    async fn register(&self, registration: &Registration) -> Result<Credentials>;

    async fn set_token(&self, token: SecretToken);

    async fn clear_token(&self);
}

fn display_option<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(String::new, ToString::to_string)
}
