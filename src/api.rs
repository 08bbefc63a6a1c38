// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

//! Wire-format types and their normalization into the stable client models.
//!
//! Server payload field spellings have drifted between API revisions
//! (`eventId`/`id`, `eventTitle`/`title`, `eventImageUrl`/`imageUrl`, …).
//! Every historical spelling is accepted here via serde aliases and
//! converted into exactly one canonical shape; nothing outside this module
//! sees a raw field name.

use log::warn;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    client,
    error::{self, Result},
};

/// Unwrap the server's response envelope.
///
/// Newer endpoints wrap the real payload as `{"info": …, "payload": …}`;
/// legacy endpoints return it bare. Detection is by field presence so
/// callers never need to know which revision a given endpoint speaks.
pub(crate) fn unwrap_envelope(body: Value) -> Result<Value> {
    match body {
        Value::Object(mut map) if map.contains_key("payload") => {
            Ok(map.remove("payload").unwrap_or(Value::Null))
        }
        body @ (Value::Object(_) | Value::Array(_)) => Ok(body),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Err(error::Api::MissingEnvelope.into())
        }
    }
}

/// Decode a list payload item by item. A malformed record is logged and
/// skipped rather than poisoning the whole list; screens still get
/// everything that did decode.
pub(crate) fn collect<T, C>(items: Vec<Value>, context: &str) -> Vec<C>
where
    T: for<'de> Deserialize<'de> + Into<C>,
{
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                warn!("Skipping a malformed {} record: {}", context, e);
                None
            }
        })
        .collect()
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct EventPreview {
    #[serde(alias = "eventId")]
    pub(crate) id: i64,
    #[serde(alias = "eventTitle")]
    pub(crate) title: String,
    #[serde(
        default,
        rename = "imageUrl",
        alias = "eventImageUrl",
        alias = "image_url"
    )]
    pub(crate) image_url: String,
    #[serde(default, rename = "startDate", alias = "start_time")]
    pub(crate) start_date: Option<String>,
    #[serde(default, rename = "endDate", alias = "end_time")]
    pub(crate) end_date: Option<String>,
    #[serde(default, rename = "savedAmount", alias = "saved_amount")]
    pub(crate) saved_count: u64,
    #[serde(default, rename = "eventSaved", alias = "saved")]
    pub(crate) saved: bool,
    #[serde(default, rename = "matchScore", alias = "match_score")]
    pub(crate) match_score: Option<f64>,
}

impl From<EventPreview> for client::EventPreview {
    fn from(value: EventPreview) -> Self {
        Self {
            id: value.id,
            title: value.title,
            image_url: value.image_url,
            start_date: value.start_date,
            end_date: value.end_date,
            saved_count: value.saved_count,
            saved: value.saved,
            match_score: value.match_score,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct EventDetail {
    #[serde(alias = "eventId")]
    pub(crate) id: i64,
    #[serde(alias = "eventTitle")]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(
        default,
        rename = "imageUrl",
        alias = "eventImageUrl",
        alias = "image_url"
    )]
    pub(crate) image_url: String,
    #[serde(default, rename = "startDate", alias = "start_time")]
    pub(crate) start_date: Option<String>,
    #[serde(default, rename = "endDate", alias = "end_time")]
    pub(crate) end_date: Option<String>,
    #[serde(default, rename = "organizerId", alias = "organizer_id")]
    pub(crate) organizer_id: Option<i64>,
    #[serde(default, rename = "attendeeCount", alias = "attendee_count")]
    pub(crate) attendee_count: u64,
    #[serde(default, rename = "savedAmount", alias = "saved_amount")]
    pub(crate) saved_count: u64,
    #[serde(default, rename = "eventSaved", alias = "saved")]
    pub(crate) saved: bool,
    #[serde(default, rename = "matchScore", alias = "match_score")]
    pub(crate) match_score: Option<f64>,
}

impl From<EventDetail> for client::EventDetail {
    fn from(value: EventDetail) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            image_url: value.image_url,
            start_date: value.start_date,
            end_date: value.end_date,
            organizer_id: value.organizer_id,
            attendee_count: value.attendee_count,
            saved_count: value.saved_count,
            saved: value.saved,
            match_score: value.match_score,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct EventBundle {
    pub(crate) event: EventDetail,
    #[serde(default, rename = "similarEvents", alias = "similar_events")]
    pub(crate) similar_events: Vec<Value>,
    #[serde(default, rename = "organizerEvents", alias = "organizer_events")]
    pub(crate) organizer_events: Vec<Value>,
}

impl From<EventBundle> for client::EventBundle {
    fn from(value: EventBundle) -> Self {
        Self {
            event: value.event.into(),
            similar_events: collect::<EventPreview, _>(value.similar_events, "similar event"),
            organizer_events: collect::<EventPreview, _>(
                value.organizer_events,
                "organizer event",
            ),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Friend {
    pub(crate) id: i64,
    pub(crate) username: String,
    #[serde(default, rename = "displayName", alias = "buddyName")]
    pub(crate) display_name: Option<String>,
}

impl From<Friend> for client::Friend {
    fn from(value: Friend) -> Self {
        Self {
            id: value.id,
            username: value.username,
            display_name: value.display_name,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct FriendRequest {
    pub(crate) id: i64,
    #[serde(rename = "fromUserId", alias = "from_user_id")]
    pub(crate) from_user_id: i64,
    #[serde(default, rename = "fromUser", alias = "from_user")]
    pub(crate) from_user: Option<Friend>,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

impl From<FriendRequest> for client::FriendRequest {
    fn from(value: FriendRequest) -> Self {
        Self {
            id: value.id,
            from_user_id: value.from_user_id,
            username: value
                .from_user
                .map(|user| user.username)
                .unwrap_or_default(),
            status: parse_request_status(value.status.as_deref()),
        }
    }
}

fn parse_request_status(status: Option<&str>) -> client::FriendRequestStatus {
    match status {
        None | Some("pending") => client::FriendRequestStatus::Pending,
        Some("accepted") => client::FriendRequestStatus::Accepted,
        Some("declined") => client::FriendRequestStatus::Declined,
        Some(other) => {
            warn!("Treating unknown friend request status {:?} as pending", other);
            client::FriendRequestStatus::Pending
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Ticket {
    pub(crate) id: i64,
    #[serde(rename = "eventId", alias = "event_id")]
    pub(crate) event_id: i64,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub(crate) created_at: Option<String>,
    #[serde(default, rename = "qrCode", alias = "QRCode", alias = "qr_code")]
    pub(crate) qr_code: String,
}

impl From<Ticket> for client::Ticket {
    fn from(value: Ticket) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            created_at: value.created_at,
            qr_code: value.qr_code,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
}

impl From<User> for client::User {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub(crate) users: Vec<Value>,
    #[serde(default)]
    pub(crate) events: Vec<Value>,
}

impl From<SearchResults> for client::SearchResults {
    fn from(value: SearchResults) -> Self {
        Self {
            users: collect::<User, _>(value.users, "user"),
            events: collect::<EventPreview, _>(value.events, "event"),
        }
    }
}

/// Body of a successful login (and, on servers that return one, of a
/// registration). Both fields are optional on the wire so that their absence
/// can be reported as a distinct error instead of a decode failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CredentialsPayload {
    #[serde(default)]
    pub(crate) user_id: Option<i64>,
    #[serde(default)]
    pub(crate) access_token: Option<String>,
}

impl TryFrom<CredentialsPayload> for client::Credentials {
    type Error = error::Error;

    fn try_from(value: CredentialsPayload) -> Result<Self> {
        let user_id = value
            .user_id
            .ok_or(error::Api::MissingField("user_id"))?;
        let token = value
            .access_token
            .ok_or(error::Api::MissingField("access_token"))?;

        Ok(Self {
            user_id,
            token: crate::session::SecretToken::new(token.into()),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Acknowledgement {
    #[serde(default)]
    pub(crate) info: Option<String>,
}

/// Outbound body of `POST /users/register`. The server expects the whole
/// profile shape, including counters it owns; those are sent zeroed the way
/// the mobile clients always have.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegistrationBody {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) password: String,
    pub(crate) buddy_name: String,
    pub(crate) preferred_event_size: u32,
    pub(crate) preferred_interactivity: u32,
    pub(crate) preferred_noisiness: u32,
    pub(crate) preferred_crowdedness: u32,
    pub(crate) preferred_music_styles: Vec<String>,
    pub(crate) preferred_event_types: Vec<String>,
    pub(crate) user_activity_level: u32,
    pub(crate) social_score: u32,
    pub(crate) events_attended: u32,
    pub(crate) sent_friend_requests: Vec<Value>,
    pub(crate) received_friend_requests: Vec<Value>,
    pub(crate) friendships: Vec<Value>,
}

impl From<&client::Registration> for RegistrationBody {
    fn from(value: &client::Registration) -> Self {
        Self {
            id: 0,
            username: value.username.clone(),
            email: value.email.clone(),
            phone: value.phone.clone().unwrap_or_default(),
            password: value.password.expose_secret().clone(),
            buddy_name: value.buddy_name.clone().unwrap_or_default(),
            preferred_event_size: 0,
            preferred_interactivity: 0,
            preferred_noisiness: 0,
            preferred_crowdedness: 0,
            preferred_music_styles: Vec::new(),
            preferred_event_types: Vec::new(),
            user_activity_level: 0,
            social_score: 0,
            events_attended: 0,
            sent_friend_requests: Vec::new(),
            received_friend_requests: Vec::new(),
            friendships: Vec::new(),
        }
    }
}

/// Outbound body of `POST /events`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewEventBody {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image_url: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) organizer_id: i64,
}

impl From<&client::NewEvent> for NewEventBody {
    fn from(value: &client::NewEvent) -> Self {
        Self {
            id: 0,
            title: value.title.clone(),
            description: value.description.clone(),
            image_url: value.image_url.clone(),
            start_date: value.start_date.clone(),
            end_date: value.end_date.clone(),
            latitude: value.latitude,
            longitude: value.longitude,
            organizer_id: value.organizer_id,
        }
    }
}

/// Outbound body of `PUT /users/preferences`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreferencesBody {
    pub(crate) preferred_event_size: u32,
    pub(crate) preferred_interactivity: u32,
    pub(crate) preferred_noisiness: u32,
    pub(crate) preferred_crowdedness: u32,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) radius: f64,
}

impl From<&client::Preferences> for PreferencesBody {
    fn from(value: &client::Preferences) -> Self {
        Self {
            preferred_event_size: value.preferred_event_size,
            preferred_interactivity: value.preferred_interactivity,
            preferred_noisiness: value.preferred_noisiness,
            preferred_crowdedness: value.preferred_crowdedness,
            latitude: value.latitude,
            longitude: value.longitude,
            radius: value.radius,
        }
    }
}
