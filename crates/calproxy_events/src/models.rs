// --- File: crates/calproxy_events/src/models.rs ---
//! Data carried between the upstream API, the token cache and callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Client credentials for the upstream Auth endpoint.
///
/// Serializes to the `{ClientId, ClientSecret}` body the endpoint expects.
/// The secret never appears in `Debug` output.
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "ClientId")]
    client_id: String,
    #[serde(rename = "ClientSecret")]
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// A bearer token together with the instant it was issued.
///
/// Never mutated: a refresh produces a new value that replaces the old one.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_in_seconds: i64,
    issued_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in_seconds: i64, issued_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_in_seconds,
            issued_at,
        }
    }

    /// The raw bearer value for the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expires_in_seconds
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// `issued_at + expires_in_seconds`, saturating at the maximum representable instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Duration::try_seconds(self.expires_in_seconds)
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Validity left at `now`; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at().signed_duration_since(now)
    }

    /// Whether the token may still be handed out: strictly more than
    /// `threshold` of validity must remain.
    pub fn is_fresh(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.remaining(now) > threshold
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in_seconds", &self.expires_in_seconds)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Payload returned by the Auth endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// A calendar event as exchanged with the upstream API.
///
/// A blank `id` means the event has not been created upstream yet; it is
/// left out of the serialized body so an upsert creates a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(
        default,
        deserialize_with = "string_or_null",
        skip_serializing_if = "is_blank"
    )]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(with = "wire_date")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub start_date: DateTime<Utc>,
    #[serde(with = "wire_date")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub end_date: DateTime<Utc>,
}

impl CalendarEvent {
    /// True when the event carries no upstream identity yet.
    pub fn is_new(&self) -> bool {
        is_blank(&self.id)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// One page of events. `total` is the upstream count of all events, not the
/// length of `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventPage {
    pub total: u64,
    pub items: Vec<CalendarEvent>,
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO 8601 timestamps on the wire.
///
/// Accepts RFC 3339 with any offset, and offset-less timestamps (read as UTC).
/// Always writes RFC 3339 in UTC.
mod wire_date {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO 8601 timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}
