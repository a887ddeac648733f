use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What the diner is looking for. Not validated here; the booking API is the
/// authority on what it accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchCriteria {
    pub size: String,

    /// ISO date, `YYYY-MM-DD`.
    pub date: String,

    /// Four digit 24-hour time, `HHMM`.
    pub time: String,
}

impl SearchCriteria {
    pub fn new(size: impl ToString, date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            size: size.to_string(),
            date: date.into(),
            time: time.into(),
        }
    }
}

/// Anonymous session issued by `loginAnonymously`.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub jwt_token: String,

    /// Issued by the API but never used for renewal.
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("jwt_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchToken {
    pub search_id: String,

    #[serde(default)]
    pub areas: Vec<Area>,
}

/// A seating area (terrace, bar, dining room...) with the times it offers.
///
/// Shared by the search token response and the per-venue availability block.
/// Fields the client does not model are kept in `extra` so the value passes
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub options: Vec<AreaOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaOption {
    pub time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One venue in a search page, as returned by `search_request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantResult {
    pub post: VenuePost,

    #[serde(default)]
    pub availability: Availability,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenuePost {
    pub slug: String,

    pub venue_name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Availability {
    #[serde(default)]
    pub areas: Vec<Area>,

    #[serde(
        rename = "formattedRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub formatted_request: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RestaurantResult {
    #[must_use]
    pub fn venue_slug(&self) -> &str {
        &self.post.slug
    }

    #[must_use]
    pub fn venue_name(&self) -> &str {
        &self.post.venue_name
    }

    #[must_use]
    pub fn availability_areas(&self) -> &[Area] {
        &self.availability.areas
    }

    /// Every offered time across all areas, deduplicated, in API order.
    #[must_use]
    pub fn offered_times(&self) -> Vec<&str> {
        let mut times: Vec<&str> = Vec::new();
        for option in self.availability.areas.iter().flat_map(|a| &a.options) {
            if !times.contains(&option.time.as_str()) {
                times.push(&option.time);
            }
        }
        times
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    #[serde(default)]
    pub posts: Vec<RestaurantResult>,

    #[serde(default)]
    pub total: u64,
}
