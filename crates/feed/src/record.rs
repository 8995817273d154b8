//! Wire records for the marker feed.
//!
//! The backend returns a JSON array mixing member and event records. Decoding
//! is resilient: each element is decoded independently and malformed elements
//! are skipped, so one bad row never poisons a whole fetch.

use serde::{Deserialize, Serialize};

use geo::Coordinate;

use crate::marker::{EventMarker, Marker, MemberMarker};

#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// The payload as a whole was not a JSON array.
    Decode(String),
    Io(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Decode(msg) => write!(f, "feed payload malformed: {msg}"),
            FeedError::Io(msg) => write!(f, "feed read error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

/// One element of the feed payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireRecord {
    Member(WireMember),
    Event(WireEvent),
}

/// Member row as served by the REST API.
///
/// `coordinates` is `[lat, lon]`; any other arity marks the record malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub last_seen_ms: Option<u64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub books_owned: u32,
    #[serde(default)]
    pub friends_count: u32,
    #[serde(default)]
    pub contributions_count: u32,
    #[serde(default)]
    pub joined_at_ms: u64,
    #[serde(default)]
    pub is_verified: bool,
}

/// Event row as served by the REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub start_at_ms: u64,
    #[serde(default)]
    pub end_at_ms: u64,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub current_registrations: u32,
    #[serde(default)]
    pub organizer_id: String,
    #[serde(default)]
    pub viewer_is_organizer: bool,
    #[serde(default)]
    pub viewer_is_registered: bool,
}

/// Decoded feed plus how many records were dropped on the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFeed {
    pub markers: Vec<Marker>,
    pub skipped: usize,
}

/// Decode a feed payload.
///
/// Notes:
/// - The outer payload must be a JSON array; anything else is `FeedError::Decode`.
/// - Elements that fail to decode, or whose coordinate array is not `[lat, lon]`,
///   are counted in `skipped` and dropped. Non-finite or out-of-range
///   coordinates survive decoding; the proximity filter excludes them later.
pub fn decode_markers(json: &str) -> Result<DecodedFeed, FeedError> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| FeedError::Decode(e.to_string()))?;

    let mut markers = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        let Ok(record) = serde_json::from_value::<WireRecord>(row) else {
            skipped += 1;
            continue;
        };
        match build_marker(record) {
            Some(marker) => markers.push(marker),
            None => skipped += 1,
        }
    }

    Ok(DecodedFeed { markers, skipped })
}

fn build_marker(record: WireRecord) -> Option<Marker> {
    match record {
        WireRecord::Member(m) => {
            let coordinate = coordinate_from_array(&m.coordinates)?;
            Some(Marker::Member(MemberMarker {
                id: m.id,
                name: m.name,
                avatar_url: m.avatar_url,
                coordinate,
                is_online: false,
                last_seen_ms: m.last_seen_ms,
                rating: m.rating,
                books_owned: m.books_owned,
                friends_count: m.friends_count,
                contributions_count: m.contributions_count,
                joined_at_ms: m.joined_at_ms,
                is_verified: m.is_verified,
            }))
        }
        WireRecord::Event(e) => {
            let coordinate = coordinate_from_array(&e.coordinates)?;
            Some(Marker::Event(EventMarker {
                id: e.id,
                title: e.title,
                coordinate,
                event_type: e.event_type,
                start_at_ms: e.start_at_ms,
                end_at_ms: e.end_at_ms,
                venue: e.venue,
                address: e.address,
                capacity: e.capacity,
                current_registrations: e.current_registrations,
                organizer_id: e.organizer_id,
                viewer_is_organizer: e.viewer_is_organizer,
                viewer_is_registered: e.viewer_is_registered,
            }))
        }
    }
}

fn coordinate_from_array(array: &[f64]) -> Option<Coordinate> {
    match array {
        [lat, lon] => Some(Coordinate::new(*lat, *lon)),
        _ => None,
    }
}
