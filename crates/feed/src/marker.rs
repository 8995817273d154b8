use geo::Coordinate;

/// Stable marker identifier as issued by the backend.
pub type MarkerId = String;

/// A community member placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberMarker {
    pub id: MarkerId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub coordinate: Coordinate,
    /// Supplied by the presence overlay, never by the feed itself.
    pub is_online: bool,
    pub last_seen_ms: Option<u64>,
    pub rating: Option<f64>,
    pub books_owned: u32,
    pub friends_count: u32,
    pub contributions_count: u32,
    pub joined_at_ms: u64,
    pub is_verified: bool,
}

impl MemberMarker {
    pub fn new(id: impl Into<MarkerId>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            coordinate,
            is_online: false,
            last_seen_ms: None,
            rating: None,
            books_owned: 0,
            friends_count: 0,
            contributions_count: 0,
            joined_at_ms: 0,
            is_verified: false,
        }
    }
}

/// An organizer event placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub id: MarkerId,
    pub title: String,
    pub coordinate: Coordinate,
    pub event_type: String,
    pub start_at_ms: u64,
    pub end_at_ms: u64,
    pub venue: String,
    pub address: String,
    /// `0` means unlimited.
    pub capacity: u32,
    pub current_registrations: u32,
    pub organizer_id: String,
    pub viewer_is_organizer: bool,
    pub viewer_is_registered: bool,
}

impl EventMarker {
    pub fn new(id: impl Into<MarkerId>, title: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            coordinate,
            event_type: String::new(),
            start_at_ms: 0,
            end_at_ms: 0,
            venue: String::new(),
            address: String::new(),
            capacity: 0,
            current_registrations: 0,
            organizer_id: String::new(),
            viewer_is_organizer: false,
            viewer_is_registered: false,
        }
    }

    /// Remaining registration slots; `None` when capacity is unlimited.
    pub fn spots_left(&self) -> Option<u32> {
        if self.capacity == 0 {
            return None;
        }
        Some(self.capacity.saturating_sub(self.current_registrations))
    }
}

/// Any point-like entity on the community map.
///
/// A closed set of kinds: rendering and popup content dispatch on the variant,
/// so new kinds are a compile-time concern, not a runtime one.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Member(MemberMarker),
    Event(EventMarker),
}

impl Marker {
    pub fn id(&self) -> &str {
        match self {
            Marker::Member(m) => &m.id,
            Marker::Event(e) => &e.id,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        match self {
            Marker::Member(m) => m.coordinate,
            Marker::Event(e) => e.coordinate,
        }
    }

    /// Display label: the member's name or the event's title.
    pub fn label(&self) -> &str {
        match self {
            Marker::Member(m) => &m.name,
            Marker::Event(e) => &e.title,
        }
    }

    /// Community rating; events are unrated.
    pub fn rating(&self) -> Option<f64> {
        match self {
            Marker::Member(m) => m.rating,
            Marker::Event(_) => None,
        }
    }
}
