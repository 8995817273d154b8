use geo::Coordinate;

use crate::marker::Marker;

/// Identifies one fetch of the marker feed.
///
/// Intentionally a small, copyable handle: issued monotonically so commits
/// can be ordered and stale completions dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchId(pub u64);

/// The viewer's geolocation, or the lack of one.
///
/// Geolocation failures and timeouts map to `Unavailable`; the engine never
/// substitutes a default location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewerLocation {
    Known(Coordinate),
    Unavailable,
}

impl ViewerLocation {
    pub fn from_geolocation(result: Option<Coordinate>) -> Self {
        match result {
            Some(c) if c.is_valid() => ViewerLocation::Known(c),
            _ => ViewerLocation::Unavailable,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            ViewerLocation::Known(c) => Some(*c),
            ViewerLocation::Unavailable => None,
        }
    }
}

/// Point-in-time marker collection delivered by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSnapshot {
    pub fetch: FetchId,
    pub markers: Vec<Marker>,
}

/// Orders fetches and enforces last-fetch-wins.
///
/// Rules:
/// - `begin_fetch` issues ids in strictly increasing order.
/// - `commit` only accepts the most recently issued fetch; completions for
///   anything older are reported as rejected and their markers dropped, so
///   the map never flickers back to stale data.
#[derive(Debug, Default)]
pub struct SnapshotTracker {
    next: u64,
    latest: Option<MarkerSnapshot>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchId {
        let id = FetchId(self.next);
        self.next += 1;
        id
    }

    /// Returns `true` if the snapshot was accepted.
    pub fn commit(&mut self, fetch: FetchId, markers: Vec<Marker>) -> bool {
        if self.next == 0 || fetch.0 != self.next - 1 {
            return false;
        }
        self.latest = Some(MarkerSnapshot { fetch, markers });
        true
    }

    pub fn latest(&self) -> Option<&MarkerSnapshot> {
        self.latest.as_ref()
    }

    pub fn latest_markers(&self) -> &[Marker] {
        self.latest.as_ref().map(|s| s.markers.as_slice()).unwrap_or(&[])
    }

    /// Mutable view for in-place decoration (presence overlay).
    pub fn latest_markers_mut(&mut self) -> &mut [Marker] {
        self.latest
            .as_mut()
            .map(|s| s.markers.as_mut_slice())
            .unwrap_or(&mut [])
    }
}
