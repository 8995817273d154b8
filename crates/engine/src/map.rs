use std::collections::HashSet;

use clustering::{Cluster, ClusterConfig, SpiderLeg, cluster_markers, spiderfy};
use feed::{
    FetchId, Marker, MarkerId, PresenceOverlay, SnapshotTracker, ViewerLocation, decorate_presence,
};
use geo::Coordinate;
use proximity::{AnnotatedMarker, FilterCriteria, ProximityError, SelectionSet, rank};

use crate::events::{EventLog, MapEvent};
use crate::popup::{FocusOutcome, PopupMachine, PopupState, Recenter};

/// The community proximity map, start to finish:
/// snapshot → proximity filter → selection/search narrowing → clustering,
/// with the popup machine governing at most one open detail card.
///
/// Everything here is a synchronous computation over the latest committed
/// snapshot. Fetching and geolocation happen outside; their results arrive
/// through `commit_fetch` and `set_viewer_location`.
#[derive(Debug)]
pub struct CommunityMap {
    tracker: SnapshotTracker,
    seen: HashSet<MarkerId>,
    selection: SelectionSet,
    criteria: FilterCriteria,
    viewer: ViewerLocation,
    popup: PopupMachine,
    cluster_config: ClusterConfig,
    recenter: Option<Recenter>,
    events: EventLog,
}

impl Default for CommunityMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityMap {
    pub fn new() -> Self {
        Self::with_config(ClusterConfig::default())
    }

    pub fn with_config(cluster_config: ClusterConfig) -> Self {
        Self {
            tracker: SnapshotTracker::new(),
            seen: HashSet::new(),
            selection: SelectionSet::new(),
            criteria: FilterCriteria::default(),
            viewer: ViewerLocation::Unavailable,
            popup: PopupMachine::new(),
            cluster_config,
            recenter: None,
            events: EventLog::new(),
        }
    }

    // --- snapshot lifecycle ---

    pub fn begin_fetch(&mut self) -> FetchId {
        self.tracker.begin_fetch()
    }

    /// Commit a completed fetch. Last fetch wins: a completion for anything
    /// but the most recently begun fetch is discarded (with a logged event),
    /// never rendered.
    ///
    /// Markers never seen before default to selected, so a first load fills
    /// the map; ids seen before keep whatever the user toggled.
    pub fn commit_fetch(&mut self, fetch: FetchId, markers: Vec<Marker>) -> bool {
        if !self.tracker.commit(fetch, markers) {
            self.events.emit(
                Some(fetch),
                "stale_fetch_discarded",
                "a newer fetch was begun; this snapshot is dropped",
            );
            return false;
        }

        let new_ids: Vec<MarkerId> = self
            .tracker
            .latest_markers()
            .iter()
            .map(|m| m.id().to_string())
            .filter(|id| !self.seen.contains(id))
            .collect();
        for id in new_ids {
            self.seen.insert(id.clone());
            self.selection.insert(id);
        }

        self.reconcile_popup();
        true
    }

    /// Merge liveness into the current snapshot's member markers.
    pub fn apply_presence(&mut self, overlay: &dyn PresenceOverlay) {
        decorate_presence(self.tracker.latest_markers_mut(), overlay);
    }

    pub fn set_viewer_location(&mut self, viewer: ViewerLocation) {
        self.viewer = viewer;
        if matches!(viewer, ViewerLocation::Unavailable) {
            let fetch = self.latest_fetch();
            self.events.emit(
                fetch,
                "viewer_location_unavailable",
                "no viewer coordinate; proximity filtering shows nothing",
            );
        }
        self.reconcile_popup();
    }

    pub fn viewer_location(&self) -> ViewerLocation {
        self.viewer
    }

    // --- mutation entry points for the rendering layer ---

    pub fn set_filter_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.reconcile_popup();
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.criteria.search_text = text.into();
        self.reconcile_popup();
    }

    /// Returns `true` if the marker is now selected.
    pub fn toggle_selection(&mut self, id: impl Into<MarkerId>) -> bool {
        let selected = self.selection.toggle(id);
        self.reconcile_popup();
        selected
    }

    // --- render queries ---

    /// The annotated, filtered, selection-narrowed marker list, nearest
    /// first. `Err` when the viewer has no location; the caller owns the
    /// user messaging for that state.
    pub fn render_set(&self) -> Result<Vec<AnnotatedMarker>, ProximityError> {
        let ranked = rank(self.tracker.latest_markers(), self.viewer, &self.criteria)?;
        Ok(ranked
            .into_iter()
            .filter(|am| self.selection.is_visible(&am.marker, &self.criteria.search_text))
            .collect())
    }

    /// Clusters of the render set for drawing at `zoom`. Degrades to empty
    /// when no viewer location is available.
    pub fn visible_clusters(&self, zoom: u8) -> Vec<Cluster> {
        match self.render_set() {
            Ok(set) => {
                let markers: Vec<Marker> = set.into_iter().map(|am| am.marker).collect();
                cluster_markers(&markers, zoom, &self.cluster_config)
            }
            Err(ProximityError::NoViewerLocation) => Vec::new(),
        }
    }

    /// Radial fan placements for pixel-coincident markers at `zoom`.
    pub fn spider_legs(&self, zoom: u8) -> Vec<SpiderLeg> {
        let clusters = self.visible_clusters(zoom);
        spiderfy(&clusters, zoom, &self.cluster_config)
    }

    // --- popup ---

    pub fn popup_state(&self) -> PopupState {
        self.popup.state()
    }

    /// A marker glyph was clicked. Ignored if the marker is not currently
    /// rendered (clicks can only come from rendered glyphs anyway).
    pub fn marker_clicked(&mut self, id: &str) {
        let Some(target) = self.rendered_coordinate(id) else {
            return;
        };
        self.popup.marker_clicked(id);
        self.recenter = Some(self.recenter_for(target));
    }

    /// Close button, click outside, or Escape.
    pub fn close_popup(&mut self) {
        self.popup.close_requested();
        self.recenter = None;
    }

    /// Externally requested focus ("show popup for marker X").
    ///
    /// Processed once per distinct request; a repeat with no user interaction
    /// in between is a no-op. A request for a marker missing from the render
    /// set closes the popup and logs a warning.
    pub fn focus_marker(&mut self, id: &str) {
        let target = self.rendered_coordinate(id);
        match self.popup.external_focus(id, target.is_some()) {
            FocusOutcome::Opened => {
                if let Some(target) = target {
                    self.recenter = Some(self.recenter_for(target));
                }
            }
            FocusOutcome::AlreadyConsumed => {}
            FocusOutcome::TargetMissing => {
                let fetch = self.latest_fetch();
                self.events.emit(
                    fetch,
                    "focus_target_missing",
                    format!("focus requested for {id}, which is not in the render set"),
                );
            }
        }
    }

    /// One-shot camera suggestion produced by the latest popup open.
    pub fn take_recenter(&mut self) -> Option<Recenter> {
        self.recenter.take()
    }

    // --- observability ---

    pub fn events(&self) -> &[MapEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain()
    }

    pub fn latest_fetch(&self) -> Option<FetchId> {
        self.tracker.latest().map(|s| s.fetch)
    }

    pub fn markers(&self) -> &[Marker] {
        self.tracker.latest_markers()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    // --- internals ---

    fn recenter_for(&self, target: Coordinate) -> Recenter {
        Recenter {
            target,
            zoom_hint: self.cluster_config.decluster_zoom,
        }
    }

    fn rendered_coordinate(&self, id: &str) -> Option<Coordinate> {
        let set = self.render_set().ok()?;
        set.iter()
            .find(|am| am.marker.id() == id)
            .map(|am| am.marker.coordinate())
    }

    fn reconcile_popup(&mut self) {
        let present: HashSet<MarkerId> = match self.render_set() {
            Ok(set) => set.iter().map(|am| am.marker.id().to_string()).collect(),
            Err(ProximityError::NoViewerLocation) => HashSet::new(),
        };
        self.popup.reconcile(|id| present.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::CommunityMap;
    use crate::popup::PopupState;
    use feed::{Marker, MemberMarker, StaticPresence, ViewerLocation};
    use geo::Coordinate;
    use proximity::FilterCriteria;

    fn member(id: &str, lat: f64, lon: f64) -> Marker {
        Marker::Member(MemberMarker::new(id, id, Coordinate::new(lat, lon)))
    }

    fn loaded_map(markers: Vec<Marker>) -> CommunityMap {
        let mut map = CommunityMap::new();
        map.set_viewer_location(ViewerLocation::Known(Coordinate::new(22.7196, 75.8577)));
        let fetch = map.begin_fetch();
        assert!(map.commit_fetch(fetch, markers));
        map
    }

    fn render_ids(map: &CommunityMap) -> Vec<String> {
        map.render_set()
            .unwrap()
            .iter()
            .map(|am| am.marker.id().to_string())
            .collect()
    }

    #[test]
    fn first_load_auto_selects_everything() {
        let map = loaded_map(vec![
            member("m1", 22.7196, 75.8577),
            member("m2", 22.7300, 75.8600),
        ]);
        assert_eq!(render_ids(&map), vec!["m1", "m2"]);
    }

    #[test]
    fn deselection_survives_a_refetch() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        assert!(!map.toggle_selection("m1"));
        assert!(render_ids(&map).is_empty());

        let fetch = map.begin_fetch();
        assert!(map.commit_fetch(
            fetch,
            vec![member("m1", 22.7196, 75.8577), member("m2", 22.7300, 75.8600)]
        ));

        // m2 is new and auto-selected; m1 stays deselected.
        assert_eq!(render_ids(&map), vec!["m2"]);
    }

    #[test]
    fn stale_fetch_is_discarded_and_logged() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        let old = map.begin_fetch();
        let new = map.begin_fetch();
        assert!(map.commit_fetch(new, vec![member("fresh", 22.7196, 75.8577)]));
        assert!(!map.commit_fetch(old, vec![member("stale", 22.7196, 75.8577)]));

        assert_eq!(render_ids(&map), vec!["fresh"]);
        assert!(map.events().iter().any(|e| e.kind == "stale_fetch_discarded"));
    }

    #[test]
    fn no_viewer_location_shows_nothing_until_one_arrives() {
        let mut map = CommunityMap::new();
        let fetch = map.begin_fetch();
        assert!(map.commit_fetch(fetch, vec![member("m1", 22.7196, 75.8577)]));

        assert!(map.render_set().is_err());
        assert!(map.visible_clusters(10).is_empty());

        map.set_viewer_location(ViewerLocation::Known(Coordinate::new(22.7196, 75.8577)));
        assert_eq!(render_ids(&map), vec!["m1"]);
    }

    #[test]
    fn filter_change_closes_a_now_hidden_popup() {
        let mut map = loaded_map(vec![
            member("near", 22.7196, 75.8577),
            member("far", 40.0, 75.8577),
        ]);
        map.marker_clicked("far");
        assert_eq!(map.popup_state(), PopupState::Open("far".to_string()));

        map.set_filter_criteria(FilterCriteria {
            max_distance_km: 10.0,
            ..FilterCriteria::default()
        });
        assert_eq!(map.popup_state(), PopupState::Closed);
        assert_eq!(render_ids(&map), vec!["near"]);
    }

    #[test]
    fn search_narrows_the_render_set() {
        let mut map = loaded_map(vec![
            member("asha", 22.7196, 75.8577),
            member("ben", 22.7197, 75.8578),
        ]);
        map.set_search_text("ASH");
        assert_eq!(render_ids(&map), vec!["asha"]);
        assert_eq!(map.visible_clusters(10).len(), 1);
    }

    #[test]
    fn click_opens_popup_and_suggests_a_recenter() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        map.marker_clicked("m1");

        assert_eq!(map.popup_state(), PopupState::Open("m1".to_string()));
        let recenter = map.take_recenter().unwrap();
        assert_eq!(recenter.target, Coordinate::new(22.7196, 75.8577));
        assert!(map.take_recenter().is_none());
    }

    #[test]
    fn click_on_unrendered_marker_is_ignored() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        map.marker_clicked("ghost");
        assert_eq!(map.popup_state(), PopupState::Closed);
    }

    #[test]
    fn repeated_external_focus_does_not_flicker() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        map.focus_marker("m1");
        assert_eq!(map.popup_state(), PopupState::Open("m1".to_string()));
        assert!(map.take_recenter().is_some());

        // The render pass repeats the same request; nothing changes.
        map.focus_marker("m1");
        assert_eq!(map.popup_state(), PopupState::Open("m1".to_string()));
        assert!(map.take_recenter().is_none());
    }

    #[test]
    fn focus_on_missing_marker_closes_and_warns() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        map.marker_clicked("m1");
        map.focus_marker("ghost");

        assert_eq!(map.popup_state(), PopupState::Closed);
        assert!(map.events().iter().any(|e| e.kind == "focus_target_missing"));
    }

    #[test]
    fn presence_decorates_the_current_snapshot() {
        let mut map = loaded_map(vec![member("m1", 22.7196, 75.8577)]);
        map.apply_presence(&StaticPresence::with_online(["m1"]));

        match &map.markers()[0] {
            Marker::Member(m) => assert!(m.is_online),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn cluster_pipeline_conserves_the_render_set() {
        let mut map = loaded_map(vec![
            member("a", 22.7196, 75.8577),
            member("b", 22.7197, 75.8578),
            member("c", 22.9000, 76.0000),
        ]);
        map.set_search_text("");

        let render_len = map.render_set().unwrap().len();
        for zoom in [3u8, 10, 17, 19] {
            let clusters = map.visible_clusters(zoom);
            let total: usize = clusters.iter().map(|c| c.members.len()).sum();
            assert_eq!(total, render_len, "zoom {zoom}");
        }
    }
}
