//! Property marker reconciliation.
//!
//! The marker set is rebuilt from scratch on every relevant change
//! (clear-then-rebuild): remove everything owned, then recreate one marker
//! per point when markers are visible. This trades object churn for the
//! guarantee that no orphaned handle survives an update.

use std::collections::BTreeMap;

use foundation::geo::LngLat;
use foundation::ids::PropertyId;
use surface::{MapSurface, MarkerHandle, MarkerSpec};

use crate::symbology::{score_color, score_label};

/// Per-indicator climate scores of one property, as delivered by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ClimateScores {
    pub overall: Option<i32>,
    pub lst: Option<i32>,
    pub ndvi: Option<i32>,
    pub uhi: Option<i32>,
    pub utfvi: Option<i32>,
}

/// One property as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub position: LngLat,
    pub climate_scores: Option<ClimateScores>,
    /// Legacy single-number risk score, used when no composite exists.
    pub climate_risk_score: Option<i32>,
}

/// Marker-ready projection of one property.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PropertyPoint {
    pub id: PropertyId,
    pub position: LngLat,
    pub display_score: Option<i32>,
}

impl PropertyPoint {
    /// Score preference: composite overall, then legacy risk score, then none.
    pub fn from_record(record: &PropertyRecord) -> Self {
        let display_score = record
            .climate_scores
            .and_then(|scores| scores.overall)
            .or(record.climate_risk_score);
        Self {
            id: record.id,
            position: record.position,
            display_score,
        }
    }
}

/// Exclusive owner of all live property markers.
///
/// Invariant: after any `reconcile` pass the handle map's key set equals
/// the current visible point-id set.
#[derive(Debug, Default)]
pub struct MarkerSet {
    handles: BTreeMap<PropertyId, MarkerHandle>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, id: PropertyId) -> Option<MarkerHandle> {
        self.handles.get(&id).copied()
    }

    /// Ids with a live marker, in ascending order.
    pub fn ids(&self) -> Vec<PropertyId> {
        self.handles.keys().copied().collect()
    }

    /// Remove every owned marker.
    pub fn clear(&mut self, surface: &mut MapSurface) {
        for (_, handle) in std::mem::take(&mut self.handles) {
            surface.remove_marker(handle);
        }
    }

    /// Rebuild the marker set from `points`.
    ///
    /// Must only run after the surface's style-loaded signal has fired;
    /// callers are responsible for queueing earlier invocations.
    pub fn reconcile(&mut self, surface: &mut MapSurface, points: &[PropertyPoint], visible: bool) {
        self.clear(surface);
        if !visible {
            return;
        }
        for point in points {
            let spec = MarkerSpec {
                position: point.position,
                color: score_color(point.display_score),
                label: score_label(point.display_score),
            };
            let Some(handle) = surface.add_marker(spec) else {
                continue;
            };
            // Duplicate ids in the input: last one wins, earlier marker dies.
            if let Some(previous) = self.handles.insert(point.id, handle) {
                surface.remove_marker(previous);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClimateScores, MarkerSet, PropertyPoint, PropertyRecord};
    use crate::symbology::{SCORE_DARK_GREEN, SCORE_RED};
    use foundation::geo::LngLat;
    use foundation::ids::PropertyId;
    use pretty_assertions::assert_eq;
    use surface::{MapInit, MapSurface, RecordingBackend};

    fn point(id: u32, score: Option<i32>) -> PropertyPoint {
        PropertyPoint {
            id: PropertyId(id),
            position: LngLat::new(106.8 + id as f64 * 0.01, -6.2),
            display_score: score,
        }
    }

    fn ready_surface() -> (
        MapSurface,
        std::sync::Arc<parking_lot::Mutex<surface::RecordingState>>,
    ) {
        let backend = RecordingBackend::new();
        let state = backend.state();
        let mut surface = MapSurface::new(Box::new(backend));
        surface.ensure_initialized(
            true,
            MapInit {
                center: LngLat::new(106.82, -6.21),
                zoom: 12.0,
                style: None,
            },
        );
        surface.notify_style_loaded();
        (surface, state)
    }

    #[test]
    fn display_score_prefers_composite_then_legacy() {
        let mut record = PropertyRecord {
            id: PropertyId(9),
            position: LngLat::new(106.8, -6.2),
            climate_scores: Some(ClimateScores {
                overall: Some(81),
                ..ClimateScores::default()
            }),
            climate_risk_score: Some(40),
        };
        assert_eq!(PropertyPoint::from_record(&record).display_score, Some(81));

        record.climate_scores = Some(ClimateScores::default());
        assert_eq!(PropertyPoint::from_record(&record).display_score, Some(40));

        record.climate_risk_score = None;
        assert_eq!(PropertyPoint::from_record(&record).display_score, None);
    }

    #[test]
    fn handle_set_tracks_latest_list_regardless_of_overlap() {
        let (mut surface, state) = ready_surface();
        let mut set = MarkerSet::new();

        let l1 = vec![point(1, Some(70)), point(2, Some(40)), point(3, None)];
        set.reconcile(&mut surface, &l1, true);
        assert_eq!(set.len(), 3);
        assert_eq!(state.lock().markers.len(), 3);

        let l2 = vec![point(2, Some(40)), point(4, Some(91))];
        set.reconcile(&mut surface, &l2, true);
        assert_eq!(set.ids(), vec![PropertyId(2), PropertyId(4)]);
        assert_eq!(state.lock().markers.len(), 2);

        set.reconcile(&mut surface, &l2, false);
        assert!(set.is_empty());
        assert_eq!(state.lock().markers.len(), 0);
    }

    #[test]
    fn visibility_round_trip_recreates_markers_with_same_colors() {
        let (mut surface, state) = ready_surface();
        let mut set = MarkerSet::new();
        let points = vec![point(1, Some(90)), point(2, Some(50))];

        set.reconcile(&mut surface, &points, true);
        let first_handles = set.ids().iter().map(|id| set.handle(*id).unwrap()).collect::<Vec<_>>();
        {
            let s = state.lock();
            let colors: Vec<_> = s.markers.values().map(|m| m.color).collect();
            assert_eq!(colors, vec![SCORE_DARK_GREEN, SCORE_RED]);
        }

        set.reconcile(&mut surface, &points, false);
        assert_eq!(state.lock().markers.len(), 0);

        set.reconcile(&mut surface, &points, true);
        let second_handles = set.ids().iter().map(|id| set.handle(*id).unwrap()).collect::<Vec<_>>();
        assert_ne!(first_handles, second_handles);
        {
            let s = state.lock();
            let colors: Vec<_> = s.markers.values().map(|m| m.color).collect();
            assert_eq!(colors, vec![SCORE_DARK_GREEN, SCORE_RED]);
            let labels: Vec<_> = s.markers.values().map(|m| m.label.clone()).collect();
            assert_eq!(labels, vec!["90", "50"]);
        }
    }

    #[test]
    fn missing_score_renders_question_mark() {
        let (mut surface, state) = ready_surface();
        let mut set = MarkerSet::new();
        set.reconcile(&mut surface, &[point(7, None)], true);
        let s = state.lock();
        let marker = s.markers.values().next().unwrap();
        assert_eq!(marker.label, "?");
    }
}
