use std::collections::HashMap;

use feed::MarkerId;
use geo::project_px;

use crate::cluster::{Cluster, ClusterConfig};

/// One marker's placement in a spiderfy fan.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiderLeg {
    pub marker_id: MarkerId,
    /// Shared anchor in world pixels at the fan's zoom.
    pub anchor_px: [f64; 2],
    /// Radial offset from the anchor; the marker renders at anchor + offset.
    pub offset_px: [f64; 2],
}

/// Arrange pixel-coincident markers into radial fans at maximum zoom.
///
/// At `config.max_zoom` a cluster badge can no longer be zoomed into, so
/// markers that would render at visually identical positions (within
/// `config.coincident_px`) fan out around the shared point instead. Each
/// marker keeps its own click target; nothing hides behind a badge.
///
/// Below `config.max_zoom` this returns no legs: zooming in still separates
/// the markers naturally.
///
/// Coincidence is detected by quantizing positions into `config.coincident_px`
/// sized cells, not by exact pairwise distance. Markers within the tolerance
/// that straddle a cell boundary may not fan, and markers up to a full cell
/// apart may; at sub-pixel tolerances the difference is not visible.
///
/// Ordering contract:
/// - Fans appear in order of their first marker; legs within a fan follow
///   cluster/member order.
pub fn spiderfy(clusters: &[Cluster], zoom: u8, config: &ClusterConfig) -> Vec<SpiderLeg> {
    if zoom < config.max_zoom {
        return Vec::new();
    }

    // Quantize positions so near-identical pixels share a bucket.
    let cell = config.coincident_px.max(f64::EPSILON);
    let mut order: Vec<Vec<(MarkerId, [f64; 2])>> = Vec::new();
    let mut bucket_by_key: HashMap<(i64, i64), usize> = HashMap::new();

    for cluster in clusters {
        for marker in &cluster.members {
            let Some(px) = project_px(marker.coordinate(), zoom) else {
                continue;
            };
            let key = ((px[0] / cell).round() as i64, (px[1] / cell).round() as i64);
            let idx = *bucket_by_key.entry(key).or_insert_with(|| {
                order.push(Vec::new());
                order.len() - 1
            });
            order[idx].push((marker.id().to_string(), px));
        }
    }

    let mut legs = Vec::new();
    for group in order {
        if group.len() < 2 {
            continue;
        }

        let n = group.len();
        let mut anchor = [0.0, 0.0];
        for (_, px) in &group {
            anchor[0] += px[0];
            anchor[1] += px[1];
        }
        anchor[0] /= n as f64;
        anchor[1] /= n as f64;

        // Fan radius grows gently with the leg count so labels stay apart.
        let radius = config.spider_radius_px + 2.0 * n as f64;
        for (i, (id, _)) in group.into_iter().enumerate() {
            let angle = std::f64::consts::TAU * (i as f64) / (n as f64)
                - std::f64::consts::FRAC_PI_2;
            legs.push(SpiderLeg {
                marker_id: id,
                anchor_px: anchor,
                offset_px: [radius * angle.cos(), radius * angle.sin()],
            });
        }
    }

    legs
}
