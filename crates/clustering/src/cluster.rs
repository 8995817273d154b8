use feed::Marker;
use geo::{Coordinate, project_px, px_distance};

/// Screen-space clustering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Markers within this pixel distance of a cluster seed join it.
    pub max_radius_px: f64,
    /// At or above this zoom every marker is its own singleton cluster.
    pub decluster_zoom: u8,
    /// Deepest zoom the map offers; spiderfy applies here.
    pub max_zoom: u8,
    /// Pixel tolerance for "visually identical position".
    pub coincident_px: f64,
    /// Base radius of the spiderfy fan.
    pub spider_radius_px: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_radius_px: 80.0,
            decluster_zoom: 17,
            max_zoom: 19,
            coincident_px: 1.0,
            spider_radius_px: 24.0,
        }
    }
}

/// A screen-space grouping of nearby markers shown as one interactive glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: Coordinate,
    /// Max pixel distance from the centroid to a member at `zoom`; 0 for
    /// singletons.
    pub radius_px: f64,
    pub members: Vec<Marker>,
    pub zoom: u8,
}

impl Cluster {
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

struct ClusterBuilder {
    /// `None` for a marker that failed projection; such a builder stays a
    /// singleton because nothing can measure a distance to it.
    seed_px: Option<[f64; 2]>,
    members: Vec<Marker>,
}

/// Group markers into clusters for the given zoom.
///
/// Behavior:
/// - Below `config.decluster_zoom`, a greedy single pass in input order:
///   each marker joins the nearest existing cluster whose seed lies within
///   `config.max_radius_px` of its projected position, else it seeds a new
///   cluster anchored at itself.
/// - At or above `config.decluster_zoom`, output is 1:1 singletons.
///
/// Ordering contract:
/// - Clusters are emitted in seed-creation order (input order).
/// - When two candidate clusters are equidistant, the cluster created first
///   wins. Deterministic for a given input order, never location-dependent.
///
/// Conservation: member counts summed over the output always equal the input
/// length; a marker that fails projection becomes its own singleton rather
/// than being dropped.
pub fn cluster_markers(markers: &[Marker], zoom: u8, config: &ClusterConfig) -> Vec<Cluster> {
    if zoom >= config.decluster_zoom {
        return markers.iter().map(|m| singleton(m.clone(), zoom)).collect();
    }

    let mut builders: Vec<ClusterBuilder> = Vec::new();

    for marker in markers {
        let Some(px) = project_px(marker.coordinate(), zoom) else {
            builders.push(ClusterBuilder {
                seed_px: None,
                members: vec![marker.clone()],
            });
            continue;
        };

        let mut best: Option<(usize, f64)> = None;
        for (idx, builder) in builders.iter().enumerate() {
            let Some(seed) = builder.seed_px else {
                continue;
            };
            let d = px_distance(px, seed);
            if d > config.max_radius_px {
                continue;
            }
            // Strict `<` keeps the first-created cluster on ties.
            if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((idx, d));
            }
        }

        match best {
            Some((idx, _)) => builders[idx].members.push(marker.clone()),
            None => builders.push(ClusterBuilder {
                seed_px: Some(px),
                members: vec![marker.clone()],
            }),
        }
    }

    builders.into_iter().map(|b| finalize(b, zoom)).collect()
}

fn singleton(marker: Marker, zoom: u8) -> Cluster {
    Cluster {
        centroid: marker.coordinate(),
        radius_px: 0.0,
        members: vec![marker],
        zoom,
    }
}

fn finalize(builder: ClusterBuilder, zoom: u8) -> Cluster {
    let n = builder.members.len() as f64;
    let mut lat = 0.0;
    let mut lon = 0.0;
    for m in &builder.members {
        let c = m.coordinate();
        lat += c.lat_deg;
        lon += c.lon_deg;
    }
    let centroid = Coordinate::new(lat / n, lon / n);

    let mut radius_px = 0.0_f64;
    if let Some(centroid_px) = project_px(centroid, zoom) {
        for m in &builder.members {
            if let Some(px) = project_px(m.coordinate(), zoom) {
                radius_px = radius_px.max(px_distance(centroid_px, px));
            }
        }
    }

    Cluster {
        centroid,
        radius_px,
        members: builder.members,
        zoom,
    }
}
