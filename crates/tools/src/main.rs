use std::env;
use std::fs;
use std::path::PathBuf;

use engine::CommunityMap;
use feed::{Marker, ViewerLocation, decode_markers};
use geo::Coordinate;
use proximity::FilterCriteria;
use serde::Serialize;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "rank" => cmd_rank(args),
        "cluster" => cmd_cluster(args),
        _ => Err(usage()),
    }
}

#[derive(Debug)]
struct Options {
    path: PathBuf,
    viewer: Option<Coordinate>,
    zoom: u8,
    criteria: FilterCriteria,
}

fn parse_options(args: Vec<String>) -> Result<Options, String> {
    if args.is_empty() {
        return Err(usage());
    }

    let mut opts = Options {
        path: PathBuf::from(&args[0]),
        viewer: None,
        zoom: 10,
        criteria: FilterCriteria::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--viewer" => {
                i += 1;
                let raw = args.get(i).ok_or("--viewer requires lat,lon")?;
                opts.viewer = Some(parse_lat_lon(raw)?);
            }
            "--zoom" => {
                i += 1;
                let raw = args.get(i).ok_or("--zoom requires a value")?;
                opts.zoom = raw.parse().map_err(|_| format!("bad zoom: {raw}"))?;
            }
            "--max-km" => {
                i += 1;
                let raw = args.get(i).ok_or("--max-km requires a value")?;
                opts.criteria.max_distance_km =
                    raw.parse().map_err(|_| format!("bad distance: {raw}"))?;
            }
            "--min-rating" => {
                i += 1;
                let raw = args.get(i).ok_or("--min-rating requires a value")?;
                opts.criteria.min_rating =
                    raw.parse().map_err(|_| format!("bad rating: {raw}"))?;
            }
            "--search" => {
                i += 1;
                let raw = args.get(i).ok_or("--search requires a value")?;
                opts.criteria.search_text = raw.clone();
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    Ok(opts)
}

fn parse_lat_lon(raw: &str) -> Result<Coordinate, String> {
    let mut parts = raw.split(',');
    let lat = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| format!("bad viewer coordinate: {raw}"))?;
    let lon = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| format!("bad viewer coordinate: {raw}"))?;
    if parts.next().is_some() {
        return Err(format!("bad viewer coordinate: {raw}"));
    }
    Ok(Coordinate::new(lat, lon))
}

fn load_map(opts: &Options) -> Result<CommunityMap, String> {
    let json = fs::read_to_string(&opts.path)
        .map_err(|e| format!("read {}: {e}", opts.path.display()))?;
    let feed = decode_markers(&json).map_err(|e| e.to_string())?;
    if feed.skipped > 0 {
        eprintln!("warning: skipped {} malformed records", feed.skipped);
    }

    let mut map = CommunityMap::new();
    map.set_viewer_location(ViewerLocation::from_geolocation(opts.viewer));
    map.set_filter_criteria(opts.criteria.clone());
    let fetch = map.begin_fetch();
    map.commit_fetch(fetch, feed.markers);
    Ok(map)
}

#[derive(Serialize)]
struct RankRow {
    id: String,
    kind: &'static str,
    label: String,
    lat: f64,
    lon: f64,
    distance_km: f64,
}

fn cmd_rank(args: Vec<String>) -> Result<(), String> {
    let opts = parse_options(args)?;
    let map = load_map(&opts)?;

    let set = map.render_set().map_err(|e| e.to_string())?;
    let rows: Vec<RankRow> = set
        .iter()
        .map(|am| RankRow {
            id: am.marker.id().to_string(),
            kind: marker_kind(&am.marker),
            label: am.marker.label().to_string(),
            lat: am.marker.coordinate().lat_deg,
            lon: am.marker.coordinate().lon_deg,
            distance_km: am.distance_from_viewer_km,
        })
        .collect();

    print_json(&rows)
}

#[derive(Serialize)]
struct ClusterRow {
    lat: f64,
    lon: f64,
    radius_px: f64,
    count: usize,
    members: Vec<String>,
}

fn cmd_cluster(args: Vec<String>) -> Result<(), String> {
    let opts = parse_options(args)?;
    let map = load_map(&opts)?;

    if map.render_set().is_err() {
        return Err("viewer location unavailable; pass --viewer lat,lon".to_string());
    }

    let rows: Vec<ClusterRow> = map
        .visible_clusters(opts.zoom)
        .iter()
        .map(|c| ClusterRow {
            lat: c.centroid.lat_deg,
            lon: c.centroid.lon_deg,
            radius_px: c.radius_px,
            count: c.members.len(),
            members: c.members.iter().map(|m| m.id().to_string()).collect(),
        })
        .collect();

    print_json(&rows)
}

fn marker_kind(marker: &Marker) -> &'static str {
    match marker {
        Marker::Member(_) => "member",
        Marker::Event(_) => "event",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn usage() -> String {
    [
        "communimap: inspect a community map snapshot offline",
        "",
        "usage:",
        "  communimap rank <snapshot.json> --viewer <lat,lon> \\",
        "      [--max-km D] [--min-rating R] [--search TEXT]",
        "  communimap cluster <snapshot.json> --viewer <lat,lon> \\",
        "      [--zoom Z] [--max-km D] [--min-rating R] [--search TEXT]",
    ]
    .join("\n")
}
