//! Damage-site clustering.
//!
//! UNOSAT publishes one point per damaged building. The map cannot draw
//! hundreds of thousands of circles, so points are grouped in two steps:
//!
//! 1. Grid-seeded clustering in Web Mercator metres: every unassigned
//!    point seeds a cluster and takes the unassigned points within `eps`
//!    found in the 3x3 neighbouring grid cells.
//! 2. Clusters whose circles (radius `sqrt(count) * 10 m`) overlap are
//!    merged until none overlap or the iteration limit is hit.

use anyhow::Context;
use cdv_core::geo::{FeatureCollection, Geometry};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{info, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;

/// Web Mercator sphere radius.
const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Metres of radius contributed per building before the square root.
const BUILDING_SIZE_M: f64 = 10.0;
pub const DEFAULT_EPS_M: f64 = 500.0;
pub const MAX_MERGE_ITERATIONS: usize = 100;

pub fn lonlat_to_merc(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

pub fn merc_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// A group of building points in Mercator metres.
#[derive(Debug, Clone)]
pub struct Cluster {
    points: Vec<(f64, f64)>,
    cx: f64,
    cy: f64,
}

impl Cluster {
    fn new(points: Vec<(f64, f64)>) -> Self {
        let mut cluster = Self {
            points,
            cx: 0.0,
            cy: 0.0,
        };
        cluster.recentre();
        cluster
    }

    fn recentre(&mut self) {
        let n = self.points.len().max(1) as f64;
        self.cx = self.points.iter().map(|p| p.0).sum::<f64>() / n;
        self.cy = self.points.iter().map(|p| p.1).sum::<f64>() / n;
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn radius(&self) -> f64 {
        (self.count() as f64).sqrt() * BUILDING_SIZE_M
    }

    /// Centroid as `(lon, lat)`.
    pub fn centroid(&self) -> (f64, f64) {
        merc_to_lonlat(self.cx, self.cy)
    }

    pub fn overlaps(&self, other: &Cluster) -> bool {
        let dist = (self.cx - other.cx).hypot(self.cy - other.cy);
        dist < self.radius() + other.radius()
    }

    fn absorb(&mut self, other: Cluster) {
        self.points.extend(other.points);
        self.recentre();
    }
}

fn cell_of(x: f64, y: f64, cell: f64) -> (i64, i64) {
    ((x / cell).floor() as i64, (y / cell).floor() as i64)
}

/// Initial grid-seeded clustering of `(lon, lat)` points.
pub fn cluster_points(points: &[(f64, f64)], eps_m: f64) -> Vec<Cluster> {
    let merc: Vec<(f64, f64)> = points.iter().map(|&(lon, lat)| lonlat_to_merc(lon, lat)).collect();

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, &(x, y)) in merc.iter().enumerate() {
        grid.entry(cell_of(x, y, eps_m)).or_default().push(idx);
    }

    let eps2 = eps_m * eps_m;
    let mut assigned = vec![false; merc.len()];
    let mut clusters = Vec::new();

    for i in 0..merc.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let (sx, sy) = merc[i];
        let (cx, cy) = cell_of(sx, sy, eps_m);
        let mut members = vec![merc[i]];

        for nx in cx - 1..=cx + 1 {
            for ny in cy - 1..=cy + 1 {
                let Some(bucket) = grid.get(&(nx, ny)) else {
                    continue;
                };
                for &j in bucket {
                    if assigned[j] {
                        continue;
                    }
                    let (dx, dy) = (merc[j].0 - sx, merc[j].1 - sy);
                    if dx * dx + dy * dy <= eps2 {
                        assigned[j] = true;
                        members.push(merc[j]);
                    }
                }
            }
        }
        clusters.push(Cluster::new(members));
    }
    clusters
}

/// Merge overlapping clusters pass by pass. Returns the clusters and the
/// number of passes run.
pub fn merge_overlapping(clusters: Vec<Cluster>, max_iterations: usize) -> (Vec<Cluster>, usize) {
    let mut clusters = clusters;
    let mut iteration = 0;

    while iteration < max_iterations {
        iteration += 1;
        let before = clusters.len();
        let mut merged_any = false;
        let mut slots: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
        let mut next = Vec::with_capacity(slots.len());

        for i in 0..slots.len() {
            let Some(mut current) = slots[i].take() else {
                continue;
            };
            for j in i + 1..slots.len() {
                let overlaps = slots[j].as_ref().is_some_and(|other| current.overlaps(other));
                if overlaps {
                    if let Some(other) = slots[j].take() {
                        current.absorb(other);
                        merged_any = true;
                    }
                }
            }
            next.push(current);
        }

        info!("  Iteration {}: {} -> {} clusters", iteration, before, next.len());
        clusters = next;
        if !merged_any {
            return (clusters, iteration);
        }
    }

    warn!("max merge iterations ({}) reached", max_iterations);
    (clusters, iteration)
}

/// Point coordinates of every Point feature.
pub fn collect_points(collection: &FeatureCollection) -> Vec<(f64, f64)> {
    collection
        .features
        .iter()
        .filter_map(|f| match f.geometry.as_ref()? {
            Geometry::Point { coordinates } => Some((*coordinates.first()?, *coordinates.get(1)?)),
            _ => None,
        })
        .collect()
}

/// FeatureCollection of cluster centroids with `count` and `radius` (metres, 2 decimals).
pub fn clusters_to_geojson(clusters: &[Cluster]) -> Value {
    let features: Vec<Value> = clusters
        .iter()
        .map(|c| {
            let (lon, lat) = c.centroid();
            json!({
                "type": "Feature",
                "properties": {
                    "count": c.count(),
                    "radius": (c.radius() * 100.0).round() / 100.0,
                },
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Serialize compactly, optionally through gzip.
pub fn write_geojson<W: Write>(value: &Value, writer: W, gzip: bool) -> anyhow::Result<()> {
    if gzip {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?;
    } else {
        let mut writer = writer;
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    Ok(())
}

pub fn run_cluster_damage(input: &str, output: &str, eps_m: f64, gzip: bool) -> anyhow::Result<()> {
    if !(eps_m.is_finite() && eps_m > 0.0) {
        anyhow::bail!("eps must be a positive distance, got {}", eps_m);
    }

    info!("Loading {}...", input);
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?;
    let collection = FeatureCollection::parse(&text)?;
    let points = collect_points(&collection);
    if points.is_empty() {
        anyhow::bail!("no Point features found in {}", input);
    }
    info!("Found {} points", points.len());

    let clusters = cluster_points(&points, eps_m);
    info!("Initial clustering with eps={}m: {} clusters", eps_m, clusters.len());

    let (clusters, passes) = merge_overlapping(clusters, MAX_MERGE_ITERATIONS);
    info!("Final: {} non-overlapping clusters after {} passes", clusters.len(), passes);

    let file = std::fs::File::create(output).with_context(|| format!("creating {}", output))?;
    write_geojson(&clusters_to_geojson(&clusters), std::io::BufWriter::new(file), gzip)?;
    info!("Saved {} cluster centroids -> {}", clusters.len(), output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    /// Offset a point by metres at Gaza's latitude.
    fn shifted(lon: f64, lat: f64, dx_m: f64, dy_m: f64) -> (f64, f64) {
        let (x, y) = lonlat_to_merc(lon, lat);
        merc_to_lonlat(x + dx_m, y + dy_m)
    }

    #[test]
    fn mercator_inverse_recovers_coordinates() {
        let (x, y) = lonlat_to_merc(34.45, 31.5);
        let (lon, lat) = merc_to_lonlat(x, y);
        assert!((lon - 34.45).abs() < 1e-9);
        assert!((lat - 31.5).abs() < 1e-9);
    }

    #[test]
    fn nearby_points_share_a_cluster() {
        let a = (34.45, 31.5);
        let pts = vec![a, shifted(a.0, a.1, 100.0, 0.0), shifted(a.0, a.1, 0.0, 400.0)];
        let clusters = cluster_points(&pts, 500.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 3);
    }

    #[test]
    fn distant_points_stay_apart() {
        let a = (34.45, 31.5);
        let pts = vec![a, shifted(a.0, a.1, 2_000.0, 0.0)];
        let clusters = cluster_points(&pts, 500.0);
        assert_eq!(clusters.len(), 2);
        let (merged, passes) = merge_overlapping(clusters, MAX_MERGE_ITERATIONS);
        // 10 m radii never reach across 2 km.
        assert_eq!(merged.len(), 2);
        assert_eq!(passes, 1);
    }

    #[test]
    fn overlapping_circles_merge() {
        let a = (34.45, 31.5);
        // 400 points in one spot give a 200 m radius; a lone point 150 m
        // away lies inside it but outside the 100 m clustering distance.
        let mut pts = vec![a; 400];
        pts.push(shifted(a.0, a.1, 150.0, 0.0));
        let clusters = cluster_points(&pts, 100.0);
        assert_eq!(clusters.len(), 2);

        let (merged, _) = merge_overlapping(clusters, MAX_MERGE_ITERATIONS);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].count(), 401);
        assert!((merged[0].radius() - 401f64.sqrt() * 10.0).abs() < 1e-9);
    }

    #[test]
    fn iteration_limit_is_respected() {
        let a = (34.45, 31.5);
        let mut pts = vec![a; 400];
        pts.push(shifted(a.0, a.1, 150.0, 0.0));
        let (merged, passes) = merge_overlapping(cluster_points(&pts, 100.0), 1);
        assert_eq!(passes, 1);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn only_point_features_are_collected() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[34.4,31.5]}},
            {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[34.4,31.5],[34.5,31.6]]}},
            {"type":"Feature","properties":{},"geometry":null}
        ]}"#;
        let fc = FeatureCollection::parse(json).unwrap();
        assert_eq!(collect_points(&fc), vec![(34.4, 31.5)]);
    }

    #[test]
    fn gzip_output_decodes_to_the_collection() {
        let clusters = cluster_points(&[(34.45, 31.5); 4], 500.0);
        let value = clusters_to_geojson(&clusters);

        let mut buf = Vec::new();
        write_geojson(&value, &mut buf, true).unwrap();
        let mut text = String::new();
        GzDecoder::new(buf.as_slice()).read_to_string(&mut text).unwrap();

        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded["features"][0]["properties"]["count"], 4);
        assert_eq!(decoded["features"][0]["properties"]["radius"], 20.0);
    }
}
