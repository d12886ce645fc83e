//! Minimal GeoJSON model.
//!
//! Only the geometry types present in the embedded boundary, territory and
//! damage-cluster files are decoded; anything else deserializes to
//! [`Geometry::Other`] and is skipped when drawing.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `[lon, lat]` with an optional trailing elevation.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Other,
}

impl Geometry {
    /// Visit every coordinate pair of the geometry.
    pub fn for_each_position(&self, mut f: impl FnMut(f64, f64)) {
        let mut visit = |p: &Position| {
            if let (Some(&lon), Some(&lat)) = (p.first(), p.get(1)) {
                f(lon, lat);
            }
        };
        match self {
            Geometry::Point { coordinates } => visit(coordinates),
            Geometry::LineString { coordinates } => coordinates.iter().for_each(&mut visit),
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().for_each(&mut visit)
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(&mut visit)
            }
            Geometry::Other => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn parse(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidGeometry(e.to_string()))
    }

    /// Bounding box of every position in the collection, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for geometry in self.features.iter().filter_map(|f| f.geometry.as_ref()) {
            geometry.for_each_position(|lon, lat| {
                bounds = Some(match bounds {
                    None => Bounds { min_lon: lon, min_lat: lat, max_lon: lon, max_lat: lat },
                    Some(b) => b.extend(lon, lat),
                });
            });
        }
        bounds
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    fn extend(self, lon: f64, lat: f64) -> Self {
        Self {
            min_lon: self.min_lon.min(lon),
            min_lat: self.min_lat.min(lat),
            max_lon: self.max_lon.max(lon),
            max_lat: self.max_lat.max(lat),
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// A cluster of damaged buildings produced by the `cluster-damage` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageCluster {
    pub lon: f64,
    pub lat: f64,
    pub count: u32,
    pub area_m2: Option<f64>,
}

impl DamageCluster {
    /// Display radius in metres; grows with the square root of the building count.
    pub fn radius_m(&self) -> f64 {
        (self.count as f64).sqrt() * 10.0
    }

    /// "0.25 km²" above a hundredth of a square kilometre, "850 m²" below, "?" when unknown.
    pub fn area_label(&self) -> String {
        match self.area_m2 {
            Some(m2) if m2 > 0.0 => {
                let km2 = m2 / 1e6;
                if km2 >= 0.01 {
                    format!("{:.2} km²", km2)
                } else {
                    format!("{:.0} m²", m2)
                }
            }
            _ => "?".to_string(),
        }
    }

    /// Point features carrying a numeric `count` property.
    pub fn from_collection(collection: &FeatureCollection) -> Vec<DamageCluster> {
        collection
            .features
            .iter()
            .filter_map(|f| {
                let Some(Geometry::Point { coordinates }) = f.geometry.as_ref() else {
                    return None;
                };
                let (lon, lat) = (*coordinates.first()?, *coordinates.get(1)?);
                let count = f.property_f64("count")?;
                Some(DamageCluster {
                    lon,
                    lat,
                    count: count.max(0.0) as u32,
                    area_m2: f.property_f64("area_m2"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"count": 9, "radius": 30.0},
             "geometry": {"type": "Point", "coordinates": [34.45, 31.50]}},
            {"type": "Feature", "properties": {"name": "Rafah"},
             "geometry": {"type": "Polygon", "coordinates": [[[34.20, 31.25], [34.30, 31.25], [34.30, 31.35], [34.20, 31.25]]]}},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "GeometryCollection", "geometries": []}}
        ]
    }"#;

    #[test]
    fn parses_mixed_geometries() {
        let fc = FeatureCollection::parse(SAMPLE).unwrap();
        assert_eq!(fc.features.len(), 3);
        assert_eq!(fc.features[2].geometry, Some(Geometry::Other));
        assert_eq!(fc.features[1].property_str("name"), Some("Rafah"));
    }

    #[test]
    fn bounds_cover_all_positions() {
        let fc = FeatureCollection::parse(SAMPLE).unwrap();
        let b = fc.bounds().unwrap();
        assert_eq!(b.min_lon, 34.20);
        assert_eq!(b.max_lon, 34.45);
        assert_eq!(b.min_lat, 31.25);
        assert_eq!(b.max_lat, 31.50);
        assert!(b.contains(34.25, 31.30));
        assert!(!b.contains(35.0, 31.30));
    }

    #[test]
    fn clusters_read_only_counted_points() {
        let fc = FeatureCollection::parse(SAMPLE).unwrap();
        let clusters = DamageCluster::from_collection(&fc);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 9);
        assert!((clusters[0].radius_m() - 30.0).abs() < 1e-9);
        assert_eq!(clusters[0].area_label(), "?");
    }

    #[test]
    fn area_label_switches_units() {
        let mut c = DamageCluster { lon: 0.0, lat: 0.0, count: 1, area_m2: Some(250_000.0) };
        assert_eq!(c.area_label(), "0.25 km²");
        c.area_m2 = Some(850.0);
        assert_eq!(c.area_label(), "850 m²");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(FeatureCollection::parse("{"), Err(CoreError::InvalidGeometry(_))));
    }
}
