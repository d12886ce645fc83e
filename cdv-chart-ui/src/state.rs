//! Application state managed via Dioxus context.
//!
//! `AppState` bundles the reactive signals shared by the page shell and the
//! chart widgets. It is provided once with `use_context_provider` and read
//! with `use_context::<AppState>()`.

use cdv_core::geo::{DamageCluster, FeatureCollection};
use cdv_db::Database;
use dioxus::prelude::*;
use std::rc::Rc;

/// Raw fixture text embedded by the site binary.
#[derive(Debug, Clone, Copy)]
pub struct Sources {
    pub fatalities_per_month: &'static str,
    pub events_per_week: &'static str,
    pub events_sankey: &'static str,
    pub mortality: &'static str,
    pub indicators: &'static str,
    pub incidents: &'static str,
    pub gaza_boundaries: &'static str,
    pub damage_clusters: &'static str,
    pub territories: &'static str,
}

/// Every dataset the widgets read, parsed once at start-up.
#[derive(Clone)]
pub struct Datasets {
    pub db: Database,
    pub boundaries: Rc<FeatureCollection>,
    pub damage: Rc<Vec<DamageCluster>>,
    pub territories: Rc<FeatureCollection>,
}

impl PartialEq for Datasets {
    fn eq(&self, other: &Self) -> bool {
        self.db == other.db
            && Rc::ptr_eq(&self.boundaries, &other.boundaries)
            && Rc::ptr_eq(&self.damage, &other.damage)
            && Rc::ptr_eq(&self.territories, &other.territories)
    }
}

impl Datasets {
    /// Load every CSV into a fresh database and parse the GeoJSON layers.
    pub fn load(sources: &Sources) -> anyhow::Result<Self> {
        let db = Database::new()?;
        db.load_monthly_fatalities(sources.fatalities_per_month)?;
        db.load_weekly_events(sources.events_per_week)?;
        db.load_event_flows(sources.events_sankey)?;
        db.load_mortality(sources.mortality)?;
        db.load_indicators(sources.indicators)?;
        db.load_incidents(sources.incidents)?;

        let boundaries = parse_layer("municipal boundaries", sources.gaza_boundaries)?;
        let damage = DamageCluster::from_collection(&parse_layer("damage clusters", sources.damage_clusters)?);
        let territories = parse_layer("territories", sources.territories)?;
        log::info!(
            "[CDV] datasets: {} boundary features, {} damage clusters, {} territory features",
            boundaries.features.len(),
            damage.len(),
            territories.features.len()
        );

        Ok(Self {
            db,
            boundaries: Rc::new(boundaries),
            damage: Rc::new(damage),
            territories: Rc::new(territories),
        })
    }
}

/// An empty placeholder fixture becomes an empty collection.
fn parse_layer(name: &str, json: &str) -> anyhow::Result<FeatureCollection> {
    if json.trim().is_empty() {
        log::warn!("[CDV] datasets: {} layer is empty", name);
        return Ok(FeatureCollection { features: Vec::new() });
    }
    FeatureCollection::parse(json).map_err(|e| anyhow::anyhow!("{} layer: {}", name, e))
}

/// Shared application state for the page shell and the widgets.
#[derive(Clone, Copy)]
pub struct AppState {
    /// Parsed datasets (None until loaded)
    pub datasets: Signal<Option<Datasets>>,
    /// Whether the app is still loading
    pub loading: Signal<bool>,
    /// Error message if something went wrong
    pub error_msg: Signal<Option<String>>,
    /// Guide overlay switched on
    pub guide: Signal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            datasets: Signal::new(None),
            loading: Signal::new(true),
            error_msg: Signal::new(None),
            guide: Signal::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: Sources = Sources {
        fatalities_per_month: "MONTH,country,fatalities\n2023-10,Israel,1420\n",
        events_per_week: "WEEK,country,event_type,events\n",
        events_sankey: "country,event_type,sub_event_type,events\n",
        mortality: "Country,Year,0-4\n",
        indicators: "Country,Year\n",
        incidents: "date,latitude,longitude,type\n",
        gaza_boundaries: "",
        damage_clusters: r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[34.4,31.4]},"properties":{"count":9}}]}"#,
        territories: r#"{"type":"FeatureCollection","features":[]}"#,
    };

    #[test]
    fn load_accepts_empty_layers() {
        let data = Datasets::load(&EMPTY).unwrap();
        assert!(data.boundaries.features.is_empty());
        assert_eq!(data.damage.len(), 1);
        assert_eq!(data.db.query_monthly_fatalities().unwrap().len(), 1);
        assert!(data == data.clone());
    }

    #[test]
    fn load_reports_broken_geojson() {
        let broken = Sources { territories: "{not json", ..EMPTY };
        let err = Datasets::load(&broken).err().unwrap();
        assert!(err.to_string().contains("territories"));
    }
}
