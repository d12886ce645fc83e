//! Typed queries over the loaded datasets.
//!
//! All queries return structs from [`crate::models`]. Text columns written
//! by the loaders are parsed back into domain types; a value that fails to
//! parse surfaces as a conversion error rather than a panic.

use crate::models::{
    CountryTotal, EventFlow, Incident, IncidentFilter, IndicatorRow, MonthlyFatalities,
    MortalityProfile, TimeWindow, WeeklyBreakdown, WeeklyCount,
};
use crate::Database;
use cdv_core::period::parse_date;
use cdv_core::{Country, YearMonth};
use cdv_stats::Observation;
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Row};
use std::str::FromStr;

fn parse_col<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_col(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    parse_date(&text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?n, ?n+1, ...` placeholders for an `IN (...)` list starting at `first`.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Database {
    // ───────────────────── Fatalities ─────────────────────

    /// Monthly fatalities ordered by month, then country.
    pub fn query_monthly_fatalities(&self) -> anyhow::Result<Vec<MonthlyFatalities>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT month, country, fatalities FROM monthly_fatalities
             ORDER BY month, country",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MonthlyFatalities {
                    month: parse_col(row, 0)?,
                    country: parse_col(row, 1)?,
                    fatalities: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[CDV] query: query_monthly_fatalities returned {} records", rows.len());
        Ok(rows)
    }

    /// Total fatalities per country, Israel first.
    pub fn query_total_fatalities(&self) -> anyhow::Result<Vec<CountryTotal>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT country, SUM(fatalities) FROM monthly_fatalities
             GROUP BY country
             ORDER BY country",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CountryTotal {
                    country: parse_col(row, 0)?,
                    fatalities: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[CDV] query: query_total_fatalities returned {} records", rows.len());
        Ok(rows)
    }

    // ───────────────────── Weekly events ─────────────────────

    /// Distinct event types, sorted.
    pub fn query_event_types(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT event_type FROM weekly_events ORDER BY event_type")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        log::info!("[CDV] query: query_event_types returned {} records", rows.len());
        Ok(rows)
    }

    /// Weekly sums of the selected event types per country, ordered by
    /// country then week. An empty selection yields no rows.
    pub fn query_weekly_events(&self, selected: &[String]) -> anyhow::Result<Vec<WeeklyCount>> {
        if selected.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT week, country, SUM(events) FROM weekly_events
             WHERE event_type IN ({})
             GROUP BY country, week
             ORDER BY country, week",
            placeholders(1, selected.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(selected.iter()), |row| {
                Ok(WeeklyCount {
                    week: date_col(row, 0)?,
                    country: parse_col(row, 1)?,
                    events: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[CDV] query: query_weekly_events returned {} records", rows.len());
        Ok(rows)
    }

    /// Per-country, per-type counts of one week restricted to the selection.
    pub fn query_weekly_breakdown(
        &self,
        week: NaiveDate,
        selected: &[String],
    ) -> anyhow::Result<Vec<WeeklyBreakdown>> {
        if selected.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT country, event_type, events FROM weekly_events
             WHERE week = ?1 AND event_type IN ({})
             ORDER BY country, events DESC, event_type",
            placeholders(2, selected.len())
        );
        let mut args: Vec<String> = Vec::with_capacity(selected.len() + 1);
        args.push(week.to_string());
        args.extend(selected.iter().cloned());
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(WeeklyBreakdown {
                    country: parse_col(row, 0)?,
                    event_type: row.get(1)?,
                    events: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("[CDV] query: query_weekly_breakdown returned {} records", rows.len());
        Ok(rows)
    }

    /// Largest weekly sum over all event types, per country and week.
    /// Used as the fixed ridge amplitude so filtering never rescales.
    pub fn query_weekly_max_all(&self) -> anyhow::Result<f64> {
        let conn = self.conn.borrow();
        let max: Option<f64> = conn.query_row(
            "SELECT MAX(total) FROM (
                 SELECT SUM(events) AS total FROM weekly_events GROUP BY country, week
             )",
            [],
            |row| row.get(0),
        )?;
        log::info!("[CDV] query: query_weekly_max_all = {:?}", max);
        Ok(max.unwrap_or(0.0))
    }

    // ───────────────────── Mortality ─────────────────────

    /// Years with mortality data, ascending.
    pub fn query_mortality_years(&self) -> anyhow::Result<Vec<i32>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT year FROM mortality ORDER BY year")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i32>, _>>()?;
        log::info!("[CDV] query: query_mortality_years returned {} records", rows.len());
        Ok(rows)
    }

    /// One profile per country for `year`, observations ordered by age.
    pub fn query_mortality_profiles(&self, year: i32) -> anyhow::Result<Vec<MortalityProfile>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT country, age_mid, weight FROM mortality
             WHERE year = ?1
             ORDER BY country, age_mid",
        )?;
        let points = stmt
            .query_map(params![year], |row| {
                Ok((
                    parse_col::<Country>(row, 0)?,
                    Observation {
                        age: row.get(1)?,
                        weight: row.get(2)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut profiles: Vec<MortalityProfile> = Vec::new();
        for (country, obs) in points {
            match profiles.last_mut() {
                Some(p) if p.country == country => p.observations.push(obs),
                _ => profiles.push(MortalityProfile {
                    country,
                    year,
                    observations: vec![obs],
                }),
            }
        }
        log::info!(
            "[CDV] query: query_mortality_profiles({}) returned {} profiles",
            year,
            profiles.len()
        );
        Ok(profiles)
    }

    // ───────────────────── Event flows ─────────────────────

    /// All Sankey flows with a positive count.
    pub fn query_event_flows(&self) -> anyhow::Result<Vec<EventFlow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT country, event_type, sub_event_type, events FROM event_flows
             WHERE events > 0
             ORDER BY country, event_type, sub_event_type",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EventFlow {
                    country: parse_col(row, 0)?,
                    event_type: row.get(1)?,
                    sub_event_type: row.get(2)?,
                    events: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[CDV] query: query_event_flows returned {} records", rows.len());
        Ok(rows)
    }

    // ───────────────────── Indicators ─────────────────────

    /// Indicator rows ordered by country, then year.
    pub fn query_indicators(&self) -> anyhow::Result<Vec<IndicatorRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT country, year, gdp_per_capita, drinking_water, sanitation, food_insecurity
             FROM indicators
             ORDER BY country, year",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(IndicatorRow {
                    country: parse_col(row, 0)?,
                    year: row.get(1)?,
                    gdp_per_capita: row.get(2)?,
                    drinking_water: row.get(3)?,
                    sanitation: row.get(4)?,
                    food_insecurity: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[CDV] query: query_indicators returned {} records", rows.len());
        Ok(rows)
    }

    // ───────────────────── Incidents ─────────────────────

    /// Incidents matching `filter`, ordered by date.
    pub fn query_incidents(&self, filter: &IncidentFilter) -> anyhow::Result<Vec<Incident>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();
        let mut bind = |clause: &str, value: Value, clauses: &mut Vec<String>| {
            args.push(value);
            clauses.push(clause.replace('?', &format!("?{}", args.len())));
        };

        if let Some(category) = filter.category {
            bind("category = ?", Value::Text(category.label().to_string()), &mut clauses);
        }
        match filter.window {
            TimeWindow::Full => {}
            TimeWindow::Month(month) => {
                bind("date >= ?", Value::Text(month.first_day().to_string()), &mut clauses);
                bind("date < ?", Value::Text(month.succ().first_day().to_string()), &mut clauses);
            }
            TimeWindow::CumulativeTo(month) => {
                bind("date < ?", Value::Text(month.succ().first_day().to_string()), &mut clauses);
            }
        }
        if let Some(b) = filter.bounds {
            bind("longitude >= ?", Value::Real(b.min_lon), &mut clauses);
            bind("longitude <= ?", Value::Real(b.max_lon), &mut clauses);
            bind("latitude >= ?", Value::Real(b.min_lat), &mut clauses);
            bind("latitude <= ?", Value::Real(b.max_lat), &mut clauses);
        }

        let mut sql = String::from(
            "SELECT id, category, date, latitude, longitude, perpetrator, weapon, description
             FROM incidents",
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date, id");

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(Incident {
                    id: row.get(0)?,
                    category: parse_col(row, 1)?,
                    date: date_col(row, 2)?,
                    latitude: row.get(3)?,
                    longitude: row.get(4)?,
                    perpetrator: row.get(5)?,
                    weapon: row.get(6)?,
                    description: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("[CDV] query: query_incidents returned {} records", rows.len());
        Ok(rows)
    }

    /// First and last month with an incident, `None` when there are none.
    pub fn query_incident_month_range(&self) -> anyhow::Result<Option<(YearMonth, YearMonth)>> {
        let conn = self.conn.borrow();
        let (min, max): (Option<String>, Option<String>) =
            conn.query_row("SELECT MIN(date), MAX(date) FROM incidents", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        let range = match (min, max) {
            (Some(a), Some(b)) => Some((YearMonth::of(parse_date(&a)?), YearMonth::of(parse_date(&b)?))),
            _ => None,
        };
        log::info!("[CDV] query: query_incident_month_range = {:?}", range);
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{IncidentFilter, TimeWindow};
    use crate::Database;
    use cdv_core::geo::Bounds;
    use cdv_core::{Country, IncidentCategory, YearMonth};
    use chrono::NaiveDate;

    fn seeded() -> Database {
        let db = Database::new().unwrap();
        db.load_monthly_fatalities(
            "MONTH,country,fatalities\n2023-11,Israel,100\n2023-10,Palestine,6245\n2023-10,Israel,1420\n2023-11,Palestine,8000\n",
        )
        .unwrap();
        db.load_weekly_events(
            "WEEK,country,event_type,events\n\
             2023-10-07,Israel,Battles,21\n\
             2023-10-07,Israel,Protests,5\n\
             2023-10-07,Palestine,Battles,40\n\
             2023-10-14,Palestine,Explosions/Remote violence,90\n\
             2023-10-14,Palestine,Battles,30\n",
        )
        .unwrap();
        db.load_incidents(
            "date,latitude,longitude,type,description,perpetrator,weapon,id\n\
             2023-10-09,31.52,34.45,Health Care,Hospital hit,,Airstrike,1\n\
             2023-11-02,31.40,34.38,Food System,Bakery destroyed,Israeli Defense Forces,,2\n\
             2023-12-20,31.30,34.30,Health Care,Clinic shelled,,,3\n\
             2023-12-21,33.00,35.50,Food System,Outside the strip,,,4\n",
        )
        .unwrap();
        db
    }

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn monthly_fatalities_are_chronological() {
        let rows = seeded().query_monthly_fatalities().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].month, YearMonth::new(2023, 10).unwrap());
        assert_eq!(rows[0].country, Country::Israel);
        assert_eq!(rows[3].month, YearMonth::new(2023, 11).unwrap());
    }

    #[test]
    fn totals_sum_per_country() {
        let totals = seeded().query_total_fatalities().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].country, Country::Israel);
        assert_eq!(totals[0].fatalities, 1520.0);
        assert_eq!(totals[1].fatalities, 14245.0);
    }

    #[test]
    fn event_types_are_sorted_and_distinct() {
        let t = seeded().query_event_types().unwrap();
        assert_eq!(t, types(&["Battles", "Explosions/Remote violence", "Protests"]));
    }

    #[test]
    fn weekly_events_respect_selection() {
        let db = seeded();
        let all = db.query_weekly_events(&types(&["Battles", "Protests", "Explosions/Remote violence"])).unwrap();
        let israel: Vec<_> = all.iter().filter(|w| w.country == Country::Israel).collect();
        assert_eq!(israel.len(), 1);
        assert_eq!(israel[0].events, 26.0);

        let battles = db.query_weekly_events(&types(&["Battles"])).unwrap();
        let pal: Vec<f64> = battles.iter().filter(|w| w.country == Country::Palestine).map(|w| w.events).collect();
        assert_eq!(pal, vec![40.0, 30.0]);

        assert!(db.query_weekly_events(&[]).unwrap().is_empty());
    }

    #[test]
    fn weekly_max_ignores_selection() {
        assert_eq!(seeded().query_weekly_max_all().unwrap(), 120.0);
        assert_eq!(Database::new().unwrap().query_weekly_max_all().unwrap(), 0.0);
    }

    #[test]
    fn weekly_breakdown_lists_types_of_one_week() {
        let week = NaiveDate::from_ymd_opt(2023, 10, 7).unwrap();
        let rows = seeded().query_weekly_breakdown(week, &types(&["Battles", "Protests"])).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].country, Country::Israel);
        assert_eq!(rows[0].event_type, "Battles");
    }

    #[test]
    fn mortality_profiles_group_by_country() {
        let db = Database::new().unwrap();
        db.load_mortality("Country,Year,0-4,5-9\nState of Palestine,2023,10,4\nIsrael,2023,3,2\nIsrael,2022,1,1\n")
            .unwrap();
        assert_eq!(db.query_mortality_years().unwrap(), vec![2022, 2023]);
        let profiles = db.query_mortality_profiles(2023).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].country, Country::Palestine);
        assert_eq!(profiles[1].observations.len(), 2);
        assert_eq!(profiles[1].observations[0].age, 2.0);
        assert_eq!(profiles[1].observations[1].weight, 4.0);
    }

    #[test]
    fn event_flows_round_trip_countries() {
        let db = Database::new().unwrap();
        db.load_event_flows("country,event_type,sub_event_type,events\nGaza,Battles,Armed clash,7\nIsrael,Riots,Mob violence,0\n")
            .unwrap();
        let flows = db.query_event_flows().unwrap();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].country, Country::Palestine);
    }

    #[test]
    fn incidents_filter_by_category_and_bounds() {
        let db = seeded();
        let gaza = Bounds { min_lon: 34.2, min_lat: 31.2, max_lon: 34.6, max_lat: 31.6 };
        let filter = IncidentFilter {
            category: Some(IncidentCategory::HealthCare),
            window: TimeWindow::Full,
            bounds: Some(gaza),
        };
        let rows = db.query_incidents(&filter).unwrap();
        assert_eq!(rows.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(rows[0].weapon.as_deref(), Some("Airstrike"));
        assert_eq!(rows[0].perpetrator, None);

        let all = db.query_incidents(&IncidentFilter::default()).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn incidents_monthly_and_cumulative_windows() {
        let db = seeded();
        let nov = YearMonth::new(2023, 11).unwrap();
        let month = IncidentFilter { window: TimeWindow::Month(nov), ..IncidentFilter::default() };
        assert_eq!(db.query_incidents(&month).unwrap().len(), 1);
        let cumulative = IncidentFilter { window: TimeWindow::CumulativeTo(nov), ..IncidentFilter::default() };
        assert_eq!(db.query_incidents(&cumulative).unwrap().len(), 2);
    }

    #[test]
    fn incident_month_range_spans_data() {
        let db = seeded();
        let (a, b) = db.query_incident_month_range().unwrap().unwrap();
        assert_eq!(a, YearMonth::new(2023, 10).unwrap());
        assert_eq!(b, YearMonth::new(2023, 12).unwrap());
        assert_eq!(Database::new().unwrap().query_incident_month_range().unwrap(), None);
    }
}
