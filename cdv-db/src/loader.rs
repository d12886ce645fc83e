//! CSV loaders populating the in-memory database.
//!
//! Each loader parses a CSV string (headers on, flexible row length) and
//! upserts rows into its table. Rows with an unknown country, a bad date
//! or a non-numeric value are skipped and counted; a malformed CSV record
//! aborts the load with an error.
//!
//! # CSV Formats
//!
//! - **Monthly fatalities**: `MONTH,country,fatalities`
//! - **Weekly events**: `WEEK,country,event_type,events`
//! - **Mortality**: `Country,Year,<lo>-<hi>,...` (one column per age band)
//! - **Event flows**: `country,event_type,sub_event_type,events`
//! - **Indicators**: `Country,Year,GDP_per_capita,Drinking_Water_Access_Percent,Sanitation_Access_Percent,Food_Insecurity_Percent`
//! - **Incidents**: `date,...,latitude,longitude,type,description,perpetrator,weapon,...,id`

use crate::Database;
use cdv_core::age::AgeBand;
use cdv_core::period::parse_date;
use cdv_core::{Country, IncidentCategory, Indicator, YearMonth};
use rusqlite::params;

fn reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes())
}

/// Position of `name` in the header row, matched case-insensitively.
fn column(headers: &csv::StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow::anyhow!("missing column '{}'", name))
}

/// Empty cells and pandas' `nan` become `None`.
fn optional_text(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
}

fn optional_number(value: Option<&str>) -> Option<f64> {
    optional_text(value)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl Database {
    /// Load monthly fatalities.
    ///
    /// # Example CSV
    /// ```text
    /// MONTH,country,fatalities
    /// 2023-10,Palestine,6245
    /// 2023-10,Israel,1420
    /// ```
    pub fn load_monthly_fatalities(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let month = r.get(0).unwrap_or("").parse::<YearMonth>();
            let country = r.get(1).unwrap_or("").parse::<Country>();
            let fatalities = optional_number(r.get(2));
            let (Ok(month), Ok(country), Some(fatalities)) = (month, country, fatalities) else {
                skipped += 1;
                continue;
            };

            conn.execute(
                "INSERT OR REPLACE INTO monthly_fatalities (month, country, fatalities)
                 VALUES (?1, ?2, ?3)",
                params![month.to_string(), country.label(), fatalities],
            )?;
            count += 1;
        }
        log::info!("[CDV] loader: Loaded {} monthly fatality rows", count);
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} monthly fatality rows", skipped);
        }
        Ok(())
    }

    /// Load weekly event counts per event type.
    ///
    /// Non-numeric counts are read as zero, like empty weeks.
    ///
    /// # Example CSV
    /// ```text
    /// WEEK,country,event_type,events
    /// 2023-10-07,Israel,Battles,21
    /// ```
    pub fn load_weekly_events(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let week = parse_date(r.get(0).unwrap_or(""));
            let country = r.get(1).unwrap_or("").parse::<Country>();
            let event_type = r.get(2).unwrap_or("").trim();
            let events = optional_number(r.get(3)).unwrap_or(0.0);
            let (Ok(week), Ok(country)) = (week, country) else {
                skipped += 1;
                continue;
            };
            if event_type.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT OR REPLACE INTO weekly_events (week, country, event_type, events)
                 VALUES (?1, ?2, ?3, ?4)",
                params![week.to_string(), country.label(), event_type, events],
            )?;
            count += 1;
        }
        log::info!("[CDV] loader: Loaded {} weekly event rows", count);
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} weekly event rows", skipped);
        }
        Ok(())
    }

    /// Load the grouped mortality table.
    ///
    /// Every header shaped like `lo-hi` is an age band; its value becomes
    /// the weight of an observation at the band midpoint. Non-numeric
    /// cells are dropped individually.
    ///
    /// # Example CSV
    /// ```text
    /// Country,Year,0-4,5-9
    /// State of Palestine,2023,1520.5,880
    /// ```
    pub fn load_mortality(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);
        let headers = rdr.headers()?.clone();
        let country_col = column(&headers, "Country")?;
        let year_col = column(&headers, "Year")?;
        let bands: Vec<(usize, AgeBand)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.parse::<AgeBand>().ok().map(|band| (i, band)))
            .collect();

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let country = r.get(country_col).unwrap_or("").parse::<Country>();
            let year = r.get(year_col).unwrap_or("").trim().parse::<i32>();
            let (Ok(country), Ok(year)) = (country, year) else {
                skipped += 1;
                continue;
            };

            for (i, band) in &bands {
                let Some(weight) = optional_number(r.get(*i)) else {
                    continue;
                };
                conn.execute(
                    "INSERT OR REPLACE INTO mortality (country, year, age_mid, weight)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![country.label(), year, band.midpoint(), weight],
                )?;
                count += 1;
            }
        }
        log::info!(
            "[CDV] loader: Loaded {} mortality observations over {} age bands",
            count,
            bands.len()
        );
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} mortality rows", skipped);
        }
        Ok(())
    }

    /// Load Sankey flows. Repeated (country, type, sub-type) rows are summed.
    ///
    /// # Example CSV
    /// ```text
    /// country,event_type,sub_event_type,events
    /// Palestine,Explosions/Remote violence,Air/drone strike,5210
    /// ```
    pub fn load_event_flows(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let country = r.get(0).unwrap_or("").parse::<Country>();
            let event_type = r.get(1).unwrap_or("").trim();
            let sub_event_type = r.get(2).unwrap_or("").trim();
            let events = optional_number(r.get(3));
            let (Ok(country), Some(events)) = (country, events) else {
                skipped += 1;
                continue;
            };
            if event_type.is_empty() || sub_event_type.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT INTO event_flows (country, event_type, sub_event_type, events)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (country, event_type, sub_event_type)
                 DO UPDATE SET events = events + excluded.events",
                params![country.label(), event_type, sub_event_type, events],
            )?;
            count += 1;
        }
        log::info!("[CDV] loader: Loaded {} event flow rows", count);
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} event flow rows", skipped);
        }
        Ok(())
    }

    /// Load the combined development indicators. Empty cells stay `NULL`.
    ///
    /// # Example CSV
    /// ```text
    /// Country,Year,GDP_per_capita,Drinking_Water_Access_Percent,Sanitation_Access_Percent,Food_Insecurity_Percent
    /// Israel,2022,54930.4,99.5,94.1,
    /// ```
    pub fn load_indicators(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);
        let headers = rdr.headers()?.clone();
        let country_col = column(&headers, "Country")?;
        let year_col = column(&headers, "Year")?;
        // a missing indicator column only leaves that metric empty
        let metric_cols: Vec<Option<usize>> = Indicator::ALL
            .iter()
            .map(|ind| column(&headers, ind.column()).ok())
            .collect();

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let country = r.get(country_col).unwrap_or("").parse::<Country>();
            let year = r.get(year_col).unwrap_or("").trim().parse::<i32>();
            let (Ok(country), Ok(year)) = (country, year) else {
                skipped += 1;
                continue;
            };
            let v: Vec<Option<f64>> = metric_cols
                .iter()
                .map(|c| c.and_then(|i| optional_number(r.get(i))))
                .collect();

            conn.execute(
                "INSERT OR REPLACE INTO indicators
                 (country, year, gdp_per_capita, drinking_water, sanitation, food_insecurity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![country.label(), year, v[0], v[1], v[2], v[3]],
            )?;
            count += 1;
        }
        log::info!("[CDV] loader: Loaded {} indicator rows", count);
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} indicator rows", skipped);
        }
        Ok(())
    }

    /// Load the combined incidents table.
    ///
    /// Rows without an `id` column value are numbered in file order.
    ///
    /// # Example CSV
    /// ```text
    /// date,latitude,longitude,type,description,perpetrator,weapon,id
    /// 2023-10-09,31.52,34.45,Health Care,Hospital hit,Israeli Defense Forces,Airstrike,1
    /// ```
    pub fn load_incidents(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);
        let headers = rdr.headers()?.clone();
        let date_col = column(&headers, "date")?;
        let lat_col = column(&headers, "latitude")?;
        let lon_col = column(&headers, "longitude")?;
        let type_col = column(&headers, "type")?;
        let id_col = column(&headers, "id").ok();
        let perpetrator_col = column(&headers, "perpetrator").ok();
        let weapon_col = column(&headers, "weapon").ok();
        let description_col = column(&headers, "description").ok();
        let text = |r: &csv::StringRecord, c: Option<usize>| {
            c.and_then(|i| optional_text(r.get(i))).map(str::to_string)
        };

        let mut count = 0u32;
        let mut skipped = 0u32;
        for (line, result) in rdr.records().enumerate() {
            let r = result?;
            let date = parse_date(r.get(date_col).unwrap_or(""));
            let category = r.get(type_col).unwrap_or("").parse::<IncidentCategory>();
            let lat = optional_number(r.get(lat_col));
            let lon = optional_number(r.get(lon_col));
            let (Ok(date), Ok(category), Some(lat), Some(lon)) = (date, category, lat, lon) else {
                skipped += 1;
                continue;
            };
            let id = id_col
                .and_then(|i| optional_number(r.get(i)))
                .map(|v| v as i64)
                .unwrap_or(line as i64 + 1);

            conn.execute(
                "INSERT OR REPLACE INTO incidents
                 (id, category, date, latitude, longitude, perpetrator, weapon, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    category.label(),
                    date.to_string(),
                    lat,
                    lon,
                    text(&r, perpetrator_col),
                    text(&r, weapon_col),
                    text(&r, description_col),
                ],
            )?;
            count += 1;
        }
        log::info!("[CDV] loader: Loaded {} incidents", count);
        if skipped > 0 {
            log::warn!("[CDV] loader: Skipped {} incidents without a usable date, type or position", skipped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn rows(db: &Database, table: &str) -> i64 {
        db.conn
            .borrow()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn monthly_fatalities_skip_foreign_and_bad_rows() {
        let db = Database::new().unwrap();
        db.load_monthly_fatalities(
            "MONTH,country,fatalities\n2023-10,Palestine,6245\n2023-10,Israel,1420\n2023-10,Lebanon,12\n2023-11,Israel,abc\n",
        )
        .unwrap();
        assert_eq!(rows(&db, "monthly_fatalities"), 2);
    }

    #[test]
    fn weekly_events_default_missing_counts_to_zero() {
        let db = Database::new().unwrap();
        db.load_weekly_events("WEEK,country,event_type,events\n2023-10-07,Israel,Battles,\nbad,Israel,Battles,3\n")
            .unwrap();
        assert_eq!(rows(&db, "weekly_events"), 1);
        let events: f64 = db
            .conn
            .borrow()
            .query_row("SELECT events FROM weekly_events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(events, 0.0);
    }

    #[test]
    fn mortality_reads_every_age_column() {
        let db = Database::new().unwrap();
        db.load_mortality("Country,Year,0-4,5-9,80-84\nState of Palestine,2023,10,,5\nIsrael,2023,3,2,1\n")
            .unwrap();
        assert_eq!(rows(&db, "mortality"), 5);
    }

    #[test]
    fn mortality_requires_country_column() {
        let db = Database::new().unwrap();
        assert!(db.load_mortality("Nation,Year,0-4\nIsrael,2023,1\n").is_err());
    }

    #[test]
    fn event_flows_sum_duplicates() {
        let db = Database::new().unwrap();
        db.load_event_flows(
            "country,event_type,sub_event_type,events\nIsrael,Protests,Peaceful protest,4\nIsrael,Protests,Peaceful protest,6\n",
        )
        .unwrap();
        let events: f64 = db
            .conn
            .borrow()
            .query_row("SELECT events FROM event_flows", [], |row| row.get(0))
            .unwrap();
        assert_eq!(events, 10.0);
    }

    #[test]
    fn indicators_keep_empty_cells_null() {
        let db = Database::new().unwrap();
        db.load_indicators(
            "Country,Year,GDP_per_capita,Drinking_Water_Access_Percent,Sanitation_Access_Percent,Food_Insecurity_Percent\nIsrael,2022,54930.4,99.5,94.1,\n",
        )
        .unwrap();
        let food: Option<f64> = db
            .conn
            .borrow()
            .query_row("SELECT food_insecurity FROM indicators", [], |row| row.get(0))
            .unwrap();
        assert_eq!(food, None);
    }

    #[test]
    fn incidents_need_position_and_category() {
        let db = Database::new().unwrap();
        db.load_incidents(
            "date,latitude,longitude,type,description,perpetrator,weapon,id\n\
             2023-10-09,31.52,34.45,Health Care,Hospital hit,,Airstrike,1\n\
             2023-10-10,,34.45,Health Care,No position,,,2\n\
             2023-10-11,31.5,34.4,Education,Wrong type,,,3\n",
        )
        .unwrap();
        assert_eq!(rows(&db, "incidents"), 1);
    }
}
