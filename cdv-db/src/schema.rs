//! SQL schema for the in-memory database.
//!
//! Applied as one batch when the database is created.

/// Returns the full SQL schema as a single batch string.
///
/// Tables:
/// - `monthly_fatalities` - fatalities per (month, country)
/// - `weekly_events` - event counts per (week, country, event type)
/// - `mortality` - death weights per (country, year, age-band midpoint)
/// - `event_flows` - event counts per (country, event type, sub-event type)
/// - `indicators` - the four development indicators per (country, year)
/// - `incidents` - attacks on food-system and health-care infrastructure
///
/// Countries are stored by label (`Israel`, `Palestine`), months as
/// `YYYY-MM` and days as `YYYY-MM-DD`, so text order is chronological.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS monthly_fatalities (
        month TEXT NOT NULL,
        country TEXT NOT NULL,
        fatalities REAL NOT NULL,
        PRIMARY KEY (month, country)
    );

    CREATE TABLE IF NOT EXISTS weekly_events (
        week TEXT NOT NULL,
        country TEXT NOT NULL,
        event_type TEXT NOT NULL,
        events REAL NOT NULL,
        PRIMARY KEY (week, country, event_type)
    );
    CREATE INDEX IF NOT EXISTS idx_weekly_type ON weekly_events(event_type);

    CREATE TABLE IF NOT EXISTS mortality (
        country TEXT NOT NULL,
        year INTEGER NOT NULL,
        age_mid REAL NOT NULL,
        weight REAL NOT NULL,
        PRIMARY KEY (country, year, age_mid)
    );

    CREATE TABLE IF NOT EXISTS event_flows (
        country TEXT NOT NULL,
        event_type TEXT NOT NULL,
        sub_event_type TEXT NOT NULL,
        events REAL NOT NULL,
        PRIMARY KEY (country, event_type, sub_event_type)
    );

    CREATE TABLE IF NOT EXISTS indicators (
        country TEXT NOT NULL,
        year INTEGER NOT NULL,
        gdp_per_capita REAL,
        drinking_water REAL,
        sanitation REAL,
        food_insecurity REAL,
        PRIMARY KEY (country, year)
    );

    CREATE TABLE IF NOT EXISTS incidents (
        id INTEGER PRIMARY KEY,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        perpetrator TEXT,
        weapon TEXT,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_incidents_date ON incidents(date);
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn count(conn: &Connection, kind: &str, name: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        for table in [
            "monthly_fatalities",
            "weekly_events",
            "mortality",
            "event_flows",
            "indicators",
            "incidents",
        ] {
            assert_eq!(count(&conn, "table", table), 1, "Table '{}' should exist", table);
        }
        for idx in ["idx_weekly_type", "idx_incidents_date"] {
            assert_eq!(count(&conn, "index", idx), 1, "Index '{}' should exist", idx);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }
}
